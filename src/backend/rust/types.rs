//! Rust mapping tables: source types and operator token kinds to Rust spellings.

use polyemit_core::lang::types::{GenericTypeId, PrimitiveTypeId};
use polyemit_syntax::TokenKind;
use polyemit_syntax::ast::TypeRef;

use super::RustGenerator;
use crate::backend::Scope;
use crate::backend::types::{self, TypeShape};
use crate::diagnostics::Diagnostic;

/// Spelling used when a type cannot be resolved.
pub const CATCH_ALL: &str = "Box<dyn std::any::Any>";
/// The unit type; functions returning it get no `->` clause.
pub const UNIT: &str = "()";

pub const HASH_MAP: &str = "std::collections::HashMap";
pub const HASH_SET: &str = "std::collections::HashSet";

pub fn primitive(id: PrimitiveTypeId) -> &'static str {
    match id {
        PrimitiveTypeId::Number | PrimitiveTypeId::Float => "f64",
        PrimitiveTypeId::Int => "i64",
        PrimitiveTypeId::String => "String",
        PrimitiveTypeId::Bool => "bool",
        PrimitiveTypeId::Char => "char",
        PrimitiveTypeId::Void => UNIT,
        PrimitiveTypeId::Any => CATCH_ALL,
    }
}

/// Binary and assignment operators. Kinds without a Rust spelling come out as their raw name.
pub fn binary_op(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Plus => "+",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Slash => "/",
        TokenKind::Percent => "%",
        TokenKind::EqualEqual => "==",
        TokenKind::BangEqual => "!=",
        TokenKind::Less => "<",
        TokenKind::LessEqual => "<=",
        TokenKind::Greater => ">",
        TokenKind::GreaterEqual => ">=",
        TokenKind::AmpAmp | TokenKind::And => "&&",
        TokenKind::PipePipe | TokenKind::Or => "||",
        TokenKind::Amp => "&",
        TokenKind::Pipe => "|",
        TokenKind::Caret => "^",
        TokenKind::ShiftLeft => "<<",
        TokenKind::ShiftRight => ">>",
        TokenKind::Equal => "=",
        TokenKind::PlusEqual => "+=",
        TokenKind::MinusEqual => "-=",
        TokenKind::StarEqual => "*=",
        TokenKind::SlashEqual => "/=",
        TokenKind::PercentEqual => "%=",
        TokenKind::DotDot => "..",
        TokenKind::DotDotEqual => "..=",
        TokenKind::FatArrow => "=>",
        TokenKind::Arrow => "->",
        TokenKind::Dot => ".",
        other => other.name(),
    }
}

/// Prefix operators. `~` is bitwise not, which Rust spells `!`.
pub fn unary_op(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Bang | TokenKind::Not | TokenKind::Tilde => "!",
        TokenKind::Minus => "-",
        TokenKind::Star => "*",
        TokenKind::Amp => "&",
        other => other.name(),
    }
}

impl RustGenerator<'_> {
    /// Map a source type to its Rust spelling.
    pub(super) fn map_type(&mut self, ty: &TypeRef, scope: Scope<'_>) -> String {
        let normalized = types::normalize(ty);
        self.map_normalized(&normalized, scope)
    }

    fn map_normalized(&mut self, ty: &TypeRef, scope: Scope<'_>) -> String {
        let generics = scope.generics();
        match types::classify(ty, &generics, &self.known) {
            TypeShape::GenericParam(name) => name.to_string(),
            TypeShape::Primitive(id) => primitive(id).to_string(),
            TypeShape::Container(id, args) => {
                let mapped: Vec<String> = args.iter().map(|arg| self.map_normalized(arg, scope)).collect();
                self.container(id, mapped)
            }
            TypeShape::Declared(name, args) => self.with_args(name, args, scope),
            TypeShape::Qualified(name, args) => self.with_args(&name.replace('.', "::"), args, scope),
            TypeShape::Unresolved(..) => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("unknown type `{}`; using `{}`", ty, CATCH_ALL))
                        .with_hint("declare the type in this unit or refer to it by its full path"),
                );
                CATCH_ALL.to_string()
            }
        }
    }

    fn with_args(&mut self, name: &str, args: &[TypeRef], scope: Scope<'_>) -> String {
        if args.is_empty() {
            return name.to_string();
        }
        let mapped: Vec<String> = args.iter().map(|arg| self.map_normalized(arg, scope)).collect();
        format!("{}<{}>", name, mapped.join(", "))
    }

    fn container(&mut self, id: GenericTypeId, args: Vec<String>) -> String {
        let args = types::fill_args(id, args, CATCH_ALL);
        match id {
            GenericTypeId::List | GenericTypeId::Array => format!("Vec<{}>", args.join(", ")),
            GenericTypeId::Map => {
                self.require_import(HASH_MAP);
                format!("HashMap<{}>", args.join(", "))
            }
            GenericTypeId::Set => {
                self.require_import(HASH_SET);
                format!("HashSet<{}>", args.join(", "))
            }
            GenericTypeId::Tuple if args.len() == 1 => format!("({},)", args[0]),
            GenericTypeId::Tuple => format!("({})", args.join(", ")),
            GenericTypeId::Function => {
                let (ret, params) = match args.split_last() {
                    Some((ret, params)) => (ret.as_str(), params),
                    None => (UNIT, &[][..]),
                };
                if ret == UNIT {
                    format!("Box<dyn Fn({})>", params.join(", "))
                } else {
                    format!("Box<dyn Fn({}) -> {}>", params.join(", "), ret)
                }
            }
            GenericTypeId::Promise => format!(
                "std::pin::Pin<Box<dyn std::future::Future<Output = {}>>>",
                args.first().map(String::as_str).unwrap_or(UNIT)
            ),
            GenericTypeId::Optional => format!("Option<{}>", args.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_primitive_has_a_spelling() {
        for info in polyemit_core::lang::types::PRIMITIVE_TYPES {
            assert!(!primitive(info.id).is_empty());
        }
        assert_eq!(primitive(PrimitiveTypeId::Int), "i64");
    }

    #[test]
    fn test_operator_mapping_is_total() {
        for kind in TokenKind::ALL {
            assert!(!binary_op(*kind).is_empty());
            assert!(!unary_op(*kind).is_empty());
        }
        assert_eq!(binary_op(TokenKind::Or), "||");
        assert_eq!(unary_op(TokenKind::Tilde), "!");
        assert_eq!(binary_op(TokenKind::QuestionQuestion), "QuestionQuestion");
    }
}
