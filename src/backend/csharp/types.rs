//! C# mapping tables: source types and operator token kinds to C# spellings.

use polyemit_core::lang::types::{GenericTypeId, PrimitiveTypeId};
use polyemit_syntax::TokenKind;
use polyemit_syntax::ast::TypeRef;

use super::CSharpGenerator;
use crate::backend::Scope;
use crate::backend::types::{self, TypeShape};
use crate::diagnostics::Diagnostic;

/// Spelling used when a type cannot be resolved.
pub const CATCH_ALL: &str = "object";
/// Spelling for parameters and results that carry no declared type.
pub const UNTYPED: &str = "dynamic";

pub const NS_SYSTEM: &str = "System";
pub const NS_COLLECTIONS: &str = "System.Collections.Generic";
pub const NS_TASKS: &str = "System.Threading.Tasks";
pub const NS_LINQ: &str = "System.Linq";

pub fn primitive(id: PrimitiveTypeId) -> &'static str {
    match id {
        PrimitiveTypeId::Number | PrimitiveTypeId::Float => "double",
        PrimitiveTypeId::Int => "int",
        PrimitiveTypeId::String => "string",
        PrimitiveTypeId::Bool => "bool",
        PrimitiveTypeId::Char => "char",
        PrimitiveTypeId::Void => "void",
        PrimitiveTypeId::Any => "object",
    }
}

/// Binary and assignment operators. Kinds without a C# spelling come out as their raw name.
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
        TokenKind::QuestionQuestion => "??",
        TokenKind::Equal => "=",
        TokenKind::PlusEqual => "+=",
        TokenKind::MinusEqual => "-=",
        TokenKind::StarEqual => "*=",
        TokenKind::SlashEqual => "/=",
        TokenKind::PercentEqual => "%=",
        TokenKind::FatArrow => "=>",
        TokenKind::Dot => ".",
        other => other.name(),
    }
}

/// Prefix and postfix operators.
pub fn unary_op(kind: TokenKind) -> &'static str {
    match kind {
        TokenKind::Bang | TokenKind::Not => "!",
        TokenKind::Minus => "-",
        TokenKind::Plus => "+",
        TokenKind::Tilde => "~",
        TokenKind::PlusPlus => "++",
        TokenKind::MinusMinus => "--",
        other => other.name(),
    }
}

impl CSharpGenerator<'_> {
    /// Map a source type to its C# spelling.
    pub(super) fn map_type(&mut self, ty: &TypeRef, scope: Scope<'_>) -> String {
        let normalized = types::normalize(ty);
        self.map_normalized(&normalized, scope)
    }

    /// Map an optional type, using `fallback` when none was written.
    pub(super) fn map_type_or(&mut self, ty: Option<&TypeRef>, fallback: &str, scope: Scope<'_>) -> String {
        match ty {
            Some(ty) => self.map_type(ty, scope),
            None => fallback.to_string(),
        }
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
            TypeShape::Qualified(name, args) => self.with_args(&name.replace("::", "."), args, scope),
            TypeShape::Unresolved(name, args) => match self.resolver.resolve(name) {
                Some(spelling) => {
                    tracing::debug!(name, %spelling, "type resolved by resolver");
                    self.with_args(&spelling, args, scope)
                }
                None => {
                    self.diagnostics.report(
                        Diagnostic::warning(format!("unknown type `{}`; using `{}`", ty, CATCH_ALL))
                            .with_hint("declare the type in this unit or import its namespace"),
                    );
                    CATCH_ALL.to_string()
                }
            },
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
            GenericTypeId::List => {
                self.require_namespace(NS_COLLECTIONS);
                format!("List<{}>", args.join(", "))
            }
            GenericTypeId::Map => {
                self.require_namespace(NS_COLLECTIONS);
                format!("Dictionary<{}>", args.join(", "))
            }
            GenericTypeId::Set => {
                self.require_namespace(NS_COLLECTIONS);
                format!("HashSet<{}>", args.join(", "))
            }
            GenericTypeId::Array => format!("{}[]", args.join(", ")),
            GenericTypeId::Tuple => format!("({})", args.join(", ")),
            GenericTypeId::Function => {
                self.require_namespace(NS_SYSTEM);
                let (ret, params) = match args.split_last() {
                    Some((ret, params)) => (ret.as_str(), params),
                    None => ("void", &[][..]),
                };
                match (ret, params.is_empty()) {
                    ("void", true) => "Action".to_string(),
                    ("void", false) => format!("Action<{}>", params.join(", ")),
                    (ret, true) => format!("Func<{}>", ret),
                    (ret, false) => format!("Func<{}, {}>", params.join(", "), ret),
                }
            }
            GenericTypeId::Promise => {
                self.require_namespace(NS_TASKS);
                match args.first().map(String::as_str) {
                    Some("void") | None => "Task".to_string(),
                    Some(inner) => format!("Task<{}>", inner),
                }
            }
            GenericTypeId::Optional => format!("{}?", args.join(", ")),
        }
    }
}
