//! Expression emission for Rust
//!
//! Source values are dynamically owned, so string literals that flow into owned positions (bindings, returns, call
//! arguments, fields) are converted with `.to_string()`.

use polyemit_core::lang::builtins::BuiltinFnId;
use polyemit_core::lang::keywords;
use polyemit_syntax::TokenKind;
use polyemit_syntax::ast::*;

use super::RustGenerator;
use super::types::{binary_op, unary_op};
use crate::backend::lowering::{self, ArmBody, CallShape};
use crate::backend::{GenResult, Scope};

/// Escape an identifier that collides with a Rust keyword.
///
/// `self`, `Self`, `super` and `crate` cannot be raw identifiers and get a trailing underscore instead.
pub fn escape_ident(name: &str) -> String {
    if keywords::RUST_NON_RAW_KEYWORDS.contains(&name) {
        format!("{}_", name)
    } else if keywords::is_rust_keyword(name) {
        format!("r#{}", name)
    } else {
        name.to_string()
    }
}

pub fn literal(lit: &Literal) -> String {
    match lit {
        Literal::Number(text) => text.clone(),
        Literal::String(text) => format!("\"{}\"", lowering::escape_string(text)),
        Literal::Char(c) => format!("'{}'", lowering::escape_char(*c)),
        Literal::Bool(b) => b.to_string(),
        Literal::Null => "None".to_string(),
    }
}

fn needs_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary { .. } | Expr::Assignment { .. } | Expr::Lambda { .. } | Expr::Range { .. } | Expr::Unary { .. }
    )
}

impl RustGenerator<'_> {
    /// Emit an expression
    pub(super) fn expr(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<String> {
        let text = match expr {
            Expr::Literal(lit) => literal(lit),
            Expr::Identifier(name) => escape_ident(name),
            Expr::QualifiedIdentifier(parts) => path(parts),
            Expr::MemberAccess { object, member } => match object.as_ref() {
                // `Color.Red`, `Config.MAX`
                Expr::Identifier(name) if self.known.contains(name) => {
                    format!("{}::{}", escape_ident(name), escape_ident(member))
                }
                _ => format!("{}.{}", self.operand(object, scope)?, escape_ident(member)),
            },
            Expr::IndexAccess { object, index } => {
                format!("{}[{}]", self.operand(object, scope)?, self.expr(index, scope)?)
            }
            Expr::Binary { left, op, right } => self.binary(left, *op, right, scope)?,
            Expr::Unary { op, operand, postfix } => self.unary(*op, operand, *postfix, scope)?,
            Expr::Assignment { target, op, value } => {
                format!("{} {} {}", self.expr(target, scope)?, binary_op(*op), self.expr(value, scope)?)
            }
            Expr::Call { callee, args } => self.call(callee, args, scope)?,
            Expr::ConstructorCall { ty, args } => {
                let ty = self.map_type(ty, scope);
                format!("{}::new({})", turbofish(&ty), self.owned_args(args, scope)?)
            }
            Expr::ArrayLiteral { elements, element_type } => {
                let items = self.owned_args(elements, scope)?;
                match element_type {
                    Some(ty) if elements.is_empty() => format!("Vec::<{}>::new()", self.map_type(ty, scope)),
                    Some(ty) => format!("Vec::<{}>::from([{}])", self.map_type(ty, scope), items),
                    None if elements.is_empty() => "Vec::new()".to_string(),
                    None => format!("vec![{}]", items),
                }
            }
            Expr::Lambda { params, body } => self.lambda(params, body, scope)?,
            Expr::Range { start, end, inclusive } => {
                let start = match start {
                    Some(start) => self.operand(start, scope)?,
                    None => "0".to_string(),
                };
                match end {
                    Some(end) => {
                        let dots = if *inclusive { "..=" } else { ".." };
                        format!("{}{}{}", start, dots, self.operand(end, scope)?)
                    }
                    None => format!("{}..", start),
                }
            }
            Expr::Block(statements) => self.block_expr(statements, scope)?,
            Expr::Match(node) => self.match_expr(node, scope)?,
            Expr::This if scope.in_constructor => "instance".to_string(),
            Expr::This => "self".to_string(),
        };
        Ok(text)
    }

    pub(super) fn operand(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<String> {
        let text = self.expr(expr, scope)?;
        Ok(if needs_parens(expr) { format!("({})", text) } else { text })
    }

    /// Emit an expression in an owned position: string literals become `String`.
    pub(super) fn owned(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<String> {
        let text = self.expr(expr, scope)?;
        Ok(if expr.is_string_literal() { format!("{}.to_string()", text) } else { text })
    }

    fn owned_args(&mut self, args: &[Expr], scope: Scope<'_>) -> GenResult<String> {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            rendered.push(self.owned(arg, scope)?);
        }
        Ok(rendered.join(", "))
    }

    pub(super) fn args(&mut self, args: &[Expr], scope: Scope<'_>) -> GenResult<String> {
        let mut rendered = Vec::with_capacity(args.len());
        for arg in args {
            rendered.push(self.expr(arg, scope)?);
        }
        Ok(rendered.join(", "))
    }

    fn binary(&mut self, left: &Expr, op: TokenKind, right: &Expr, scope: Scope<'_>) -> GenResult<String> {
        let l = self.operand(left, scope)?;
        let r = self.operand(right, scope)?;
        Ok(match op {
            TokenKind::StarStar => format!("{}.pow({} as u32)", paren(&l), r),
            TokenKind::QuestionQuestion => format!("{}.unwrap_or({})", l, r),
            // `&str + ..` does not exist; `String + &str` does
            TokenKind::Plus if left.is_string_literal() => format!("{}.to_string() + {}", l, r),
            _ => format!("{} {} {}", l, binary_op(op), r),
        })
    }

    fn unary(&mut self, op: TokenKind, operand: &Expr, postfix: bool, scope: Scope<'_>) -> GenResult<String> {
        let inner = self.operand(operand, scope)?;
        Ok(match op {
            TokenKind::PlusPlus | TokenKind::MinusMinus => {
                let step = if op == TokenKind::PlusPlus { "+=" } else { "-=" };
                if postfix {
                    format!("{{ let __prev = {0}; {0} {1} 1; __prev }}", inner, step)
                } else {
                    format!("{{ {0} {1} 1; {0} }}", inner, step)
                }
            }
            TokenKind::Plus => inner,
            _ => format!("{}{}", unary_op(op), inner),
        })
    }

    /// `x += 1` for an increment or decrement in statement position.
    pub(super) fn step_statement(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<Option<String>> {
        match expr {
            Expr::Unary {
                op: op @ (TokenKind::PlusPlus | TokenKind::MinusMinus),
                operand,
                ..
            } => {
                let step = if *op == TokenKind::PlusPlus { "+=" } else { "-=" };
                Ok(Some(format!("{} {} 1", self.expr(operand, scope)?, step)))
            }
            _ => Ok(None),
        }
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], scope: Scope<'_>) -> GenResult<String> {
        let text = match lowering::classify_call(callee) {
            CallShape::Builtin(id, _) => {
                let rendered = self.args(args, scope)?;
                builtin_call(id, args.len(), &rendered)
            }
            CallShape::Plain(name) => format!("{}({})", escape_ident(name), self.owned_args(args, scope)?),
            CallShape::Qualified(parts) => format!("{}({})", path(parts), self.owned_args(args, scope)?),
            CallShape::Method { receiver, name } => match receiver {
                Expr::Identifier(ty) if self.known.contains(ty) => {
                    format!("{}::{}({})", escape_ident(ty), escape_ident(name), self.owned_args(args, scope)?)
                }
                _ => format!(
                    "{}.{}({})",
                    self.operand(receiver, scope)?,
                    escape_ident(name),
                    self.owned_args(args, scope)?
                ),
            },
            CallShape::Other(expr) => format!("({})({})", self.expr(expr, scope)?, self.owned_args(args, scope)?),
        };
        Ok(text)
    }

    fn lambda(&mut self, params: &[Parameter], body: &LambdaBody, scope: Scope<'_>) -> GenResult<String> {
        let mut rendered = Vec::with_capacity(params.len());
        for param in params {
            match &param.ty {
                Some(ty) => {
                    let ty = self.map_type(ty, scope);
                    rendered.push(format!("{}: {}", escape_ident(&param.name), ty));
                }
                None => rendered.push(escape_ident(&param.name)),
            }
        }
        let head = format!("|{}|", rendered.join(", "));
        let scope = scope.closure();
        match body {
            LambdaBody::Expression(expr) => Ok(format!("{} {}", head, self.expr(expr, scope)?)),
            LambdaBody::Block(statements) => {
                let inner = self.capture(|g| g.emit_block(statements, scope))?;
                Ok(format!("{} {{\n{}{}}}", head, inner, self.fragment_indent()))
            }
        }
    }

    /// A block used as a value; its trailing expression statement is the value.
    fn block_expr(&mut self, statements: &[Statement], scope: Scope<'_>) -> GenResult<String> {
        let inner = self.capture(|g| match statements.split_last() {
            Some((Statement::Expression(last), init)) if !is_step(last) => {
                g.emit_block(init, scope)?;
                let value = g.expr(last, scope)?;
                g.out.line(&value);
                Ok(())
            }
            _ => g.emit_block(statements, scope),
        })?;
        Ok(format!("{{\n{}{}}}", inner, self.fragment_indent()))
    }

    /// Expression-position `match`; block arms become immediately-invoked closures.
    pub(super) fn match_expr(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<String> {
        let lowering = lowering::classify_match(node, true);
        tracing::trace!(?lowering, arms = node.arms.len(), "lowering match expression");

        let subject = self.scrutinee(node, scope)?;
        let close_indent = self.fragment_indent();
        let arm_indent = self.out.indent_at(self.nesting + 1);

        self.nesting += 1;
        let arms = self.expression_arms(node, scope);
        self.nesting -= 1;

        let mut text = format!("match {} {{\n", subject);
        for arm in arms? {
            text.push_str(&arm_indent);
            text.push_str(&arm);
            text.push_str(",\n");
        }
        if !lowering::has_default_arm(node.arms.iter().map(|arm| &arm.pattern)) {
            text.push_str(&arm_indent);
            text.push_str("_ => unreachable!(),\n");
        }
        text.push_str(&close_indent);
        text.push('}');
        Ok(text)
    }

    fn expression_arms(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<Vec<String>> {
        let mut rendered = Vec::with_capacity(node.arms.len());
        for arm in lowering::match_arms(node) {
            let pattern = self.pattern(arm.pattern, scope)?;
            let value = match arm.body {
                ArmBody::Expression(expr) => self.owned(expr, scope)?,
                ArmBody::Block(block) => {
                    let scope = scope.closure();
                    let inner = self.capture(|g| {
                        g.emit_block(block, scope)?;
                        if lowering::needs_default_return(block) {
                            g.out.line("return Default::default();");
                        }
                        Ok(())
                    })?;
                    format!("(|| {{\n{}{}}})()", inner, self.fragment_indent())
                }
            };
            rendered.push(format!("{} => {}", pattern, value));
        }
        Ok(rendered)
    }

    /// The matched value; string patterns match against `&*scrutinee`.
    pub(super) fn scrutinee(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<String> {
        let subject = self.operand(&node.scrutinee, scope)?;
        if lowering::has_string_pattern(node.arms.iter().map(|arm| &arm.pattern)) {
            Ok(format!("&*{}", subject))
        } else {
            Ok(subject)
        }
    }

    /// `a | b` alternation, or `_`.
    pub(super) fn pattern(&mut self, pattern: &ArmPattern, scope: Scope<'_>) -> GenResult<String> {
        match pattern {
            ArmPattern::Default => Ok("_".to_string()),
            ArmPattern::Values(values) => {
                let mut alternatives = Vec::with_capacity(values.len());
                for value in values {
                    alternatives.push(self.expr(value, scope)?);
                }
                Ok(alternatives.join(" | "))
            }
        }
    }
}

/// `++` or `--`, which Rust only has as compound assignments.
fn is_step(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Unary {
            op: TokenKind::PlusPlus | TokenKind::MinusMinus,
            ..
        }
    )
}

/// Rename a builtin call to its Rust counterpart.
fn builtin_call(id: BuiltinFnId, arg_count: usize, args: &str) -> String {
    match id {
        BuiltinFnId::Print if arg_count == 0 => "println!()".to_string(),
        BuiltinFnId::Print => {
            let placeholders = vec!["{}"; arg_count].join(" ");
            format!("println!(\"{}\", {})", placeholders, args)
        }
        BuiltinFnId::Len => format!("{}.len()", paren(args)),
        BuiltinFnId::Str => format!("{}.to_string()", paren(args)),
        BuiltinFnId::Abs => format!("({}).abs()", args),
        BuiltinFnId::Min => format!("std::cmp::min({})", args),
        BuiltinFnId::Max => format!("std::cmp::max({})", args),
        BuiltinFnId::Sqrt => format!("({} as f64).sqrt()", args),
    }
}

/// Wrap text in parentheses unless it is a plain path or call chain.
fn paren(text: &str) -> String {
    let simple = text
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '(' | ')' | '"' | '[' | ']'));
    if simple && !text.starts_with('-') { text.to_string() } else { format!("({})", text) }
}

/// `Vec<i64>` -> `Vec::<i64>` so the type can prefix an associated call.
pub fn turbofish(ty: &str) -> String {
    match ty.find('<') {
        Some(pos) if !ty[..pos].ends_with("::") => format!("{}::{}", &ty[..pos], &ty[pos..]),
        _ => ty.to_string(),
    }
}

fn path(parts: &[Ident]) -> String {
    parts.iter().map(|part| escape_ident(part)).collect::<Vec<_>>().join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("match"), "r#match");
        assert_eq!(escape_ident("self"), "self_");
        assert_eq!(escape_ident("total"), "total");
    }

    #[test]
    fn test_turbofish() {
        assert_eq!(turbofish("Vec<i64>"), "Vec::<i64>");
        assert_eq!(turbofish("Point"), "Point");
        assert_eq!(turbofish("Pair<String, Vec<f64>>"), "Pair::<String, Vec<f64>>");
    }

    #[test]
    fn test_builtin_print() {
        assert_eq!(builtin_call(BuiltinFnId::Print, 0, ""), "println!()");
        assert_eq!(builtin_call(BuiltinFnId::Print, 2, "a, b"), "println!(\"{} {}\", a, b)");
        assert_eq!(builtin_call(BuiltinFnId::Len, 1, "items"), "items.len()");
        assert_eq!(builtin_call(BuiltinFnId::Len, 1, "a + b"), "(a + b).len()");
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal(&Literal::Null), "None");
        assert_eq!(literal(&Literal::String("tab\t".into())), "\"tab\\t\"");
    }
}
