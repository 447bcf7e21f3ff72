//! Expression emission for C#
//!
//! Expressions render to strings. Multi-line fragments (block lambdas, immediately-invoked closures, switch
//! expressions) carry their own indentation relative to the statement they end up in.

use polyemit_core::lang::builtins::{self, BuiltinFnId};
use polyemit_core::lang::keywords;
use polyemit_syntax::TokenKind;
use polyemit_syntax::ast::*;

use super::{CSharpGenerator, TARGET};
use super::types::{NS_LINQ, NS_SYSTEM, UNTYPED, binary_op, unary_op};
use crate::backend::lowering::{self, CallShape, RangeParts};
use crate::backend::{GenResult, Scope};
use crate::diagnostics::Diagnostic;

/// Escape an identifier that collides with a reserved C# keyword.
pub fn escape_ident(name: &str) -> String {
    if keywords::is_csharp_keyword(name) {
        format!("@{}", name)
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
        Literal::Null => "null".to_string(),
    }
}

/// Whether an operand must be parenthesized to keep the tree's grouping.
fn needs_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary { .. } | Expr::Assignment { .. } | Expr::Lambda { .. } | Expr::Range { .. } | Expr::Match(_)
    ) || matches!(expr, Expr::Unary { postfix: false, .. })
}

impl CSharpGenerator<'_> {
    /// Emit an expression
    pub(super) fn expr(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<String> {
        let text = match expr {
            Expr::Literal(lit) => literal(lit),
            Expr::Identifier(name) => escape_ident(name),
            Expr::QualifiedIdentifier(parts) => qualified(parts),
            Expr::MemberAccess { object, member } => {
                format!("{}.{}", self.operand(object, scope)?, escape_ident(member))
            }
            Expr::IndexAccess { object, index } => {
                format!("{}[{}]", self.operand(object, scope)?, self.expr(index, scope)?)
            }
            Expr::Binary { left, op, right } => self.binary(left, *op, right, scope)?,
            Expr::Unary { op, operand, postfix } => {
                let inner = self.operand(operand, scope)?;
                let symbol = unary_op(*op);
                if *postfix {
                    format!("{}{}", inner, symbol)
                } else {
                    format!("{}{}", symbol, inner)
                }
            }
            Expr::Assignment { target, op, value } => {
                format!("{} {} {}", self.expr(target, scope)?, binary_op(*op), self.expr(value, scope)?)
            }
            Expr::Call { callee, args } => self.call(callee, args, scope)?,
            Expr::ConstructorCall { ty, args } => {
                format!("new {}({})", self.map_type(ty, scope), self.args(args, scope)?)
            }
            Expr::ArrayLiteral { elements, element_type } => {
                self.array_literal(elements, element_type.as_ref(), scope)?
            }
            Expr::Lambda { params, body } => self.lambda(params, body, scope)?,
            Expr::Range { start, end, inclusive } => {
                let parts = RangeParts {
                    start: start.as_deref(),
                    end: end.as_deref(),
                    inclusive: *inclusive,
                };
                self.index_sequence(&parts, scope)?
            }
            Expr::Block(statements) => self.block_expr(statements, scope)?,
            Expr::Match(node) => self.match_expr(node, scope)?,
            Expr::This => "this".to_string(),
        };
        Ok(text)
    }

    /// Emit an expression used as an operand, parenthesized when needed.
    pub(super) fn operand(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<String> {
        let text = self.expr(expr, scope)?;
        Ok(if needs_parens(expr) { format!("({})", text) } else { text })
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
        if op == TokenKind::StarStar {
            self.require_namespace(NS_SYSTEM);
            return Ok(format!("Math.Pow({}, {})", l, r));
        }
        Ok(format!("{} {} {}", l, binary_op(op), r))
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], scope: Scope<'_>) -> GenResult<String> {
        let rendered = self.args(args, scope)?;
        let text = match lowering::classify_call(callee) {
            CallShape::Builtin(id, _) if self.config.emit_shims => format!("{}({})", builtins::as_str(id), rendered),
            CallShape::Builtin(id, _) => self.builtin_call(id, args.len(), rendered),
            CallShape::Plain(name) => format!("{}({})", escape_ident(name), rendered),
            CallShape::Qualified(parts) => format!("{}({})", qualified(parts), rendered),
            CallShape::Method { receiver, name } => {
                format!("{}.{}({})", self.operand(receiver, scope)?, escape_ident(name), rendered)
            }
            CallShape::Other(expr) => format!("{}({})", self.operand(expr, scope)?, rendered),
        };
        Ok(text)
    }

    /// Rename a bare builtin call to its .NET counterpart.
    fn builtin_call(&mut self, id: BuiltinFnId, arg_count: usize, args: String) -> String {
        self.require_namespace(NS_SYSTEM);
        match id {
            BuiltinFnId::Print if arg_count > 1 => format!("Console.WriteLine(string.Join(\" \", {}))", args),
            BuiltinFnId::Print => format!("Console.WriteLine({})", args),
            BuiltinFnId::Len => {
                self.require_namespace(NS_LINQ);
                format!("Enumerable.Count({})", args)
            }
            BuiltinFnId::Str => format!("Convert.ToString({})", args),
            BuiltinFnId::Abs => format!("Math.Abs({})", args),
            BuiltinFnId::Min => format!("Math.Min({})", args),
            BuiltinFnId::Max => format!("Math.Max({})", args),
            BuiltinFnId::Sqrt => format!("Math.Sqrt({})", args),
        }
    }

    fn array_literal(
        &mut self,
        elements: &[Expr],
        element_type: Option<&TypeRef>,
        scope: Scope<'_>,
    ) -> GenResult<String> {
        let items = self.args(elements, scope)?;
        let body = if items.is_empty() { "{ }".to_string() } else { format!("{{ {} }}", items) };
        Ok(match element_type {
            Some(ty) => format!("new {}[] {}", self.map_type(ty, scope), body),
            None if elements.is_empty() => format!("new object[] {}", body),
            None => format!("new[] {}", body),
        })
    }

    fn lambda(&mut self, params: &[Parameter], body: &LambdaBody, scope: Scope<'_>) -> GenResult<String> {
        let typed = params.iter().any(|p| p.ty.is_some());
        let head = match params {
            [single] if !typed => escape_ident(&single.name),
            _ => {
                let mut rendered = Vec::with_capacity(params.len());
                for param in params {
                    if typed {
                        let ty = self.map_type_or(param.ty.as_ref(), UNTYPED, scope);
                        rendered.push(format!("{} {}", ty, escape_ident(&param.name)));
                    } else {
                        rendered.push(escape_ident(&param.name));
                    }
                }
                format!("({})", rendered.join(", "))
            }
        };
        let scope = scope.closure();
        match body {
            LambdaBody::Expression(expr) => Ok(format!("{} => {}", head, self.expr(expr, scope)?)),
            LambdaBody::Block(statements) => {
                let inner = self.capture(|g| g.emit_block(statements, scope))?;
                Ok(format!("{} => {{\n{}{}}}", head, inner, self.fragment_indent()))
            }
        }
    }

    /// `Enumerable.Range(start, count)` for a range with an end; open-ended ranges count up to `int.MaxValue`.
    pub(super) fn index_sequence(&mut self, parts: &RangeParts<'_>, scope: Scope<'_>) -> GenResult<String> {
        self.require_namespace(NS_LINQ);
        let start = match parts.start {
            Some(start) => self.expr(start, scope)?,
            None => "0".to_string(),
        };
        let count = self.range_count(parts, scope)?;
        Ok(format!("Enumerable.Range({}, {})", start, count))
    }

    /// `end - start` (`+ 1` when inclusive), folded when both bounds are integer literals.
    ///
    /// `Enumerable.Range` counts with an `int`; a literal range longer than that is left unfolded with a warning.
    fn range_count(&mut self, parts: &RangeParts<'_>, scope: Scope<'_>) -> GenResult<String> {
        match lowering::constant_range_count(parts).map(i32::try_from) {
            Some(Ok(count)) => return Ok(count.to_string()),
            _ if lowering::has_literal_bounds(parts) => {
                self.diagnostics.report(
                    Diagnostic::warning("range has more elements than `Enumerable.Range` can count")
                        .with_context(TARGET)
                        .with_note("the count exceeds `int.MaxValue`"),
                );
            }
            _ => {}
        }
        let end = match parts.end {
            Some(end) => self.operand(end, scope)?,
            None => "int.MaxValue".to_string(),
        };
        let mut count = match parts.start {
            Some(start) if lowering::integer_literal(start) != Some(0) => {
                format!("{} - {}", end, self.operand(start, scope)?)
            }
            _ => end,
        };
        if parts.inclusive && parts.end.is_some() {
            count.push_str(" + 1");
        }
        Ok(count)
    }

    /// A block used as a value: an immediately-invoked `Func<dynamic>` whose last expression is returned.
    fn block_expr(&mut self, statements: &[Statement], scope: Scope<'_>) -> GenResult<String> {
        let scope = scope.closure();
        self.invoked_closure(|g| match statements.split_last() {
            Some((Statement::Expression(last), init)) => {
                g.emit_block(init, scope)?;
                let value = g.expr(last, scope)?;
                g.out.line(&format!("return {};", value));
                Ok(())
            }
            _ => g.emit_closure_body(statements, scope),
        })
    }

    /// Statements followed by `return null;` unless they already end in a return.
    pub(super) fn emit_closure_body(&mut self, statements: &[Statement], scope: Scope<'_>) -> GenResult<()> {
        self.emit_block(statements, scope)?;
        if lowering::needs_default_return(statements) {
            self.out.line("return null;");
        }
        Ok(())
    }

    /// Wrap whatever `body` emits in an immediately-invoked `Func<dynamic>`.
    pub(super) fn invoked_closure<F>(&mut self, body: F) -> GenResult<String>
    where
        F: FnOnce(&mut Self) -> GenResult<()>,
    {
        self.require_namespace(NS_SYSTEM);
        let inner = self.capture(body)?;
        Ok(format!("((Func<dynamic>)(() => {{\n{}{}}}))()", inner, self.fragment_indent()))
    }
}

fn qualified(parts: &[Ident]) -> String {
    parts.iter().map(|part| escape_ident(part)).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_ident() {
        assert_eq!(escape_ident("class"), "@class");
        assert_eq!(escape_ident("value"), "value");
    }

    #[test]
    fn test_literals() {
        assert_eq!(literal(&Literal::String("say \"hi\"".into())), "\"say \\\"hi\\\"\"");
        assert_eq!(literal(&Literal::Char('\'')), "'\\''");
        assert_eq!(literal(&Literal::Bool(false)), "false");
        assert_eq!(literal(&Literal::Null), "null");
        assert_eq!(literal(&Literal::Number("1_000".into())), "1_000");
    }
}
