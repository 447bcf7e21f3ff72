//! Statement emission for C#, including `switch` lowering of matches.

use polyemit_syntax::ast::*;

use super::expressions::escape_ident;
use super::types::UNTYPED;
use super::{CSharpGenerator, LoopFrame, TARGET};
use super::declarations::FunctionOptions;
use crate::backend::lowering::{self, ArmBody, LoweredArm};
use crate::backend::{GenResult, GenerateError, Scope};
use crate::diagnostics::Diagnostic;

impl CSharpGenerator<'_> {
    pub(super) fn emit_block(&mut self, statements: &[Statement], scope: Scope<'_>) -> GenResult<()> {
        for stmt in statements {
            self.emit_statement(stmt, scope)?;
        }
        Ok(())
    }

    pub(super) fn emit_statement(&mut self, stmt: &Statement, scope: Scope<'_>) -> GenResult<()> {
        match stmt {
            Statement::Variable(var) => {
                let text = self.variable(var, scope)?;
                self.out.line(&format!("{};", text));
            }
            Statement::If(s) => self.emit_if(s, scope)?,
            Statement::While(s) => {
                let condition = self.expr(&s.condition, scope)?;
                self.emit_loop(&format!("while ({})", condition), &s.body, scope)?;
            }
            Statement::For(s) => self.emit_for(s, scope)?,
            Statement::Return(None) => self.out.line("return;"),
            Statement::Return(Some(value)) => {
                let value = self.expr(value, scope)?;
                self.out.line(&format!("return {};", value));
            }
            Statement::Break => match self.loops.last_mut() {
                Some(frame) if frame.switch_depth > 0 => {
                    frame.exit_used = true;
                    self.out.line(&format!("goto {};", frame.label));
                }
                _ => self.out.line("break;"),
            },
            Statement::Continue => self.out.line("continue;"),
            Statement::Match(node) => self.emit_match(node, scope)?,
            Statement::Expression(Expr::Match(node)) => self.emit_match(node, scope)?,
            Statement::Switch(switch) => {
                let arms = lowering::switch_arms(switch);
                self.emit_switch(&switch.subject, &arms, scope)?;
            }
            Statement::Expression(expr) => self.emit_expression_statement(expr, scope)?,
            Statement::Raw(raw) => self.emit_raw(raw),
            Statement::Function(func) | Statement::Method(func) => {
                self.out.separator();
                let options = FunctionOptions {
                    local: true,
                    ..FunctionOptions::default()
                };
                let saved_loops = std::mem::take(&mut self.loops);
                let result = self.emit_function(func, scope, options);
                self.loops = saved_loops;
                result?;
            }
            Statement::Class(TypeDecl { name, .. })
            | Statement::Struct(TypeDecl { name, .. })
            | Statement::Interface(TypeDecl { name, .. })
            | Statement::Enum(EnumDecl { name, .. }) => {
                return Err(GenerateError::NestedType {
                    outer: scope.class_name.unwrap_or("function body").to_string(),
                    inner: name.clone(),
                });
            }
            Statement::Import(_)
            | Statement::Include(_)
            | Statement::TypeAlias(_)
            | Statement::Namespace(_)
            | Statement::Module(_)
            | Statement::Field(_)
            | Statement::Property(_) => {
                self.diagnostics.report(
                    Diagnostic::warning(format!("{} is not allowed inside a function body; skipped", stmt.kind_name()))
                        .with_context(scope.class_name.unwrap_or(TARGET)),
                );
            }
        }
        Ok(())
    }

    /// `var x = v`, `T x = v`, `const T x = v` (no trailing semicolon).
    fn variable(&mut self, var: &VariableDecl, scope: Scope<'_>) -> GenResult<String> {
        let name = escape_ident(&var.name);
        let value = match &var.value {
            Some(value) => Some(self.expr(value, scope)?),
            None => None,
        };
        let ty = var.ty.as_ref().map(|ty| self.map_type(ty, scope));
        Ok(match (var.kind, ty, value) {
            (BindingKind::Const, Some(ty), Some(value)) => format!("const {} {} = {}", ty, name, value),
            (_, Some(ty), Some(value)) => format!("{} {} = {}", ty, name, value),
            (_, Some(ty), None) => format!("{} {}", ty, name),
            (_, None, Some(value)) => format!("var {} = {}", name, value),
            (_, None, None) => format!("{} {}", UNTYPED, name),
        })
    }

    fn emit_expression_statement(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<()> {
        let text = self.expr(expr, scope)?;
        if lowering::is_statement_expression(expr) {
            self.out.line(&format!("{};", text));
        } else {
            // C# rejects bare values as statements
            self.out.line(&format!("_ = {};", text));
        }
        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStmt, scope: Scope<'_>) -> GenResult<()> {
        let condition = self.expr(&stmt.condition, scope)?;
        self.out.open_block(&format!("if ({})", condition));
        self.emit_block(&stmt.then_branch, scope)?;
        self.out.close_block();

        let mut else_branch = stmt.else_branch.as_deref();
        while let Some(branch) = else_branch {
            match branch {
                [Statement::If(nested)] => {
                    let condition = self.expr(&nested.condition, scope)?;
                    self.out.open_block(&format!("else if ({})", condition));
                    self.emit_block(&nested.then_branch, scope)?;
                    self.out.close_block();
                    else_branch = nested.else_branch.as_deref();
                }
                _ => {
                    self.out.open_block("else");
                    self.emit_block(branch, scope)?;
                    self.out.close_block();
                    else_branch = None;
                }
            }
        }
        Ok(())
    }

    fn emit_for(&mut self, stmt: &ForStmt, scope: Scope<'_>) -> GenResult<()> {
        let header = match &stmt.kind {
            ForKind::CStyle {
                init,
                condition,
                increment,
            } => {
                let init = match init.as_deref() {
                    Some(init) => self.for_clause(init, scope)?,
                    None => String::new(),
                };
                let condition = match condition {
                    Some(condition) => format!(" {}", self.expr(condition, scope)?),
                    None => String::new(),
                };
                let increment = match increment {
                    Some(increment) => format!(" {}", self.expr(increment, scope)?),
                    None => String::new(),
                };
                format!("for ({};{};{})", init, condition, increment)
            }
            ForKind::Iteration {
                variable,
                variable_type,
                iterable,
            } => {
                let ty = self.map_type_or(variable_type.as_ref(), "var", scope);
                let name = escape_ident(variable);
                match lowering::range_parts(iterable) {
                    Some(parts) if parts.end.is_none() => {
                        let start = match parts.start {
                            Some(start) => self.expr(start, scope)?,
                            None => "0".to_string(),
                        };
                        format!("for ({} {} = {}; ; {}++)", ty, name, start, name)
                    }
                    Some(parts) => format!("foreach ({} {} in {})", ty, name, self.index_sequence(&parts, scope)?),
                    None => format!("foreach ({} {} in {})", ty, name, self.expr(iterable, scope)?),
                }
            }
        };
        self.emit_loop(&header, &stmt.body, scope)
    }

    /// A loop body; the exit label follows the loop when a `break` inside a `switch` jumped to it.
    fn emit_loop(&mut self, header: &str, body: &[Statement], scope: Scope<'_>) -> GenResult<()> {
        let label = format!("loop_exit_{}", self.loop_exits);
        self.loop_exits += 1;
        self.loops.push(LoopFrame {
            label,
            switch_depth: 0,
            exit_used: false,
        });
        self.out.open_block(header);
        let result = self.emit_block(body, scope);
        self.out.close_block();
        let frame = self.loops.pop();
        result?;
        if let Some(frame) = frame.filter(|frame| frame.exit_used) {
            self.out.line(&format!("{}: ;", frame.label));
        }
        Ok(())
    }

    /// The init clause of a C-style `for`.
    fn for_clause(&mut self, init: &Statement, scope: Scope<'_>) -> GenResult<String> {
        match init {
            Statement::Variable(var) => self.variable(var, scope),
            Statement::Expression(expr) => self.expr(expr, scope),
            other => {
                self.diagnostics.report(Diagnostic::warning(format!(
                    "{} cannot initialize a for loop; dropped",
                    other.kind_name()
                )));
                Ok(String::new())
            }
        }
    }

    fn emit_match(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<()> {
        let lowering = lowering::classify_match(node, false);
        tracing::trace!(?lowering, arms = node.arms.len(), "lowering statement match");
        let arms = lowering::match_arms(node);
        self.emit_switch(&node.scrutinee, &arms, scope)
    }

    /// Native `switch` with one `case` label per value and a `break;` wherever control would fall through.
    fn emit_switch(&mut self, subject: &Expr, arms: &[LoweredArm<'_>], scope: Scope<'_>) -> GenResult<()> {
        let subject = self.expr(subject, scope)?;
        self.out.open_block(&format!("switch ({})", subject));
        if let Some(frame) = self.loops.last_mut() {
            frame.switch_depth += 1;
        }
        for arm in arms {
            match arm.pattern {
                ArmPattern::Default => self.out.line("default:"),
                ArmPattern::Values(values) => {
                    for value in values {
                        let value = self.expr(value, scope)?;
                        self.out.line(&format!("case {}:", value));
                    }
                }
            }
            self.out.indent();
            match arm.body {
                ArmBody::Expression(expr) => {
                    self.emit_expression_statement(expr, scope)?;
                    self.out.line("break;");
                }
                ArmBody::Block(block) => {
                    // cases share one declaration space
                    let scoped = block.iter().any(|stmt| matches!(stmt, Statement::Variable(_)));
                    if scoped {
                        self.out.line("{");
                        self.out.indent();
                    }
                    self.emit_block(block, scope)?;
                    if !lowering::ends_with_jump(block) {
                        self.out.line("break;");
                    }
                    if scoped {
                        self.out.close_block();
                    }
                }
            }
            self.out.dedent();
        }
        if let Some(frame) = self.loops.last_mut() {
            frame.switch_depth -= 1;
        }
        self.out.close_block();
        Ok(())
    }

    /// Expression-position match as a `switch` expression; block arms become invoked closures.
    pub(super) fn match_expr(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<String> {
        let lowering = lowering::classify_match(node, true);
        tracing::trace!(?lowering, arms = node.arms.len(), "lowering match expression");

        let subject = self.operand(&node.scrutinee, scope)?;
        let open_indent = self.fragment_indent();
        let arm_indent = self.out.indent_at(self.nesting + 1);

        self.nesting += 1;
        let arms = self.switch_expression_arms(node, scope);
        self.nesting -= 1;

        let mut text = format!("{} switch\n{}{{\n", subject, open_indent);
        for arm in arms? {
            text.push_str(&arm_indent);
            text.push_str(&arm);
            text.push_str(",\n");
        }
        text.push_str(&open_indent);
        text.push('}');
        Ok(text)
    }

    fn switch_expression_arms(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<Vec<String>> {
        let mut rendered = Vec::with_capacity(node.arms.len());
        for arm in lowering::match_arms(node) {
            let pattern = match arm.pattern {
                ArmPattern::Default => "_".to_string(),
                ArmPattern::Values(values) => {
                    let mut alternatives = Vec::with_capacity(values.len());
                    for value in values {
                        alternatives.push(self.expr(value, scope)?);
                    }
                    alternatives.join(" or ")
                }
            };
            let value = match arm.body {
                ArmBody::Expression(expr) => self.expr(expr, scope)?,
                ArmBody::Block(block) => {
                    let scope = scope.closure();
                    self.invoked_closure(|g| g.emit_closure_body(block, scope))?
                }
            };
            rendered.push(format!("{} => {}", pattern, value));
        }
        Ok(rendered)
    }

    /// Raw text goes out verbatim unless it is pinned to another target.
    pub(super) fn emit_raw(&mut self, raw: &RawBlock) {
        match raw.target.as_deref() {
            Some(target) if !Self::is_own_target(target) => {
                self.diagnostics.report(
                    Diagnostic::info(format!("raw block for `{}` skipped", target)).with_context(TARGET),
                );
            }
            _ => self.out.verbatim(&raw.code),
        }
    }
}
