//! Statement emission for Rust, including `match` lowering and the C-style `for` rewrite.

use polyemit_syntax::ast::*;

use super::declarations::FunctionOptions;
use super::expressions::escape_ident;
use super::{RustGenerator, TARGET};
use crate::backend::lowering::{self, ArmBody, LoweredArm};
use crate::backend::{GenResult, GenerateError, Scope};
use crate::diagnostics::Diagnostic;

impl RustGenerator<'_> {
    pub(super) fn emit_block(&mut self, statements: &[Statement], scope: Scope<'_>) -> GenResult<()> {
        for stmt in statements {
            self.emit_statement(stmt, scope)?;
        }
        Ok(())
    }

    pub(super) fn emit_statement(&mut self, stmt: &Statement, scope: Scope<'_>) -> GenResult<()> {
        match stmt {
            Statement::Variable(var) => {
                let text = self.binding(var, false, scope)?;
                self.out.line(&format!("{};", text));
            }
            Statement::If(s) => self.emit_if(s, scope)?,
            Statement::While(s) => {
                let condition = self.expr(&s.condition, scope)?;
                self.out.open_block(&format!("while {}", condition));
                self.emit_block(&s.body, scope.with_continue_label(None))?;
                self.out.close_block();
            }
            Statement::For(s) => self.emit_for(s, scope)?,
            Statement::Return(None) => self.out.line("return;"),
            Statement::Return(Some(value)) => {
                let mut text = self.owned(value, scope)?;
                // returning a field out of `&self`
                if matches!(value, Expr::MemberAccess { object, .. } if lowering::rooted_in_this(object)) {
                    text.push_str(".clone()");
                }
                self.out.line(&format!("return {};", text));
            }
            Statement::Break => self.out.line("break;"),
            Statement::Continue => match scope.continue_label {
                Some(label) => self.out.line(&format!("break {};", label)),
                None => self.out.line("continue;"),
            },
            Statement::Match(node) => self.emit_match(node, scope)?,
            Statement::Expression(Expr::Match(node)) => self.emit_match(node, scope)?,
            Statement::Switch(switch) => {
                let subject = self.operand(&switch.subject, scope)?;
                let subject = if lowering::has_string_pattern(switch.cases.iter().map(|case| &case.pattern)) {
                    format!("&*{}", subject)
                } else {
                    subject
                };
                let arms = lowering::switch_arms(switch);
                self.emit_match_arms(&subject, &arms, scope)?;
            }
            Statement::Expression(expr) => {
                let text = self.statement_expr(expr, scope)?;
                self.out.line(&format!("{};", text));
            }
            Statement::Raw(raw) => self.emit_raw(raw),
            Statement::Function(func) | Statement::Method(func) => {
                self.out.separator();
                let options = FunctionOptions {
                    visibility: "",
                    ..FunctionOptions::default()
                };
                self.emit_function(func, scope.closure(), options)?;
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

    /// An expression statement without its semicolon; `++`/`--` become compound assignments.
    fn statement_expr(&mut self, expr: &Expr, scope: Scope<'_>) -> GenResult<String> {
        match self.step_statement(expr, scope)? {
            Some(step) => Ok(step),
            None => self.expr(expr, scope),
        }
    }

    /// `let x = v` / `let mut x: T = v` (no trailing semicolon).
    fn binding(&mut self, var: &VariableDecl, force_mut: bool, scope: Scope<'_>) -> GenResult<String> {
        let keyword = if force_mut || var.kind == BindingKind::Var { "let mut" } else { "let" };
        let mut text = format!("{} {}", keyword, escape_ident(&var.name));
        if let Some(ty) = &var.ty {
            text.push_str(&format!(": {}", self.map_type(ty, scope)));
        }
        if let Some(value) = &var.value {
            text.push_str(&format!(" = {}", self.owned(value, scope)?));
        }
        Ok(text)
    }

    fn emit_if(&mut self, stmt: &IfStmt, scope: Scope<'_>) -> GenResult<()> {
        let condition = self.expr(&stmt.condition, scope)?;
        self.out.open_block(&format!("if {}", condition));
        self.emit_block(&stmt.then_branch, scope)?;

        let mut else_branch = stmt.else_branch.as_deref();
        while let Some(branch) = else_branch {
            self.out.dedent();
            match branch {
                [Statement::If(nested)] => {
                    let condition = self.expr(&nested.condition, scope)?;
                    self.out.line(&format!("}} else if {} {{", condition));
                    self.out.indent();
                    self.emit_block(&nested.then_branch, scope)?;
                    else_branch = nested.else_branch.as_deref();
                }
                _ => {
                    self.out.line("} else {");
                    self.out.indent();
                    self.emit_block(branch, scope)?;
                    else_branch = None;
                }
            }
        }
        self.out.close_block();
        Ok(())
    }

    fn emit_for(&mut self, stmt: &ForStmt, scope: Scope<'_>) -> GenResult<()> {
        match &stmt.kind {
            ForKind::CStyle {
                init,
                condition,
                increment,
            } => self.emit_c_style_for(init.as_deref(), condition.as_ref(), increment.as_ref(), &stmt.body, scope),
            ForKind::Iteration { variable, iterable, .. } => {
                let iterable = match iterable {
                    Expr::Range { .. } => self.expr(iterable, scope)?,
                    // iterate a copy so the collection stays usable after the loop
                    Expr::Identifier(_) | Expr::MemberAccess { .. } => {
                        format!("{}.clone()", self.expr(iterable, scope)?)
                    }
                    other => self.expr(other, scope)?,
                };
                self.out.open_block(&format!("for {} in {}", escape_ident(variable), iterable));
                self.emit_block(&stmt.body, scope.with_continue_label(None))?;
                self.out.close_block();
                Ok(())
            }
        }
    }

    /// `{ init; while cond { 'body: { .. } incr; } }`
    ///
    /// A `continue` in the body breaks out of the labeled body block so the increment still runs.
    fn emit_c_style_for(
        &mut self,
        init: Option<&Statement>,
        condition: Option<&Expr>,
        increment: Option<&Expr>,
        body: &[Statement],
        scope: Scope<'_>,
    ) -> GenResult<()> {
        if init.is_some() {
            self.out.line("{");
            self.out.indent();
        }
        match init {
            Some(Statement::Variable(var)) => {
                let text = self.binding(var, true, scope)?;
                self.out.line(&format!("{};", text));
            }
            Some(Statement::Expression(expr)) => {
                let text = self.statement_expr(expr, scope)?;
                self.out.line(&format!("{};", text));
            }
            Some(other) => {
                self.diagnostics.report(Diagnostic::warning(format!(
                    "{} cannot initialize a for loop; dropped",
                    other.kind_name()
                )));
            }
            None => {}
        }

        let header = match condition {
            Some(condition) => format!("while {}", self.expr(condition, scope)?),
            None => "loop".to_string(),
        };
        self.out.open_block(&header);
        let label = (increment.is_some() && lowering::contains_continue(body)).then(|| self.next_loop_label());
        match &label {
            Some(label) => {
                self.out.open_block(&format!("{}:", label));
                self.emit_block(body, scope.with_continue_label(Some(label.as_str())))?;
                self.out.close_block();
            }
            None => self.emit_block(body, scope.with_continue_label(None))?,
        }
        if let Some(increment) = increment {
            let text = self.statement_expr(increment, scope)?;
            self.out.line(&format!("{};", text));
        }
        self.out.close_block();

        if init.is_some() {
            self.out.close_block();
        }
        Ok(())
    }

    fn emit_match(&mut self, node: &MatchNode, scope: Scope<'_>) -> GenResult<()> {
        let lowering = lowering::classify_match(node, false);
        tracing::trace!(?lowering, arms = node.arms.len(), "lowering statement match");
        let subject = self.scrutinee(node, scope)?;
        let arms = lowering::match_arms(node);
        self.emit_match_arms(&subject, &arms, scope)
    }

    /// Statement-position `match`; adds `_ => {}` when no arm is the wildcard.
    fn emit_match_arms(&mut self, subject: &str, arms: &[LoweredArm<'_>], scope: Scope<'_>) -> GenResult<()> {
        self.out.open_block(&format!("match {}", subject));
        for arm in arms {
            let pattern = self.pattern(arm.pattern, scope)?;
            match arm.body {
                ArmBody::Expression(expr) => {
                    let text = self.statement_expr(expr, scope)?;
                    self.out.line(&format!("{} => {{", pattern));
                    self.out.indent();
                    self.out.line(&format!("{};", text));
                    self.out.close_block();
                }
                ArmBody::Block(block) => {
                    self.out.open_block(&format!("{} =>", pattern));
                    self.emit_block(block, scope)?;
                    self.out.close_block();
                }
            }
        }
        if !lowering::has_default_arm(arms.iter().map(|arm| arm.pattern)) {
            self.out.line("_ => {}");
        }
        self.out.close_block();
        Ok(())
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
