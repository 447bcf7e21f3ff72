//! Lowering policy shared by every backend.
//!
//! These helpers only inspect the AST: they decide *which* shape a construct lowers to (native switch, expression
//! switch, immediately-invoked closure, index sequence) and leave the spelling to the target emitters.

use polyemit_core::lang::builtins::{self, BuiltinFnId};
use polyemit_syntax::ast::*;
use polyemit_syntax::TokenKind;

// ============================================================================
// Match / switch lowering
// ============================================================================

/// Lowered shape of a match, decided by position and arm forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLowering {
    /// Native multi-way branch; every arm is a single expression.
    StatementSimple,
    /// Native multi-way branch; at least one arm is a statement block.
    StatementWithBlocks,
    /// Native expression switch.
    ExpressionSimple,
    /// Expression switch whose block arms become immediately-invoked closures.
    ExpressionWithClosures,
}

impl MatchLowering {
    pub fn is_expression(self) -> bool {
        matches!(self, MatchLowering::ExpressionSimple | MatchLowering::ExpressionWithClosures)
    }
}

/// Classify a match by where it appears.
pub fn classify_match(node: &MatchNode, in_expression: bool) -> MatchLowering {
    match (in_expression, has_block_arm(node)) {
        (false, false) => MatchLowering::StatementSimple,
        (false, true) => MatchLowering::StatementWithBlocks,
        (true, false) => MatchLowering::ExpressionSimple,
        (true, true) => MatchLowering::ExpressionWithClosures,
    }
}

pub fn has_block_arm(node: &MatchNode) -> bool {
    node.arms.iter().any(|arm| matches!(arm.result, ArmResult::Block(_)))
}

pub fn has_default_arm<'a>(patterns: impl IntoIterator<Item = &'a ArmPattern>) -> bool {
    patterns.into_iter().any(|p| matches!(p, ArmPattern::Default))
}

/// Whether any value pattern is a string literal (Rust then matches on `&*scrutinee`).
pub fn has_string_pattern<'a>(patterns: impl IntoIterator<Item = &'a ArmPattern>) -> bool {
    patterns.into_iter().any(|p| match p {
        ArmPattern::Values(values) => values.iter().any(Expr::is_string_literal),
        ArmPattern::Default => false,
    })
}

/// Body of one arm, shared by match arms and switch cases.
#[derive(Debug, Clone, Copy)]
pub enum ArmBody<'a> {
    Expression(&'a Expr),
    Block(&'a [Statement]),
}

/// One arm of a match or switch, ready to render.
#[derive(Debug, Clone, Copy)]
pub struct LoweredArm<'a> {
    pub pattern: &'a ArmPattern,
    pub body: ArmBody<'a>,
}

pub fn match_arms(node: &MatchNode) -> Vec<LoweredArm<'_>> {
    node.arms
        .iter()
        .map(|arm| LoweredArm {
            pattern: &arm.pattern,
            body: match &arm.result {
                ArmResult::Expression(e) => ArmBody::Expression(e),
                ArmResult::Block(block) => ArmBody::Block(block),
            },
        })
        .collect()
}

/// Switch cases lower exactly like a statement match with block arms.
pub fn switch_arms(switch: &SwitchStmt) -> Vec<LoweredArm<'_>> {
    switch
        .cases
        .iter()
        .map(|case| LoweredArm {
            pattern: &case.pattern,
            body: ArmBody::Block(&case.body),
        })
        .collect()
}

/// Whether a closure body needs a synthesized default return.
pub fn needs_default_return(block: &[Statement]) -> bool {
    !ends_with_return(block)
}

pub fn ends_with_return(block: &[Statement]) -> bool {
    matches!(block.last(), Some(Statement::Return(_)))
}

/// Whether control never falls off the end of `block` (C# cases need no `break;` then).
pub fn ends_with_jump(block: &[Statement]) -> bool {
    matches!(
        block.last(),
        Some(Statement::Return(_) | Statement::Break | Statement::Continue)
    )
}

// ============================================================================
// Body analysis
// ============================================================================

/// Whether a body returns a value anywhere (not counting nested lambdas).
pub fn returns_value(block: &[Statement]) -> bool {
    block.iter().any(stmt_returns_value)
}

fn stmt_returns_value(stmt: &Statement) -> bool {
    match stmt {
        Statement::Return(value) => value.is_some(),
        Statement::If(s) => returns_value(&s.then_branch) || s.else_branch.as_deref().is_some_and(returns_value),
        Statement::While(s) => returns_value(&s.body),
        Statement::For(s) => returns_value(&s.body),
        Statement::Match(m) => m.arms.iter().any(|arm| match &arm.result {
            ArmResult::Block(block) => returns_value(block),
            ArmResult::Expression(_) => false,
        }),
        Statement::Switch(s) => s.cases.iter().any(|case| returns_value(&case.body)),
        _ => false,
    }
}

/// Whether a method body assigns through `this` (Rust receivers become `&mut self`).
pub fn assigns_to_this(block: &[Statement]) -> bool {
    block.iter().any(stmt_assigns_to_this)
}

fn stmt_assigns_to_this(stmt: &Statement) -> bool {
    match stmt {
        Statement::Expression(e) => expr_assigns_to_this(e),
        Statement::Variable(v) => v.value.as_ref().is_some_and(expr_assigns_to_this),
        Statement::Return(Some(e)) => expr_assigns_to_this(e),
        Statement::If(s) => {
            expr_assigns_to_this(&s.condition)
                || assigns_to_this(&s.then_branch)
                || s.else_branch.as_deref().is_some_and(assigns_to_this)
        }
        Statement::While(s) => assigns_to_this(&s.body),
        Statement::For(s) => {
            let header = match &s.kind {
                ForKind::CStyle { increment, .. } => increment.as_ref().is_some_and(expr_assigns_to_this),
                ForKind::Iteration { .. } => false,
            };
            header || assigns_to_this(&s.body)
        }
        Statement::Match(m) => m.arms.iter().any(|arm| match &arm.result {
            ArmResult::Block(block) => assigns_to_this(block),
            ArmResult::Expression(e) => expr_assigns_to_this(e),
        }),
        Statement::Switch(s) => s.cases.iter().any(|case| assigns_to_this(&case.body)),
        _ => false,
    }
}

fn expr_assigns_to_this(expr: &Expr) -> bool {
    match expr {
        Expr::Assignment { target, value, .. } => rooted_in_this(target) || expr_assigns_to_this(value),
        Expr::Unary { op, operand, .. } => {
            matches!(op, TokenKind::PlusPlus | TokenKind::MinusMinus) && rooted_in_this(operand)
        }
        // `this.items.push(x)` mutates through `this` too
        Expr::Call { callee, args } => {
            let receiver = match callee.as_ref() {
                Expr::MemberAccess { object, .. } => rooted_in_this(object) && !matches!(object.as_ref(), Expr::This),
                _ => false,
            };
            receiver || args.iter().any(expr_assigns_to_this)
        }
        _ => false,
    }
}

/// Whether an lvalue is `this` or a member/index chain starting at `this`.
pub fn rooted_in_this(expr: &Expr) -> bool {
    match expr {
        Expr::This => true,
        Expr::MemberAccess { object, .. } | Expr::IndexAccess { object, .. } => rooted_in_this(object),
        _ => false,
    }
}

/// Whether `continue` appears in `block` at this loop level (not inside nested loops or closures).
pub fn contains_continue(block: &[Statement]) -> bool {
    block.iter().any(|stmt| match stmt {
        Statement::Continue => true,
        Statement::If(s) => {
            contains_continue(&s.then_branch) || s.else_branch.as_deref().is_some_and(contains_continue)
        }
        Statement::Match(m) => m.arms.iter().any(|arm| match &arm.result {
            ArmResult::Block(block) => contains_continue(block),
            ArmResult::Expression(_) => false,
        }),
        Statement::Switch(s) => s.cases.iter().any(|case| contains_continue(&case.body)),
        _ => false,
    })
}

/// Expressions that are valid as statements on their own in C-family targets.
pub fn is_statement_expression(expr: &Expr) -> bool {
    match expr {
        Expr::Call { .. } | Expr::Assignment { .. } | Expr::ConstructorCall { .. } => true,
        Expr::Unary { op, .. } => matches!(op, TokenKind::PlusPlus | TokenKind::MinusMinus),
        _ => false,
    }
}

// ============================================================================
// Calls
// ============================================================================

/// How a call's callee is spelled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CallShape<'e> {
    /// Bare call to a builtin (`print(x)`).
    Builtin(BuiltinFnId, &'e str),
    /// Bare call to anything else.
    Plain(&'e str),
    /// `a.b.c(x)` spelled as a qualified identifier.
    Qualified(&'e [Ident]),
    /// `receiver.name(x)`
    Method { receiver: &'e Expr, name: &'e str },
    /// Any other callee expression.
    Other(&'e Expr),
}

pub fn classify_call(callee: &Expr) -> CallShape<'_> {
    match callee {
        Expr::Identifier(name) => match builtins::from_str(name) {
            Some(id) => CallShape::Builtin(id, name),
            None => CallShape::Plain(name),
        },
        Expr::QualifiedIdentifier(parts) => CallShape::Qualified(parts),
        Expr::MemberAccess { object, member } => CallShape::Method {
            receiver: object,
            name: member,
        },
        other => CallShape::Other(other),
    }
}

// ============================================================================
// Ranges
// ============================================================================

/// The parts of a range expression.
#[derive(Debug, Clone, Copy)]
pub struct RangeParts<'e> {
    pub start: Option<&'e Expr>,
    pub end: Option<&'e Expr>,
    pub inclusive: bool,
}

pub fn range_parts(expr: &Expr) -> Option<RangeParts<'_>> {
    match expr {
        Expr::Range { start, end, inclusive } => Some(RangeParts {
            start: start.as_deref(),
            end: end.as_deref(),
            inclusive: *inclusive,
        }),
        _ => None,
    }
}

/// Integer value of a literal, when it is one.
pub fn integer_literal(expr: &Expr) -> Option<i64> {
    match expr {
        Expr::Literal(Literal::Number(text)) => text.replace('_', "").parse().ok(),
        Expr::Unary {
            op: TokenKind::Minus,
            operand,
            postfix: false,
        } => integer_literal(operand).and_then(i64::checked_neg),
        _ => None,
    }
}

/// Element count of a range whose bounds are integer literals (`count = end - start`, `+ 1` when inclusive).
///
/// `None` when a bound is not an integer literal or the count overflows `i64`.
pub fn constant_range_count(parts: &RangeParts<'_>) -> Option<i64> {
    let start = match parts.start {
        Some(start) => integer_literal(start)?,
        None => 0,
    };
    let end = integer_literal(parts.end?)?;
    let count = end.checked_sub(start)?.checked_add(i64::from(parts.inclusive))?;
    Some(count.max(0))
}

/// Whether both bounds of a range are written as integer literals (an omitted start counts as `0`).
pub fn has_literal_bounds(parts: &RangeParts<'_>) -> bool {
    parts.start.is_none_or(|start| integer_literal(start).is_some())
        && parts.end.is_some_and(|end| integer_literal(end).is_some())
}

// ============================================================================
// Raw blocks
// ============================================================================

/// Targets named by raw blocks anywhere in `statements`.
pub fn raw_block_targets(statements: &[Statement]) -> Vec<&str> {
    let mut targets = Vec::new();
    collect_raw_targets(statements, &mut targets);
    targets
}

fn collect_raw_targets<'a>(statements: &'a [Statement], out: &mut Vec<&'a str>) {
    for stmt in statements {
        match stmt {
            Statement::Raw(RawBlock { target: Some(target), .. }) => out.push(target),
            Statement::Include(include) => collect_raw_targets(&include.program.statements, out),
            Statement::Namespace(ns) => collect_raw_targets(&ns.members, out),
            Statement::Class(decl) | Statement::Struct(decl) | Statement::Interface(decl) => {
                collect_raw_targets(&decl.members, out)
            }
            Statement::Module(module) => collect_raw_targets(&module.members, out),
            Statement::Function(f) | Statement::Method(f) => {
                if let Some(body) = &f.body {
                    collect_raw_targets(body, out);
                }
            }
            Statement::If(s) => {
                collect_raw_targets(&s.then_branch, out);
                if let Some(else_branch) = &s.else_branch {
                    collect_raw_targets(else_branch, out);
                }
            }
            Statement::While(s) => collect_raw_targets(&s.body, out),
            Statement::For(s) => collect_raw_targets(&s.body, out),
            Statement::Match(m) => {
                for arm in &m.arms {
                    if let ArmResult::Block(block) = &arm.result {
                        collect_raw_targets(block, out);
                    }
                }
            }
            Statement::Switch(s) => {
                for case in &s.cases {
                    collect_raw_targets(&case.body, out);
                }
            }
            _ => {}
        }
    }
}

// ============================================================================
// Strings
// ============================================================================

/// Escape text for a double-quoted string literal (same rules for C# and Rust).
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

/// Escape a character for a single-quoted char literal.
pub fn escape_char(c: char) -> String {
    match c {
        '\'' => "\\'".to_string(),
        '\\' => "\\\\".to_string(),
        '\n' => "\\n".to_string(),
        '\r' => "\\r".to_string(),
        '\t' => "\\t".to_string(),
        '\0' => "\\0".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arm(pattern: ArmPattern, result: ArmResult) -> MatchArm {
        MatchArm { pattern, result }
    }

    #[test]
    fn test_classify_match_by_position_and_arms() {
        let simple = MatchNode {
            scrutinee: Expr::ident("x"),
            arms: vec![arm(ArmPattern::Default, ArmResult::Expression(Expr::number("1")))],
        };
        let mut with_block = simple.clone();
        with_block.arms.push(arm(ArmPattern::Values(vec![Expr::number("2")]), ArmResult::Block(vec![])));

        assert_eq!(classify_match(&simple, false), MatchLowering::StatementSimple);
        assert_eq!(classify_match(&with_block, false), MatchLowering::StatementWithBlocks);
        assert_eq!(classify_match(&simple, true), MatchLowering::ExpressionSimple);
        assert_eq!(classify_match(&with_block, true), MatchLowering::ExpressionWithClosures);
    }

    #[test]
    fn test_default_return_only_when_missing() {
        assert!(needs_default_return(&[Statement::expr(Expr::ident("x"))]));
        assert!(!needs_default_return(&[Statement::ret(Expr::ident("x"))]));
        assert!(needs_default_return(&[]));
    }

    #[test]
    fn test_returns_value_descends_into_branches() {
        let body = vec![Statement::If(IfStmt {
            condition: Expr::bool(true),
            then_branch: vec![Statement::ret(Expr::number("1"))],
            else_branch: None,
        })];
        assert!(returns_value(&body));
        assert!(!returns_value(&[Statement::Return(None)]));
    }

    #[test]
    fn test_assigns_to_this() {
        let assign = Statement::expr(Expr::Assignment {
            target: Box::new(Expr::member(Expr::This, "count")),
            op: TokenKind::PlusEqual,
            value: Box::new(Expr::number("1")),
        });
        assert!(assigns_to_this(&[assign]));
        let read = Statement::ret(Expr::member(Expr::This, "count"));
        assert!(!assigns_to_this(&[read]));
    }

    #[test]
    fn test_contains_continue_ignores_nested_loops() {
        let nested = Statement::While(WhileStmt {
            condition: Expr::bool(true),
            body: vec![Statement::Continue],
        });
        assert!(!contains_continue(&[nested]));
        assert!(contains_continue(&[Statement::Continue]));
    }

    #[test]
    fn test_constant_range_count() {
        let exclusive = Expr::range(Some(Expr::number("2")), Some(Expr::number("5")));
        let parts = range_parts(&exclusive).unwrap();
        assert_eq!(constant_range_count(&parts), Some(3));

        let open_start = Expr::range(None, Some(Expr::number("5")));
        assert_eq!(constant_range_count(&range_parts(&open_start).unwrap()), Some(5));

        let inclusive = Expr::Range {
            start: None,
            end: Some(Box::new(Expr::number("5"))),
            inclusive: true,
        };
        assert_eq!(constant_range_count(&range_parts(&inclusive).unwrap()), Some(6));

        let dynamic = Expr::range(None, Some(Expr::ident("n")));
        assert_eq!(constant_range_count(&range_parts(&dynamic).unwrap()), None);
        assert!(!has_literal_bounds(&range_parts(&dynamic).unwrap()));
    }

    #[test]
    fn test_constant_range_count_overflow() {
        let minus_one = Expr::Unary {
            op: TokenKind::Minus,
            operand: Box::new(Expr::number("1")),
            postfix: false,
        };
        let huge = Expr::range(Some(minus_one), Some(Expr::number("9223372036854775807")));
        let parts = range_parts(&huge).unwrap();
        assert_eq!(constant_range_count(&parts), None);
        assert!(has_literal_bounds(&parts));

        let inclusive_max = Expr::Range {
            start: Some(Box::new(Expr::number("0"))),
            end: Some(Box::new(Expr::number("9223372036854775807"))),
            inclusive: true,
        };
        assert_eq!(constant_range_count(&range_parts(&inclusive_max).unwrap()), None);

        // reversed ranges are empty, not negative
        let reversed = Expr::range(Some(Expr::number("5")), Some(Expr::number("2")));
        assert_eq!(constant_range_count(&range_parts(&reversed).unwrap()), Some(0));
    }

    #[test]
    fn test_classify_call() {
        assert!(matches!(classify_call(&Expr::ident("println")), CallShape::Builtin(BuiltinFnId::Print, _)));
        assert!(matches!(classify_call(&Expr::ident("area")), CallShape::Plain("area")));
        let method = Expr::member(Expr::ident("list"), "add");
        assert!(matches!(classify_call(&method), CallShape::Method { name: "add", .. }));
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("a\"b\\c\n"), "a\\\"b\\\\c\\n");
    }
}
