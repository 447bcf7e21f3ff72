//! Match and switch lowering across both targets.
//!
//! Statement matches become native multi-way branches; expression matches become C# switch expressions and Rust
//! `match` expressions, with block arms wrapped in immediately-invoked closures.

use polyemit::ast::*;
use polyemit::backend::{Backend, CSharpBackend, RustBackend};
use polyemit::config::EmitConfig;
use polyemit::diagnostics::DiagnosticBag;

fn main_with(body: Vec<Statement>) -> Program {
    Program::new(vec![Statement::Function(FunctionDecl::new("main", body))])
}

fn csharp(program: &Program) -> String {
    let mut diagnostics = DiagnosticBag::new();
    CSharpBackend::new()
        .generate(program, &mut diagnostics)
        .unwrap_or_else(|e| panic!("{e}"))
        .source
}

fn rust(program: &Program) -> String {
    let mut diagnostics = DiagnosticBag::new();
    RustBackend::new()
        .with_config(EmitConfig::new().with_allow_lints(false))
        .generate(program, &mut diagnostics)
        .unwrap_or_else(|e| panic!("{e}"))
        .source
}

fn print(arg: Expr) -> Statement {
    Statement::expr(Expr::call(Expr::ident("print"), vec![arg]))
}

fn arm(values: Vec<Expr>, result: ArmResult) -> MatchArm {
    MatchArm {
        pattern: ArmPattern::Values(values),
        result,
    }
}

fn default_arm(result: ArmResult) -> MatchArm {
    MatchArm {
        pattern: ArmPattern::Default,
        result,
    }
}

/// `let label = match x { 1 => "one", _ => { <fallback> } }`
fn labelled(fallback: Vec<Statement>) -> Program {
    let node = MatchNode {
        scrutinee: Expr::ident("x"),
        arms: vec![
            arm(vec![Expr::number("1")], ArmResult::Expression(Expr::string("one"))),
            default_arm(ArmResult::Block(fallback)),
        ],
    };
    main_with(vec![
        Statement::let_("x", Expr::number("2")),
        Statement::let_("label", Expr::Match(Box::new(node))),
    ])
}

// ============================================================================
// Expression position
// ============================================================================

#[test]
fn test_csharp_block_arm_gets_default_return() {
    let source = csharp(&labelled(vec![print(Expr::string("other"))]));
    assert!(source.contains("var label = x switch"), "{source}");
    assert!(source.contains("1 => \"one\","), "{source}");
    assert!(source.contains("_ => ((Func<dynamic>)(() =>"), "{source}");
    assert_eq!(source.matches("return null;").count(), 1, "{source}");
    assert!(source.starts_with("using System;\n"), "{source}");
}

#[test]
fn test_csharp_block_arm_ending_in_return_is_not_padded() {
    let fallback = vec![print(Expr::string("other")), Statement::ret(Expr::string("many"))];
    let source = csharp(&labelled(fallback));
    assert!(source.contains("return \"many\";"), "{source}");
    assert!(!source.contains("return null;"), "{source}");
}

#[test]
fn test_rust_block_arm_becomes_invoked_closure() {
    let source = rust(&labelled(vec![print(Expr::string("other"))]));
    assert!(source.contains("let label = match x {"), "{source}");
    assert!(source.contains("1 => \"one\".to_string(),"), "{source}");
    assert!(source.contains("_ => (|| {"), "{source}");
    assert!(source.contains("return Default::default();"), "{source}");
    assert!(source.contains("})(),"), "{source}");
    // the wildcard arm is present, so no synthesized one
    assert!(!source.contains("unreachable!()"), "{source}");
}

#[test]
fn test_rust_expression_match_without_wildcard_is_exhaustive() {
    let node = MatchNode {
        scrutinee: Expr::ident("x"),
        arms: vec![
            arm(vec![Expr::number("1")], ArmResult::Expression(Expr::number("10"))),
            arm(vec![Expr::number("2"), Expr::number("3")], ArmResult::Expression(Expr::number("20"))),
        ],
    };
    let program = main_with(vec![
        Statement::let_("x", Expr::number("1")),
        Statement::let_("y", Expr::Match(Box::new(node))),
    ]);
    let source = rust(&program);
    assert!(source.contains("2 | 3 => 20,"), "{source}");
    assert!(source.contains("_ => unreachable!(),"), "{source}");

    let cs_source = csharp(&program);
    assert!(cs_source.contains("2 or 3 => 20,"), "{cs_source}");
}

// ============================================================================
// Statement position
// ============================================================================

fn greeting_match(with_default: bool) -> Program {
    let mut arms = vec![
        arm(vec![Expr::string("hi")], ArmResult::Expression(Expr::call(Expr::ident("print"), vec![Expr::number("1")]))),
        arm(
            vec![Expr::string("bye")],
            ArmResult::Block(vec![print(Expr::number("2")), print(Expr::number("3"))]),
        ),
    ];
    if with_default {
        arms.push(default_arm(ArmResult::Block(vec![print(Expr::number("0"))])));
    }
    let word = Statement::Variable(VariableDecl {
        name: "word".to_string(),
        ty: Some(TypeRef::named("string")),
        value: Some(Expr::string("hi")),
        kind: BindingKind::Let,
    });
    main_with(vec![
        word,
        Statement::Match(MatchNode {
            scrutinee: Expr::ident("word"),
            arms,
        }),
    ])
}

#[test]
fn test_rust_string_patterns_match_on_str() {
    let source = rust(&greeting_match(false));
    assert!(source.contains("match &*word {"), "{source}");
    assert!(source.contains("\"hi\" => {\n"), "{source}");
    assert!(source.contains("\"bye\" => {\n"), "{source}");
    assert!(source.contains("_ => {}"), "{source}");
}

#[test]
fn test_rust_statement_match_keeps_user_wildcard() {
    let source = rust(&greeting_match(true));
    assert!(!source.contains("_ => {}"), "{source}");
    assert!(source.contains("_ => {\n"), "{source}");
}

#[test]
fn test_csharp_statement_match_becomes_switch() {
    let source = csharp(&greeting_match(true));
    assert!(source.contains("switch (word)"), "{source}");
    assert!(source.contains("case \"hi\":"), "{source}");
    assert!(source.contains("case \"bye\":"), "{source}");
    assert!(source.contains("default:"), "{source}");
    assert_eq!(source.matches("break;").count(), 3, "{source}");
}

#[test]
fn test_csharp_switch_cases() {
    let switch = Statement::Switch(SwitchStmt {
        subject: Expr::ident("n"),
        cases: vec![
            SwitchCase {
                pattern: ArmPattern::Values(vec![Expr::number("1"), Expr::number("2")]),
                body: vec![print(Expr::string("small"))],
            },
            SwitchCase {
                pattern: ArmPattern::Values(vec![Expr::number("3")]),
                body: vec![Statement::ret(Expr::number("3"))],
            },
            SwitchCase {
                pattern: ArmPattern::Default,
                body: vec![Statement::let_("big", Expr::bool(true)), print(Expr::ident("big"))],
            },
        ],
    });
    let program = main_with(vec![Statement::let_("n", Expr::number("1")), switch, Statement::ret(Expr::number("0"))]);
    let source = csharp(&program);
    assert!(source.contains("case 1:\n"), "{source}");
    assert!(source.contains("case 2:\n"), "{source}");
    // the case ending in `return` needs no `break;`; the default case is scoped for its local
    assert_eq!(source.matches("break;").count(), 2, "{source}");
    assert!(source.contains("default:\n"), "{source}");
    assert!(source.contains("var big = true;"), "{source}");

    let rust_source = rust(&program);
    assert!(rust_source.contains("match n {"), "{rust_source}");
    assert!(rust_source.contains("1 | 2 => {"), "{rust_source}");
    assert!(!rust_source.contains("_ => {}"), "{rust_source}");
}

#[test]
fn test_switch_without_default_gets_rust_wildcard() {
    let switch = Statement::Switch(SwitchStmt {
        subject: Expr::ident("n"),
        cases: vec![SwitchCase {
            pattern: ArmPattern::Values(vec![Expr::number("1")]),
            body: vec![print(Expr::number("1"))],
        }],
    });
    let program = main_with(vec![Statement::let_("n", Expr::number("1")), switch]);
    let source = rust(&program);
    assert!(source.contains("_ => {}"), "{source}");
    assert!(!csharp(&program).contains("default:"));
}

/// `while true { switch n { 3 => { break } _ => { while true { break } } } }`
fn switch_in_loop() -> Program {
    let inner = Statement::While(WhileStmt {
        condition: Expr::bool(true),
        body: vec![Statement::Break],
    });
    let switch = Statement::Switch(SwitchStmt {
        subject: Expr::ident("n"),
        cases: vec![
            SwitchCase {
                pattern: ArmPattern::Values(vec![Expr::number("3")]),
                body: vec![Statement::Break],
            },
            SwitchCase {
                pattern: ArmPattern::Default,
                body: vec![inner],
            },
        ],
    });
    let outer = Statement::While(WhileStmt {
        condition: Expr::bool(true),
        body: vec![switch],
    });
    main_with(vec![Statement::let_("n", Expr::number("3")), outer, print(Expr::string("done"))])
}

#[test]
fn test_break_in_switch_leaves_the_loop() {
    let program = switch_in_loop();
    let source = csharp(&program);
    assert_eq!(source.matches("goto loop_exit_0;").count(), 1, "{source}");
    assert!(source.contains("loop_exit_0: ;\n"), "{source}");
    // the inner loop is the break target of its own body
    assert!(!source.contains("loop_exit_1"), "{source}");
    let label = source.find("loop_exit_0: ;").unwrap_or_else(|| panic!("{source}"));
    let done = source.find("\"done\"").unwrap_or_else(|| panic!("{source}"));
    assert!(label < done, "{source}");

    let rust_source = rust(&program);
    assert!(rust_source.contains("3 => {\n"), "{rust_source}");
    assert!(!rust_source.contains("goto"), "{rust_source}");
    assert_eq!(rust_source.matches("break;").count(), 2, "{rust_source}");
}

#[test]
fn test_break_in_switch_outside_loop_stays_native() {
    let switch = Statement::Switch(SwitchStmt {
        subject: Expr::ident("n"),
        cases: vec![SwitchCase {
            pattern: ArmPattern::Values(vec![Expr::number("1")]),
            body: vec![print(Expr::number("1")), Statement::Break],
        }],
    });
    let source = csharp(&main_with(vec![Statement::let_("n", Expr::number("1")), switch]));
    assert_eq!(source.matches("break;").count(), 1, "{source}");
    assert!(!source.contains("goto"), "{source}");
}
