//! Property-based tests for the polyemit backends
//!
//! These tests use proptest to verify invariants across many randomly
//! generated programs, catching edge cases that hand-written tests might miss.

use polyemit::ast::*;
use polyemit::backend::{Backend, CSharpBackend, RustBackend};
use polyemit::config::{EmitConfig, OutputKind};
use polyemit::diagnostics::{DiagnosticBag, Severity};
use polyemit_core::lang::types::{GENERIC_TYPES, PRIMITIVE_TYPES};
use proptest::prelude::*;

fn backends(config: EmitConfig) -> Vec<Box<dyn Backend>> {
    vec![
        Box::new(CSharpBackend::new().with_config(config.clone())),
        Box::new(RustBackend::new().with_config(config)),
    ]
}

fn generate(backend: &dyn Backend, program: &Program) -> (String, DiagnosticBag) {
    let mut diagnostics = DiagnosticBag::new();
    let unit = backend
        .generate(program, &mut diagnostics)
        .unwrap_or_else(|e| panic!("{}: {e}", backend.target()));
    (unit.source, diagnostics)
}

/// `helper(p: <ty>)` in a library unit.
fn helper_taking(ty: &str) -> Program {
    let helper = FunctionDecl {
        params: vec![Parameter::new("p", Some(TypeRef::named(ty)))],
        ..FunctionDecl::new("helper", Vec::new())
    };
    Program::new(vec![Statement::Function(helper)])
}

/// A unit using `ty` once, in the given position: `return` (helper result), `field` (class field) or `entry`
/// (declared result of `main`).
fn type_used_as(position: &str, ty: &str) -> (Program, OutputKind) {
    match position {
        "return" => {
            let helper = FunctionDecl {
                return_type: Some(TypeRef::named(ty)),
                ..FunctionDecl::new("helper", vec![Statement::ret(Expr::number("1"))])
            };
            (Program::new(vec![Statement::Function(helper)]), OutputKind::Library)
        }
        "field" => {
            let field = Statement::Field(FieldDecl {
                name: "value".to_string(),
                ty: Some(TypeRef::named(ty)),
                ..FieldDecl::default()
            });
            (
                Program::new(vec![Statement::Class(TypeDecl::new("Holder", vec![field]))]),
                OutputKind::Library,
            )
        }
        _ => {
            let main = FunctionDecl {
                return_type: Some(TypeRef::named(ty)),
                ..FunctionDecl::new("main", vec![Statement::ret(Expr::number("1"))])
            };
            (Program::new(vec![Statement::Function(main)]), OutputKind::Executable)
        }
    }
}

// =============================================================================
// Entry point synthesis
// =============================================================================

mod entry_tests {
    use super::*;

    proptest! {
        /// Property: N loose print statements give exactly one entry point containing N print calls
        #[test]
        fn loose_prints_form_one_entry(texts in prop::collection::vec("[a-z ]{0,12}", 1..8)) {
            let statements: Vec<Statement> = texts
                .iter()
                .map(|text| Statement::expr(Expr::call(Expr::ident("print"), vec![Expr::string(text)])))
                .collect();
            let program = Program::new(statements);

            let (cs, _) = generate(&CSharpBackend::new(), &program);
            prop_assert_eq!(cs.matches("static void Main()").count(), 1);
            prop_assert_eq!(cs.matches("Console.WriteLine(").count(), texts.len());

            let (rs, _) = generate(&RustBackend::new(), &program);
            prop_assert_eq!(rs.matches("fn main()").count(), 1);
            prop_assert_eq!(rs.matches("println!(").count(), texts.len());
        }

        /// Property: string literals survive escaping as valid Rust
        #[test]
        fn printed_strings_parse_as_rust(text in "\\PC{0,24}") {
            let program = Program::new(vec![Statement::expr(Expr::call(
                Expr::ident("print"),
                vec![Expr::string(&text)],
            ))]);
            let (rs, _) = generate(&RustBackend::new(), &program);
            prop_assert!(syn::parse_file(&rs).is_ok(), "{}", rs);
        }
    }
}

// =============================================================================
// Type mapping
// =============================================================================

mod type_tests {
    use super::*;

    fn vocabulary() -> Vec<&'static str> {
        let mut names = Vec::new();
        for info in PRIMITIVE_TYPES {
            names.push(info.canonical);
            names.extend(info.aliases.iter().copied());
        }
        for info in GENERIC_TYPES {
            names.push(info.canonical);
            names.extend(info.aliases.iter().copied());
        }
        names
    }

    proptest! {
        /// Property: an unknown type name maps to the catch-all with exactly one warning
        #[test]
        fn unknown_type_uses_catch_all(suffix in "[a-z]{0,6}") {
            let name = format!("Zz{}", suffix);
            let program = helper_taking(&name);
            let config = EmitConfig::new().with_output_kind(OutputKind::Library);

            let (cs, cs_diagnostics) = generate(&CSharpBackend::new().with_config(config.clone()), &program);
            prop_assert!(cs.contains("object p"), "{}", cs);
            prop_assert_eq!(cs_diagnostics.count(Severity::Warning), 1);

            let (rs, rs_diagnostics) = generate(&RustBackend::new().with_config(config), &program);
            prop_assert!(rs.contains("p: Box<dyn std::any::Any>"), "{}", rs);
            prop_assert_eq!(rs_diagnostics.count(Severity::Warning), 1);
        }

        /// Property: an unknown type warns once wherever it is written
        #[test]
        fn unknown_type_warns_once_in_any_position(
            suffix in "[a-z]{0,6}",
            position in prop::sample::select(vec!["return", "field", "entry"]),
        ) {
            let name = format!("Zz{}", suffix);
            let (program, kind) = type_used_as(position, &name);
            for backend in backends(EmitConfig::new().with_output_kind(kind)) {
                let (source, diagnostics) = generate(backend.as_ref(), &program);
                prop_assert_eq!(
                    diagnostics.count(Severity::Warning),
                    1,
                    "{} in {} position:\n{}",
                    backend.target(),
                    position,
                    source
                );
            }
        }

        /// Property: every vocabulary spelling maps without diagnostics
        #[test]
        fn vocabulary_names_map_silently(name in prop::sample::select(vocabulary())) {
            let program = helper_taking(name);
            for backend in backends(EmitConfig::new().with_output_kind(OutputKind::Library)) {
                let (source, diagnostics) = generate(backend.as_ref(), &program);
                prop_assert_eq!(diagnostics.count(Severity::Warning), 0, "{}: {}", name, source);
            }
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

mod layout_tests {
    use super::*;

    fn nested_ifs(depth: usize) -> Statement {
        let mut stmt = Statement::expr(Expr::call(Expr::ident("print"), vec![Expr::number("1")]));
        for level in 0..depth {
            stmt = Statement::If(IfStmt {
                condition: Expr::ident(&format!("c{}", level)),
                then_branch: vec![stmt],
                else_branch: None,
            });
        }
        stmt
    }

    proptest! {
        /// Property: every line is indented by a whole number of indentation units
        #[test]
        fn indentation_is_a_multiple_of_width(width in 1usize..8, depth in 0usize..5) {
            let program = Program::new(vec![Statement::Function(FunctionDecl::new("main", vec![nested_ifs(depth)]))]);
            for backend in backends(EmitConfig::new().with_indent_width(width)) {
                let (source, _) = generate(backend.as_ref(), &program);
                for line in source.lines() {
                    let leading = line.len() - line.trim_start_matches(' ').len();
                    prop_assert_eq!(leading % width, 0, "{:?} in\n{}", line, source);
                }
            }
        }

        /// Property: braces balance in every generated unit
        #[test]
        fn braces_balance(depth in 0usize..6) {
            let program = Program::new(vec![Statement::Function(FunctionDecl::new("main", vec![nested_ifs(depth)]))]);
            for backend in backends(EmitConfig::new()) {
                let (source, _) = generate(backend.as_ref(), &program);
                prop_assert_eq!(source.matches('{').count(), source.matches('}').count(), "{}", source);
            }
        }
    }
}
