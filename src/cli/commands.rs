//! Command implementations for the CLI

use std::fs;
use std::path::{Path, PathBuf};

use polyemit_syntax::ast::Program;

use super::{CliError, CliResult, ExitCode};
use crate::backend::{BackendRegistry, GenerateError};
use crate::config::{EmitConfig, OutputKind};
use crate::diagnostics::{DiagnosticBag, print_diagnostic};

/// Flags of the `emit` subcommand.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    pub target: String,
    pub output_kind: OutputKind,
    pub format: bool,
    pub shims: bool,
    pub output: Option<PathBuf>,
}

/// Read a JSON-serialized AST.
pub fn read_program(path: &Path) -> CliResult<Program> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::failure(format!("Error reading {}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| CliError::failure(format!("Error parsing {}: {}", path.display(), e)))
}

/// Generate one unit from every input and write it to `options.output` or stdout.
pub fn emit(inputs: &[PathBuf], options: &EmitOptions) -> CliResult<ExitCode> {
    let programs = inputs.iter().map(|path| read_program(path)).collect::<CliResult<Vec<_>>>()?;

    let config = EmitConfig::new()
        .with_output_kind(options.output_kind)
        .with_format_output(options.format)
        .with_shims(options.shims);
    let registry = BackendRegistry::with_defaults();
    let backend = registry.create(&options.target, config).map_err(render_error)?;

    let mut diagnostics = DiagnosticBag::new();
    let result = match programs.as_slice() {
        [program] => backend.generate(program, &mut diagnostics),
        programs => backend.generate_combined(programs, &mut diagnostics),
    };
    for diagnostic in diagnostics.iter() {
        print_diagnostic(diagnostic);
    }
    let unit = result.map_err(render_error)?;
    tracing::debug!(
        backend = backend.target(),
        entry_point = ?unit.entry_point,
        imports = unit.imports.len(),
        "generated unit"
    );

    match &options.output {
        Some(path) => fs::write(path, &unit.source)
            .map_err(|e| CliError::failure(format!("Error writing {}: {}", path.display(), e)))?,
        None => print!("{}", unit.source),
    }
    Ok(if diagnostics.has_errors() { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

/// Print every registered target with its aliases.
pub fn list_targets() -> CliResult<ExitCode> {
    for (target, aliases) in BackendRegistry::with_defaults().targets() {
        if aliases.is_empty() {
            println!("{}", target);
        } else {
            println!("{} ({})", target, aliases.join(", "));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Render a generation failure through miette so its code and help text are shown.
fn render_error(err: GenerateError) -> CliError {
    CliError::failure(format!("{:?}", miette::Report::new(err)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn options(target: &str, output: PathBuf) -> EmitOptions {
        EmitOptions {
            target: target.to_string(),
            output_kind: OutputKind::Executable,
            format: false,
            shims: false,
            output: Some(output),
        }
    }

    const HELLO: &str = r#"{ "statements": [
        { "Function": { "name": "main", "body": [
            { "Expression": { "Call": { "callee": { "Identifier": "print" },
                                        "args": [ { "Literal": { "String": "hi" } } ] } } }
        ] } }
    ] }"#;

    #[test]
    fn test_emit_writes_the_unit() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.json");
        fs::write(&input, HELLO).unwrap();
        let output = dir.path().join("hello.rs");

        let code = emit(&[input], &options("rs", output.clone())).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        let source = fs::read_to_string(output).unwrap();
        assert!(source.contains("fn main()"));
        assert!(source.contains("println!(\"{}\", \"hi\")"));
    }

    #[test]
    fn test_unknown_target_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("hello.json");
        fs::write(&input, HELLO).unwrap();
        let err = emit(&[input], &options("cobol", dir.path().join("out"))).unwrap_err();
        assert!(err.message.contains("cobol"));
    }

    #[test]
    fn test_malformed_json_fails() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("broken.json");
        fs::write(&input, "{ not json").unwrap();
        let err = read_program(&input).unwrap_err();
        assert!(err.message.starts_with("Error parsing"));
    }
}
