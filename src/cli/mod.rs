//! CLI module for the polyemit driver
//!
//! ## Commands
//!
//! - `emit <AST.json>...` - Generate target source from one or more JSON-serialized ASTs
//! - `targets` - List registered backends and their aliases
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::OutputKind;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Multi-target source-to-source compiler backend
#[derive(Parser, Debug)]
#[command(name = "polyemit")]
#[command(version = VERSION)]
#[command(about = "Lower a JSON-serialized AST into C# or Rust source", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate target source; several inputs are merged into one unit
    Emit {
        /// Target id or alias (`csharp`, `cs`, `rust`, `rs`)
        #[arg(short, long, default_value = "csharp")]
        target: String,
        /// Whether the unit needs an entry point
        #[arg(long, value_enum, default_value_t = KindArg::Exe)]
        kind: KindArg,
        /// Pretty-print generated Rust with prettyplease
        #[arg(long)]
        format: bool,
        /// Emit helper definitions for builtins instead of renaming calls
        #[arg(long)]
        shims: bool,
        /// Write the unit here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// JSON-serialized AST files
        #[arg(value_name = "AST.json", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// List registered targets
    Targets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Exe,
    Lib,
}

impl From<KindArg> for OutputKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Exe => OutputKind::Executable,
            KindArg::Lib => OutputKind::Library,
        }
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Emit {
            target,
            kind,
            format,
            shims,
            output,
            inputs,
        } => {
            let options = commands::EmitOptions {
                target,
                output_kind: kind.into(),
                format,
                shims,
                output,
            };
            commands::emit(&inputs, &options)
        }
        Command::Targets => commands::list_targets(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_emit_arguments() {
        let cli = Cli::try_parse_from(["polyemit", "emit", "-t", "rs", "--kind", "lib", "a.json", "b.json"])
            .unwrap_or_else(|e| panic!("{e}"));
        let Command::Emit {
            target, kind, inputs, ..
        } = cli.command
        else {
            panic!("expected emit");
        };
        assert_eq!(target, "rs");
        assert_eq!(OutputKind::from(kind), OutputKind::Library);
        assert_eq!(inputs.len(), 2);
    }

    #[test]
    fn test_emit_requires_an_input() {
        assert!(Cli::try_parse_from(["polyemit", "emit"]).is_err());
    }
}
