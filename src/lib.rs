#![forbid(unsafe_code)]
//! polyemit: a multi-target source-to-source compiler backend
//!
//! Takes a validated AST (see `polyemit_syntax`) and lowers it into C# or Rust source text, then optionally hands the
//! text to an external toolchain.
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` and `backend` modules
//!   enforce `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **Generated code**: The emitters write `unimplemented!()` and `unreachable!()` as *string literals* into
//!   generated Rust. These are output text, not calls in the backend.

pub mod backend;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod toolchain;

pub use polyemit_syntax::ast;

pub use backend::{Backend, BackendRegistry, GenResult, GenerateError, GeneratedUnit};
pub use config::{EmitConfig, OutputKind};
pub use diagnostics::{Diagnostic, DiagnosticBag, DiagnosticSink, Severity};
pub use toolchain::{
    CachedToolchain, CompileOutput, CompileRequest, RustcToolchain, SourceFile, Toolchain, ToolchainError,
};
