//! polyemit backend
//!
//! Lowers a validated AST into source text for one target language.
//!
//! The pipeline per `generate` call is:
//! 1. Composer: flatten includes, partition top-level statements, pick the container layout
//! 2. Declaration emitter → statement emitter → expression emitter → mapping tables
//! 3. Header (import and alias directives) is written last, once the body has registered what it needs
//!
//! ## Module Organization
//!
//! - `emitter.rs` - Low-level indent-tracking text buffer
//! - `types.rs` - Type normalization, classification and the type resolver service
//! - `lowering.rs` - Match/switch, loop and call lowering policy shared by every target
//! - `composer.rs` - Include flattening, partitioning and multi-unit merging
//! - `registry.rs` - Target id → backend factory
//! - `csharp/`, `rust/` - One backend per target, split into `types`, `expressions`, `statements`, `declarations`
//!   and `program`

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod composer;
pub mod csharp;
pub mod emitter;
pub mod lowering;
pub mod registry;
pub mod rust;
pub mod types;

use std::collections::BTreeSet;

use polyemit_syntax::ast::{GenericParam, Program};

use crate::config::EmitConfig;
use crate::diagnostics::DiagnosticSink;

pub use csharp::CSharpBackend;
pub use registry::BackendRegistry;
pub use rust::RustBackend;
pub use types::{NoopTypeResolver, TableTypeResolver, TypeResolver};

/// Output of one `generate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUnit {
    pub source: String,
    /// Import-directive names the unit uses (`System.Linq`, `std::collections::HashMap`).
    pub imports: BTreeSet<String>,
    /// Qualified name of the entry point, if the unit has one.
    pub entry_point: Option<String>,
}

impl GeneratedUnit {
    pub fn has_import(&self, name: &str) -> bool {
        self.imports.contains(name)
    }
}

/// Failures that abort a `generate` call.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum GenerateError {
    #[error("unknown target `{0}`")]
    #[diagnostic(
        code(polyemit::unknown_target),
        help("run `polyemit targets` to list the registered backends")
    )]
    UnknownTarget(String),

    #[error("no entry point found for {target} executable")]
    #[diagnostic(
        code(polyemit::missing_entry_point),
        help("declare a top-level `{entry}` function, add top-level statements, or generate a library")
    )]
    MissingEntryPoint { target: String, entry: String },

    #[error("type `{inner}` is declared inside type `{outer}`")]
    #[diagnostic(
        code(polyemit::nested_type),
        help("move `{inner}` to the enclosing namespace or module")
    )]
    NestedType { outer: String, inner: String },

    #[error("{kind} `{name}` cannot be declared at the top level of a {target} unit")]
    #[diagnostic(code(polyemit::misplaced_member), help("move `{name}` into a class, struct or module"))]
    MisplacedMember { target: String, kind: String, name: String },
}

pub type GenResult<T> = Result<T, GenerateError>;

/// A code generation backend for one target language.
///
/// Backends are shared across threads; every `generate` call builds its own emitter state.
pub trait Backend: Send + Sync {
    /// Canonical target id (`csharp`, `rust`).
    fn target(&self) -> &'static str;

    /// Additional ids the registry accepts for this target.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn initialize(&mut self, config: EmitConfig);

    fn config(&self) -> &EmitConfig;

    /// Whether `id` names this backend (case-insensitive).
    fn answers_to(&self, id: &str) -> bool {
        self.target().eq_ignore_ascii_case(id) || self.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(id))
    }

    /// False when the program pins a raw block to a different target.
    fn can_generate(&self, program: &Program) -> bool {
        lowering::raw_block_targets(&program.statements)
            .into_iter()
            .all(|target| self.answers_to(target))
    }

    fn generate(&self, program: &Program, sink: &mut dyn DiagnosticSink) -> GenResult<GeneratedUnit>;

    /// Merge several units and generate them as one.
    fn generate_combined(&self, programs: &[Program], sink: &mut dyn DiagnosticSink) -> GenResult<GeneratedUnit> {
        let merged = composer::merge_programs(programs, sink);
        self.generate(&merged, sink)
    }
}

/// Declaration context passed by value down the emitter recursion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope<'s> {
    /// Enclosing type, when emitting its members.
    pub class_name: Option<&'s str>,
    pub class_generics: &'s [GenericParam],
    pub fn_generics: &'s [GenericParam],
    pub in_constructor: bool,
    pub in_static: bool,
    /// Label of the enclosing lowered C-style loop body; `continue` becomes a break out of it.
    pub continue_label: Option<&'s str>,
    /// Inside an interface: members get no default access modifier.
    pub in_interface: bool,
}

impl<'s> Scope<'s> {
    pub fn top_level() -> Self {
        Self::default()
    }

    pub fn in_type(name: &'s str, generics: &'s [GenericParam]) -> Self {
        Self {
            class_name: Some(name),
            class_generics: generics,
            ..Self::default()
        }
    }

    pub fn with_fn_generics(self, generics: &'s [GenericParam]) -> Self {
        Self {
            fn_generics: generics,
            ..self
        }
    }

    pub fn constructor(self) -> Self {
        Self {
            in_constructor: true,
            ..self
        }
    }

    pub fn static_context(self, is_static: bool) -> Self {
        Self {
            in_static: is_static,
            ..self
        }
    }

    pub fn interface(self) -> Self {
        Self {
            in_interface: true,
            ..self
        }
    }

    /// Scope for a loop body whose `continue` must break out of `label`.
    pub fn with_continue_label<'b>(self, label: Option<&'b str>) -> Scope<'b>
    where
        's: 'b,
    {
        Scope {
            continue_label: label,
            ..self
        }
    }

    /// Scope for a closure body: loop labels do not cross closure boundaries.
    pub fn closure(self) -> Self {
        Self {
            continue_label: None,
            ..self
        }
    }

    /// Generic parameter lists in scope, outermost first.
    pub fn generics(&self) -> [&'s [GenericParam]; 2] {
        [self.class_generics, self.fn_generics]
    }
}
