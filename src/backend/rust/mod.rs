//! Rust backend
//!
//! Emits a single Rust source file. Classes and structs become a `struct` plus an inherent `impl`, interfaces become
//! traits, namespaces and modules become `pub mod`, and the entry function becomes `fn main`.
//!
//! ## Module Organization
//!
//! - `types.rs` - Type and operator mapping
//! - `expressions.rs` - Expression emission, string ownership and `++`/`--` lowering
//! - `statements.rs` - Statement emission, `match` and C-style `for` lowering
//! - `declarations.rs` - Structs, impls, traits, enums, modules, attributes and visibility
//! - `program.rs` - Lint header, `use` lines, entry point and optional `prettyplease` formatting

mod declarations;
mod expressions;
mod program;
mod statements;
pub mod types;

use std::collections::BTreeSet;

use polyemit_syntax::ast::Program;
use rustc_hash::FxHashMap;

use super::emitter::{BraceStyle, SourceEmitter};
use super::types::KnownTypes;
use super::{Backend, GenResult, GeneratedUnit};
use crate::config::EmitConfig;
use crate::diagnostics::DiagnosticSink;

pub const TARGET: &str = "rust";
pub const ALIASES: &[&str] = &["rs"];

/// The Rust backend.
#[derive(Debug, Default)]
pub struct RustBackend {
    config: EmitConfig,
}

impl RustBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: EmitConfig) -> Self {
        self.config = config;
        self
    }
}

impl Backend for RustBackend {
    fn target(&self) -> &'static str {
        TARGET
    }

    fn aliases(&self) -> &'static [&'static str] {
        ALIASES
    }

    fn initialize(&mut self, config: EmitConfig) {
        self.config = config;
    }

    fn config(&self) -> &EmitConfig {
        &self.config
    }

    #[tracing::instrument(skip_all, fields(backend = TARGET, statement_count = program.statements.len()))]
    fn generate(&self, program: &Program, sink: &mut dyn DiagnosticSink) -> GenResult<GeneratedUnit> {
        RustGenerator::new(&self.config, sink).compose(program)
    }
}

/// Per-call emission state for one Rust unit.
pub(crate) struct RustGenerator<'a> {
    out: SourceEmitter,
    config: &'a EmitConfig,
    diagnostics: &'a mut dyn DiagnosticSink,
    /// Paths the emitted code needs a `use` for.
    imports: BTreeSet<String>,
    known: KnownTypes,
    /// What every interface declared in the unit requires of its implementers.
    traits: FxHashMap<String, declarations::TraitShape>,
    /// Extra indentation of the expression fragment being rendered (match arms, closures).
    nesting: usize,
    /// Counter for labels of lowered C-style loop bodies.
    loop_labels: usize,
}

impl<'a> RustGenerator<'a> {
    fn new(config: &'a EmitConfig, diagnostics: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            out: SourceEmitter::new(config.indent_width, BraceStyle::SameLine),
            config,
            diagnostics,
            imports: BTreeSet::new(),
            known: KnownTypes::default(),
            traits: FxHashMap::default(),
            nesting: 0,
            loop_labels: 0,
        }
    }

    fn require_import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    fn is_own_target(target: &str) -> bool {
        TARGET.eq_ignore_ascii_case(target) || ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(target))
    }

    fn next_loop_label(&mut self) -> String {
        let label = format!("'body_{}", self.loop_labels);
        self.loop_labels += 1;
        label
    }

    /// Render statements into a string, one level deeper than the current fragment.
    fn capture<F>(&mut self, f: F) -> GenResult<String>
    where
        F: FnOnce(&mut Self) -> GenResult<()>,
    {
        let extra = self.nesting + 1;
        let saved = self.out.begin_capture();
        for _ in 0..extra {
            self.out.indent();
        }
        let saved_nesting = std::mem::replace(&mut self.nesting, 0);
        let result = f(self);
        self.nesting = saved_nesting;
        for _ in 0..extra {
            self.out.dedent();
        }
        let captured = self.out.end_capture(saved);
        result.map(|()| captured)
    }

    fn fragment_indent(&self) -> String {
        self.out.indent_at(self.nesting)
    }
}
