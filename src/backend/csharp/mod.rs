//! C# backend
//!
//! Emits a single C# compilation unit. Loose code (top-level functions, fields, statements) is wrapped in an implicit
//! `namespace` + `public class` whose names come from [`EmitConfig`]; the entry function becomes `static Main`.
//!
//! ## Module Organization
//!
//! - `types.rs` - Type and operator mapping, namespace registration
//! - `expressions.rs` - Expression emission
//! - `statements.rs` - Statement emission, switch lowering
//! - `declarations.rs` - Types, members, modifiers and attributes
//! - `program.rs` - Implicit container, entry point and `using` header

mod declarations;
mod expressions;
mod program;
mod statements;
pub mod types;

use std::collections::BTreeSet;
use std::sync::Arc;

use polyemit_syntax::ast::Program;

use super::emitter::{BraceStyle, SourceEmitter};
use super::types::{KnownTypes, TableTypeResolver, TypeResolver};
use super::{Backend, GenResult, GeneratedUnit};
use crate::config::EmitConfig;
use crate::diagnostics::DiagnosticSink;

pub const TARGET: &str = "csharp";
pub const ALIASES: &[&str] = &["cs", "c#"];

/// The C# backend.
pub struct CSharpBackend {
    config: EmitConfig,
    resolver: Arc<dyn TypeResolver>,
}

impl CSharpBackend {
    /// Backend with default config and the bundled .NET type table.
    pub fn new() -> Self {
        Self {
            config: EmitConfig::default(),
            resolver: Arc::new(TableTypeResolver::dotnet()),
        }
    }

    pub fn with_config(mut self, config: EmitConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the type resolution service consulted before the catch-all.
    pub fn with_resolver(mut self, resolver: Arc<dyn TypeResolver>) -> Self {
        self.resolver = resolver;
        self
    }
}

impl Default for CSharpBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CSharpBackend {
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
        CSharpGenerator::new(&self.config, self.resolver.as_ref(), sink).compose(program)
    }
}

/// Per-call emission state for one C# unit.
pub(crate) struct CSharpGenerator<'a> {
    out: SourceEmitter,
    config: &'a EmitConfig,
    resolver: &'a dyn TypeResolver,
    diagnostics: &'a mut dyn DiagnosticSink,
    /// Namespaces the emitted code needs a `using` for.
    imports: BTreeSet<String>,
    known: KnownTypes,
    /// Extra indentation of the expression fragment being rendered (switch arms, closures).
    nesting: usize,
    /// Loops enclosing the statement being emitted, innermost last.
    loops: Vec<LoopFrame>,
    /// Counter for loop exit labels.
    loop_exits: usize,
}

/// A loop being emitted. `break` leaves the innermost loop, so inside a `switch` it becomes a `goto` to a label
/// placed after the loop.
#[derive(Debug)]
struct LoopFrame {
    label: String,
    /// `switch` statements open between the loop and the current statement.
    switch_depth: usize,
    exit_used: bool,
}

impl<'a> CSharpGenerator<'a> {
    fn new(config: &'a EmitConfig, resolver: &'a dyn TypeResolver, diagnostics: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            out: SourceEmitter::new(config.indent_width, BraceStyle::NextLine),
            config,
            resolver,
            diagnostics,
            imports: BTreeSet::new(),
            known: KnownTypes::default(),
            nesting: 0,
            loops: Vec::new(),
            loop_exits: 0,
        }
    }

    fn require_namespace(&mut self, namespace: &str) {
        self.imports.insert(namespace.to_string());
    }

    /// Whether a raw block pinned to `target` belongs to this backend.
    fn is_own_target(target: &str) -> bool {
        TARGET.eq_ignore_ascii_case(target) || ALIASES.iter().any(|alias| alias.eq_ignore_ascii_case(target))
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
        // a closure body cannot jump out of the loop around it
        let saved_loops = std::mem::take(&mut self.loops);
        let result = f(self);
        self.loops = saved_loops;
        self.nesting = saved_nesting;
        for _ in 0..extra {
            self.out.dedent();
        }
        let captured = self.out.end_capture(saved);
        result.map(|()| captured)
    }

    /// Indentation of the closing line of the fragment being rendered.
    fn fragment_indent(&self) -> String {
        self.out.indent_at(self.nesting)
    }
}
