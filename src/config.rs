//! Generation configuration shared by every backend.

/// What the generated unit is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputKind {
    /// A program with an entry point; a missing entry point is a hard error.
    #[default]
    Executable,
    Library,
}

impl OutputKind {
    pub fn is_executable(self) -> bool {
        matches!(self, OutputKind::Executable)
    }
}

/// Backend configuration
#[derive(Debug, Clone)]
pub struct EmitConfig {
    pub output_kind: OutputKind,
    /// Source name of the entry function.
    pub entry_name: String,
    /// Namespace synthesized around loose code (C#).
    pub implicit_namespace: String,
    /// Class synthesized around loose code (C#).
    pub implicit_class: String,
    /// Emit helper definitions for builtins instead of renaming calls to them.
    pub emit_shims: bool,
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Re-parse generated Rust with `syn` and print it with `prettyplease`.
    pub format_output: bool,
    /// Start generated Rust with an `#![allow(..)]` for lints the generator routinely trips.
    pub allow_lints: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            output_kind: OutputKind::Executable,
            entry_name: "main".to_string(),
            implicit_namespace: "Program".to_string(),
            implicit_class: "Program".to_string(),
            emit_shims: false,
            indent_width: 4,
            format_output: false,
            allow_lints: true,
        }
    }
}

impl EmitConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_kind(mut self, kind: OutputKind) -> Self {
        self.output_kind = kind;
        self
    }

    pub fn with_entry_name(mut self, name: impl Into<String>) -> Self {
        self.entry_name = name.into();
        self
    }

    /// Set the names of the synthesized namespace and class
    pub fn with_implicit_container(mut self, namespace: impl Into<String>, class: impl Into<String>) -> Self {
        self.implicit_namespace = namespace.into();
        self.implicit_class = class.into();
        self
    }

    pub fn with_shims(mut self, enabled: bool) -> Self {
        self.emit_shims = enabled;
        self
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    pub fn with_format_output(mut self, enabled: bool) -> Self {
        self.format_output = enabled;
        self
    }

    pub fn with_allow_lints(mut self, enabled: bool) -> Self {
        self.allow_lints = enabled;
        self
    }
}
