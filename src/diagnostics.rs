//! Soft diagnostics reported while generating code.
//!
//! Hard failures abort a `generate` call through [`crate::backend::GenerateError`]. Everything else (an unknown type
//! name, a skipped external declaration, a raw block for another target) is reported here and resolved by a fallback,
//! so one bad construct never aborts a whole unit.

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A non-fatal message about the generated unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Declaration the message is about (`function main`, `class Point`).
    pub context: Option<String>,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            context: None,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(context) = &self.context {
            write!(f, " (in {})", context)?;
        }
        Ok(())
    }
}

/// Receiver for diagnostics produced during generation.
///
/// Backends only ever call [`DiagnosticSink::report`] through the convenience methods, so a sink only has to
/// implement that one.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    fn report_info(&mut self, message: String) {
        self.report(Diagnostic::info(message));
    }

    fn report_warning(&mut self, message: String) {
        self.report(Diagnostic::warning(message));
    }

    fn report_error(&mut self, message: String) {
        self.report(Diagnostic::error(message));
    }
}

/// Collecting sink that also mirrors every diagnostic into `tracing`.
#[derive(Debug, Default)]
pub struct DiagnosticBag {
    items: Vec<Diagnostic>,
}

impl DiagnosticBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics with exactly `severity`.
    pub fn count(&self, severity: Severity) -> usize {
        self.items.iter().filter(|d| d.severity == severity).count()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl DiagnosticSink for DiagnosticBag {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Info => tracing::info!(context = ?diagnostic.context, "{}", diagnostic.message),
            Severity::Warning => tracing::warn!(context = ?diagnostic.context, "{}", diagnostic.message),
            Severity::Error => tracing::error!(context = ?diagnostic.context, "{}", diagnostic.message),
        }
        self.items.push(diagnostic);
    }
}

/// Print a diagnostic to stderr with notes and hints.
pub fn print_diagnostic(diagnostic: &Diagnostic) {
    let red = "\x1b[31m";
    let cyan = "\x1b[36m";
    let yellow = "\x1b[33m";
    let bold = "\x1b[1m";
    let reset = "\x1b[0m";

    let color = match diagnostic.severity {
        Severity::Error => red,
        Severity::Warning => yellow,
        Severity::Info => cyan,
    };

    eprintln!(
        "{bold}{color}{severity}{reset}{bold}: {message}{reset}",
        severity = diagnostic.severity,
        message = diagnostic.message,
    );
    if let Some(context) = &diagnostic.context {
        eprintln!("  {cyan}-->{reset} {}", context);
    }
    for note in &diagnostic.notes {
        eprintln!("  {cyan}= note:{reset} {}", note);
    }
    for hint in &diagnostic.hints {
        eprintln!("  {cyan}= hint:{reset} {}", hint);
    }
}
