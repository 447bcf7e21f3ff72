//! Toolchain handoff
//!
//! Generated text is handed to an external compiler through the [`Toolchain`] trait. [`CachedToolchain`] memoizes
//! successful compilations by a content hash of the request; [`RustcToolchain`] drives `rustc` directly.

use std::hash::{Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, PoisonError};

use rustc_hash::{FxHashMap, FxHasher};

use crate::config::OutputKind;

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceFile {
    /// File name relative to the build directory (`main.rs`).
    pub name: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Everything a toolchain needs to build one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompileRequest {
    /// The first source is the crate root / compilation root.
    pub sources: Vec<SourceFile>,
    pub entry_point: Option<String>,
    pub output_kind: OutputKind,
    pub search_paths: Vec<PathBuf>,
}

impl CompileRequest {
    pub fn new(sources: Vec<SourceFile>, output_kind: OutputKind) -> Self {
        Self {
            sources,
            entry_point: None,
            output_kind,
            search_paths: Vec::new(),
        }
    }

    pub fn with_entry_point(mut self, entry_point: impl Into<String>) -> Self {
        self.entry_point = Some(entry_point.into());
        self
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Content hash used as the cache key.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// A successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub artifact: Vec<u8>,
    /// Warnings the toolchain printed, one entry per non-empty line.
    pub diagnostics: Vec<String>,
}

/// Result of running a built executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("toolchain I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("`{0}` was not found on PATH")]
    NotFound(String),

    #[error("{toolchain} failed to compile the unit:\n{stderr}")]
    CompileFailed { toolchain: String, stderr: String },

    #[error("compile request has no sources")]
    NoSources,

    #[error("cannot execute the build: {0}")]
    Execution(String),
}

/// An external compiler the generated text is handed to.
pub trait Toolchain: Send + Sync {
    fn name(&self) -> &str;

    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, ToolchainError>;
}

/// Memoizes successful compilations of the wrapped toolchain.
///
/// Calls into the wrapped toolchain are serialized: the cache lock is held for the whole compilation.
#[derive(Debug)]
pub struct CachedToolchain<T> {
    inner: T,
    cache: Mutex<FxHashMap<u64, CompileOutput>>,
}

impl<T: Toolchain> CachedToolchain<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            cache: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Number of cached results.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Toolchain> Toolchain for CachedToolchain<T> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, ToolchainError> {
        let key = request.content_hash();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(&key) {
            tracing::debug!(toolchain = self.inner.name(), key, "toolchain cache hit");
            return Ok(hit.clone());
        }
        let output = self.inner.compile(request)?;
        cache.insert(key, output.clone());
        Ok(output)
    }
}

/// Compiles Rust units with `rustc`, no Cargo involved.
#[derive(Debug, Clone)]
pub struct RustcToolchain {
    program: PathBuf,
    edition: String,
}

impl Default for RustcToolchain {
    fn default() -> Self {
        Self {
            program: PathBuf::from("rustc"),
            edition: "2021".to_string(),
        }
    }
}

impl RustcToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_edition(mut self, edition: impl Into<String>) -> Self {
        self.edition = edition.into();
        self
    }

    /// Whether `rustc --version` runs.
    pub fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .is_ok_and(|output| output.status.success())
    }

    /// Build the request and run the executable, capturing its output.
    #[tracing::instrument(skip_all, fields(toolchain = "rustc", sources = request.sources.len()))]
    pub fn run(&self, request: &CompileRequest) -> Result<ExecutionOutput, ToolchainError> {
        if !request.output_kind.is_executable() {
            return Err(ToolchainError::Execution("a library has no entry point to run".to_string()));
        }
        let dir = tempfile::tempdir()?;
        let (binary, _) = self.build(request, dir.path())?;
        let output = Command::new(&binary).current_dir(dir.path()).output()?;
        Ok(ExecutionOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code(),
        })
    }

    /// Write the sources into `dir`, invoke `rustc` on the first one and return the artifact path and warnings.
    fn build(&self, request: &CompileRequest, dir: &Path) -> Result<(PathBuf, Vec<String>), ToolchainError> {
        let Some(root) = request.sources.first() else {
            return Err(ToolchainError::NoSources);
        };
        for source in &request.sources {
            std::fs::write(dir.join(&source.name), &source.text)?;
        }

        let artifact = dir.join(if request.output_kind.is_executable() { "unit" } else { "libunit.rlib" });
        let mut command = Command::new(&self.program);
        command
            .arg("--edition")
            .arg(&self.edition)
            .arg("--crate-type")
            .arg(if request.output_kind.is_executable() { "bin" } else { "lib" })
            .arg("--crate-name")
            .arg("unit")
            .arg("-o")
            .arg(&artifact);
        for path in &request.search_paths {
            command.arg("-L").arg(path);
        }
        command.arg(dir.join(&root.name));

        let output = command.output().map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => ToolchainError::NotFound(self.program.display().to_string()),
            _ => ToolchainError::Io(err),
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if !output.status.success() {
            return Err(ToolchainError::CompileFailed {
                toolchain: self.name().to_string(),
                stderr,
            });
        }
        let warnings = stderr
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect();
        Ok((artifact, warnings))
    }
}

impl Toolchain for RustcToolchain {
    fn name(&self) -> &str {
        "rustc"
    }

    #[tracing::instrument(skip_all, fields(toolchain = "rustc", sources = request.sources.len()))]
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput, ToolchainError> {
        let dir = tempfile::tempdir()?;
        let (artifact, diagnostics) = self.build(request, dir.path())?;
        Ok(CompileOutput {
            artifact: std::fs::read(artifact)?,
            diagnostics,
        })
    }
}
