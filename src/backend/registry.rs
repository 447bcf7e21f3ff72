//! Backend registry: target id → backend factory.
//!
//! Ids and aliases are matched case-insensitively. Adding a target only needs a [`Backend`] implementation and one
//! `register` call.

use super::{Backend, CSharpBackend, GenerateError, RustBackend};
use crate::config::EmitConfig;

/// Creates a fresh, uninitialized backend.
pub type BackendFactory = fn() -> Box<dyn Backend>;

struct RegistryEntry {
    id: &'static str,
    aliases: &'static [&'static str],
    factory: BackendFactory,
}

impl RegistryEntry {
    fn matches(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id) || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(id))
    }
}

/// Maps target ids to backend factories.
#[derive(Default)]
pub struct BackendRegistry {
    entries: Vec<RegistryEntry>,
}

impl BackendRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every shipped backend.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("csharp", &["cs", "c#"], || Box::new(CSharpBackend::new()));
        registry.register("rust", &["rs"], || Box::new(RustBackend::new()));
        registry
    }

    /// Register a backend; a later registration for the same id shadows the earlier one.
    pub fn register(&mut self, id: &'static str, aliases: &'static [&'static str], factory: BackendFactory) {
        self.entries.insert(0, RegistryEntry { id, aliases, factory });
    }

    /// Canonical id for `id` or one of its aliases.
    pub fn resolve(&self, id: &str) -> Option<&'static str> {
        self.entries.iter().find(|entry| entry.matches(id)).map(|entry| entry.id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resolve(id).is_some()
    }

    /// Create and initialize the backend for `id`.
    pub fn create(&self, id: &str, config: EmitConfig) -> Result<Box<dyn Backend>, GenerateError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.matches(id))
            .ok_or_else(|| GenerateError::UnknownTarget(id.to_string()))?;
        let mut backend = (entry.factory)();
        backend.initialize(config);
        tracing::debug!(target_id = entry.id, "created backend");
        Ok(backend)
    }

    /// Registered targets as `(id, aliases)`, sorted by id.
    pub fn targets(&self) -> Vec<(&'static str, &'static [&'static str])> {
        let mut targets: Vec<_> = self.entries.iter().map(|entry| (entry.id, entry.aliases)).collect();
        targets.sort_by_key(|(id, _)| *id);
        targets.dedup_by_key(|(id, _)| *id);
        targets
    }
}
