//! Shareable metadata for `polyemit_core::lang` registries.
//!
//! Every registry is a `const` table of [`LangItemInfo`] entries keyed by a small `Copy` id enum. This module holds
//! the entry type and the lookup helpers the registries share.

/// Metadata for one vocabulary item.
///
/// ## Notes
/// - `canonical` is the spelling used in diagnostics and docs.
/// - `aliases` are additional spellings accepted in source.
#[derive(Debug, Clone, Copy)]
pub struct LangItemInfo<Id> {
    pub id: Id,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
}

impl<Id: Copy + PartialEq> LangItemInfo<Id> {
    /// Whether `name` is the canonical spelling or one of the aliases.
    pub fn matches(&self, name: &str) -> bool {
        self.canonical == name || self.aliases.contains(&name)
    }
}

/// Resolve a spelling against a registry table.
///
/// Canonical spellings win over aliases so an alias can never shadow another entry's canonical name.
pub fn lookup<Id: Copy + PartialEq + 'static>(table: &'static [LangItemInfo<Id>], name: &str) -> Option<Id> {
    if let Some(item) = table.iter().find(|item| item.canonical == name) {
        return Some(item.id);
    }
    table.iter().find(|item| item.aliases.contains(&name)).map(|item| item.id)
}

/// Return the canonical spelling for an id.
///
/// Falls back to `"<unknown>"` if a table is missing an entry, which the guardrail tests rule out.
pub fn canonical<Id: Copy + PartialEq + 'static>(table: &'static [LangItemInfo<Id>], id: Id) -> &'static str {
    table
        .iter()
        .find(|item| item.id == id)
        .map(|item| item.canonical)
        .unwrap_or("<unknown>")
}

pub(crate) const fn info<Id: Copy>(
    id: Id,
    canonical: &'static str,
    aliases: &'static [&'static str],
    description: &'static str,
) -> LangItemInfo<Id> {
    LangItemInfo {
        id,
        canonical,
        aliases,
        description,
    }
}
