//! Declaration marker attributes.
//!
//! Markers are backend metadata rather than target facts: they are never emitted as attributes and a declaration
//! carrying one never receives an emitted body.
//!
//! - `external`: the declaration exists in the host runtime; nothing to generate.
//! - `foreign_call`: the declaration maps 1:1 onto a host-runtime API and is referenced by qualified name only.

use super::registry::{self, LangItemInfo, info};

/// Stable identifier for a marker attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerId {
    External,
    ForeignCall,
}

pub type MarkerInfo = LangItemInfo<MarkerId>;

/// Registry of marker attributes.
pub const MARKERS: &[MarkerInfo] = &[
    info(MarkerId::External, "external", &["extern"], "Declared in the host runtime; no body to emit."),
    info(
        MarkerId::ForeignCall,
        "foreign_call",
        &["foreign-call"],
        "Maps onto a host-runtime API; referenced by qualified name only.",
    ),
];

/// Resolve an attribute name to a marker.
pub fn from_str(name: &str) -> Option<MarkerId> {
    registry::lookup(MARKERS, name)
}

/// Canonical spelling of a marker.
pub fn as_str(id: MarkerId) -> &'static str {
    registry::canonical(MARKERS, id)
}
