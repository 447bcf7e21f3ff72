//! Source language and target language vocabulary registries.
//!
//! Callers work with **stable IDs** (e.g. `PrimitiveTypeId`, `BuiltinFnId`) and look up spellings via registry
//! tables instead of scattering string comparisons across the emitters.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//!
//! ## Examples
//! ```rust
//! use polyemit_core::lang::types::{self, PrimitiveTypeId};
//!
//! assert_eq!(types::primitive_from_str("integer"), Some(PrimitiveTypeId::Int));
//! assert_eq!(types::primitive_as_str(PrimitiveTypeId::Int), "int");
//! ```

pub mod builtins;
pub mod keywords;
pub mod markers;
pub mod registry;
pub mod types;
