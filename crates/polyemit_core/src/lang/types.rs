//! Source type-name vocabulary.
//!
//! Two registries: primitive names (`int`, `string`, ...) and generic container bases (`list`, `map`, ...). Both accept
//! aliases so source written against either naming tradition resolves to the same id.
//!
//! ## Notes
//! - Lookup is **case-sensitive**; capitalized container spellings are listed as explicit aliases.
//! - This module is vocabulary only. How an id is spelled in C# or Rust is decided by the backend mapping tables.
//!
//! ## Examples
//! ```rust
//! use polyemit_core::lang::types::{self, GenericTypeId};
//!
//! assert_eq!(types::generic_from_str("dict"), Some(GenericTypeId::Map));
//! assert_eq!(types::generic_as_str(GenericTypeId::Map), "map");
//! ```

use super::registry::{self, LangItemInfo, info};

/// Stable identifier for primitive source types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTypeId {
    /// Float-capable numeric type.
    Number,
    Float,
    Int,
    String,
    Bool,
    Char,
    Void,
    Any,
}

/// Stable identifier for generic container bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericTypeId {
    List,
    Map,
    Set,
    Array,
    Tuple,
    /// `function<A.., R>`: the last argument is the return type.
    Function,
    Promise,
    Optional,
}

/// Number of type arguments a generic base expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }

    /// The number of arguments to fill in when a reference supplies fewer than required.
    pub fn minimum(self) -> usize {
        match self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        }
    }
}

pub type PrimitiveTypeInfo = LangItemInfo<PrimitiveTypeId>;
pub type GenericTypeInfo = LangItemInfo<GenericTypeId>;

/// Registry of primitive source types.
pub const PRIMITIVE_TYPES: &[PrimitiveTypeInfo] = &[
    info(PrimitiveTypeId::Number, "number", &["numeric"], "Float-capable numeric value."),
    info(PrimitiveTypeId::Float, "float", &["double", "f64"], "64-bit floating point value."),
    info(PrimitiveTypeId::Int, "int", &["integer", "long", "i64", "i32"], "64-bit signed integer."),
    info(PrimitiveTypeId::String, "string", &["str", "String"], "UTF-8 text."),
    info(PrimitiveTypeId::Bool, "bool", &["boolean"], "Truth value."),
    info(PrimitiveTypeId::Char, "char", &[], "Single character."),
    info(PrimitiveTypeId::Void, "void", &["unit"], "No value."),
    info(PrimitiveTypeId::Any, "any", &["object", "dynamic"], "Value of any type."),
];

/// Registry of generic container bases.
pub const GENERIC_TYPES: &[GenericTypeInfo] = &[
    info(GenericTypeId::List, "list", &["List"], "Growable sequence."),
    info(GenericTypeId::Map, "map", &["dict", "Map", "Dict"], "Key/value map."),
    info(GenericTypeId::Set, "set", &["Set"], "Unordered set of unique values."),
    info(GenericTypeId::Array, "array", &["Array"], "Sequence with array semantics."),
    info(GenericTypeId::Tuple, "tuple", &["Tuple"], "Fixed-length heterogeneous tuple."),
    info(
        GenericTypeId::Function,
        "function",
        &["fn", "func", "Function"],
        "Callable value; last argument is the result.",
    ),
    info(GenericTypeId::Promise, "promise", &["task", "future", "Promise"], "Value available asynchronously."),
    info(GenericTypeId::Optional, "optional", &["option", "Optional"], "Value that may be absent."),
];

/// Resolve a primitive type spelling.
pub fn primitive_from_str(name: &str) -> Option<PrimitiveTypeId> {
    registry::lookup(PRIMITIVE_TYPES, name)
}

/// Canonical spelling of a primitive type.
pub fn primitive_as_str(id: PrimitiveTypeId) -> &'static str {
    registry::canonical(PRIMITIVE_TYPES, id)
}

/// Resolve a generic container base spelling.
pub fn generic_from_str(name: &str) -> Option<GenericTypeId> {
    registry::lookup(GENERIC_TYPES, name)
}

/// Canonical spelling of a generic container base.
pub fn generic_as_str(id: GenericTypeId) -> &'static str {
    registry::canonical(GENERIC_TYPES, id)
}

/// Expected argument count for a generic container base.
pub fn generic_arity(id: GenericTypeId) -> Arity {
    match id {
        GenericTypeId::List | GenericTypeId::Set | GenericTypeId::Array => Arity::Exact(1),
        GenericTypeId::Promise | GenericTypeId::Optional => Arity::Exact(1),
        GenericTypeId::Map => Arity::Exact(2),
        GenericTypeId::Tuple => Arity::AtLeast(2),
        GenericTypeId::Function => Arity::AtLeast(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_aliases_resolve() {
        assert_eq!(primitive_from_str("numeric"), Some(PrimitiveTypeId::Number));
        assert_eq!(primitive_from_str("boolean"), Some(PrimitiveTypeId::Bool));
        assert_eq!(primitive_from_str("dynamic"), Some(PrimitiveTypeId::Any));
        assert_eq!(primitive_from_str("Int"), None);
    }

    #[test]
    fn test_generic_aliases_resolve() {
        assert_eq!(generic_from_str("List"), Some(GenericTypeId::List));
        assert_eq!(generic_from_str("func"), Some(GenericTypeId::Function));
        assert_eq!(generic_from_str("future"), Some(GenericTypeId::Promise));
        assert_eq!(generic_from_str("vector"), None);
    }

    #[test]
    fn test_arity() {
        assert!(generic_arity(GenericTypeId::Map).accepts(2));
        assert!(!generic_arity(GenericTypeId::Map).accepts(1));
        assert!(generic_arity(GenericTypeId::Tuple).accepts(5));
        assert_eq!(generic_arity(GenericTypeId::Function).minimum(), 1);
    }
}
