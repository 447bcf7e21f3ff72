//! Builtin function vocabulary.
//!
//! Bare calls to these names are candidates for the backends' rename tables (e.g. `print` becomes
//! `Console.WriteLine` in C# and `println!` in Rust).
//!
//! ## Examples
//! ```rust
//! use polyemit_core::lang::builtins::{self, BuiltinFnId};
//!
//! assert_eq!(builtins::from_str("println"), Some(BuiltinFnId::Print));
//! assert_eq!(builtins::as_str(BuiltinFnId::Print), "print");
//! ```

use super::registry::{self, LangItemInfo, info};

/// Stable identifier for a builtin function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFnId {
    Print,
    Len,
    Str,
    Abs,
    Min,
    Max,
    Sqrt,
}

pub type BuiltinFnInfo = LangItemInfo<BuiltinFnId>;

/// Registry of all builtin functions.
pub const BUILTIN_FUNCTIONS: &[BuiltinFnInfo] = &[
    info(BuiltinFnId::Print, "print", &["println"], "Print values to stdout, space separated."),
    info(BuiltinFnId::Len, "len", &[], "Length of a collection or string."),
    info(BuiltinFnId::Str, "str", &["to_string"], "Convert a value to a string."),
    info(BuiltinFnId::Abs, "abs", &[], "Absolute value."),
    info(BuiltinFnId::Min, "min", &[], "Smaller of two values."),
    info(BuiltinFnId::Max, "max", &[], "Larger of two values."),
    info(BuiltinFnId::Sqrt, "sqrt", &[], "Square root."),
];

/// Resolve a spelling to a builtin function identifier.
pub fn from_str(name: &str) -> Option<BuiltinFnId> {
    registry::lookup(BUILTIN_FUNCTIONS, name)
}

/// Canonical spelling of a builtin.
pub fn as_str(id: BuiltinFnId) -> &'static str {
    registry::canonical(BUILTIN_FUNCTIONS, id)
}
