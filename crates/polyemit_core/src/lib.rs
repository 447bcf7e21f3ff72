//! Provide the shared vocabulary of the polyemit backend.
//!
//! This crate is intentionally small and dependency-free. It holds the spellings every emitter needs to agree on:
//! source type names and their aliases, builtin function names, declaration marker attributes, and the reserved
//! words of each output language.
//!
//! ## Notes
//!
//! - This is a vocabulary crate: **no IO**, no global mutable state, and no AST types.
//! - Emission policy (how a name is spelled in a target) lives in the backend, not here.

pub mod lang;
