//! Input syntax model for the polyemit backend.
//!
//! The external lexer/parser pair produces these types; the backend only reads them. Every node derives
//! `Serialize`/`Deserialize` so a parser living in another process can hand a program over as JSON.
//!
//! ## Modules
//!
//! - `ast` - statements, expressions, declarations, type references
//! - `tokens` - the lexer's token-kind set (operators are expressed as token kinds)

pub mod ast;
pub mod tokens;

pub use ast::*;
pub use tokens::TokenKind;
