//! Lexical analysis for Fx source code.
//!
//! The lexer turns source text into a flat stream of [`Token`]s ending with
//! [`TokenKind::Eof`], or reports the first offending character as an
//! [`FxError`](fx_util::FxError). Whitespace is skipped, `#` comments are
//! consumed up to (and including) their newline, and both `\n` and `;`
//! produce [`TokenKind::Newline`] so the parser never cares which separator
//! the programmer used.

pub mod cursor;
mod edge_cases;
pub mod lexer;
pub mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Keyword, Token, TokenKind};
