//! lama Lexer
//!
//! Turns a pull-based character source into a stream of tokens, one token
//! per call. Handles maximal-munch operators, keyword classification,
//! `#` comments, and literal extraction with bounded buffers.
//!
//! # Example
//!
//! ```
//! use lama_lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("main.lama", "let x = 5".bytes());
//! assert_eq!(scanner.advance().kind, TokenKind::Let);
//! ```

pub mod literal;
pub mod scanner;
pub mod source;
pub mod token;

pub use literal::Literal;
pub use scanner::Scanner;
pub use source::CharSource;
pub use token::{Token, TokenKind, TokenValue};

/// Longest identifier the scanner accepts.
pub const MAX_IDENTIFIER_LEN: usize = 63;
/// Longest number literal (digits and the decimal point) the scanner accepts.
pub const MAX_NUMBER_LEN: usize = 127;
/// Keyword length bounds, used to reject keyword lookup early.
pub const MIN_KEYWORD_LEN: usize = 2;
pub const MAX_KEYWORD_LEN: usize = 10;

/// Lexical error carried by an error-kind token.
///
/// The scanner never fails outright; it hands these to the parser inside a
/// [`TokenKind::Error`] token and lets the parser report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Unreachable")]
    Unreachable,
    #[error("Identifier too long")]
    IdentifierTooLong,
    #[error("Invalid number")]
    InvalidNumber,
    #[error("Unterminated string")]
    UnterminatedString,
}
