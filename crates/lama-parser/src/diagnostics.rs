//! Parse failures and the sink they are reported to.

use std::fmt;
use std::sync::Arc;

use lama_lexer::{LexError, Token, TokenKind};

use crate::ast::TreeError;

/// What the parser was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    /// A fixed token, shown by its display string (`}`, `Identifier`).
    Token(TokenKind),
    /// A grammar rule, shown by name (`EXPRESSION`, `SCOPE`).
    Rule(&'static str),
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Token(kind) => f.write_str(kind.display_name()),
            Expected::Rule(name) => f.write_str(name),
        }
    }
}

/// The offending token, as shown in a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    Identifier(String),
    Lexical(LexError),
    Token(TokenKind),
}

impl Found {
    pub fn from_token(token: &Token) -> Self {
        if let Some(name) = token.name() {
            return Found::Identifier(name.to_string());
        }
        match token.error() {
            Some(err) => Found::Lexical(err),
            None => Found::Token(token.kind),
        }
    }
}

impl fmt::Display for Found {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Found::Identifier(name) => write!(f, "IDENTIFIER: \"{name}\""),
            Found::Lexical(err) => write!(f, "ERROR: \"{err}\""),
            Found::Token(kind) => write!(f, "\"{kind}\""),
        }
    }
}

/// Parser error with source position.
///
/// Parsing stops at the first one; there is no recovery.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("{origin}:{line} error: Expected \"{expected}\", found {found}")]
    Expected {
        origin: Arc<str>,
        line: usize,
        expected: Expected,
        found: Found,
    },

    /// The engine reached a state its own grammar rules out.
    #[error("{origin}:{line} internal error: {message}")]
    Internal {
        origin: Arc<str>,
        line: usize,
        message: String,
    },

    #[error("{origin}:{line} error: nesting exceeds {limit} grammar rules")]
    TooDeep {
        origin: Arc<str>,
        line: usize,
        limit: usize,
    },
}

impl ParseError {
    pub fn expected(expected: Expected, token: &Token) -> Self {
        ParseError::Expected {
            origin: Arc::clone(&token.origin),
            line: token.line,
            expected,
            found: Found::from_token(token),
        }
    }

    pub fn internal(message: impl Into<String>, token: &Token) -> Self {
        ParseError::Internal {
            origin: Arc::clone(&token.origin),
            line: token.line,
            message: message.into(),
        }
    }

    pub fn tree(err: TreeError, token: &Token) -> Self {
        Self::internal(err.to_string(), token)
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ParseError::Internal { .. })
    }

    pub fn line(&self) -> usize {
        match self {
            ParseError::Expected { line, .. }
            | ParseError::Internal { line, .. }
            | ParseError::TooDeep { line, .. } => *line,
        }
    }
}

/// Receiver for parse diagnostics.
///
/// The parser reports its single fatal error here before unwinding.
pub trait DiagnosticSink {
    fn report(&mut self, error: &ParseError);
}

/// Discards diagnostics.
impl DiagnosticSink for () {
    fn report(&mut self, _error: &ParseError) {}
}

/// Collects diagnostics.
impl DiagnosticSink for Vec<ParseError> {
    fn report(&mut self, error: &ParseError) {
        self.push(error.clone());
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, error: &ParseError) {
        (**self).report(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lama_lexer::{Literal, TokenValue};

    fn token(kind: TokenKind, value: TokenValue) -> Token {
        Token::new(kind, value, 3, Arc::from("main.lama"))
    }

    #[test]
    fn test_expected_terminal_message() {
        let eof = token(TokenKind::Eof, TokenValue::None);
        let err = ParseError::expected(Expected::Token(TokenKind::BraceClose), &eof);
        assert_eq!(
            err.to_string(),
            "main.lama:3 error: Expected \"}\", found \"End of file\""
        );
    }

    #[test]
    fn test_expected_rule_with_identifier() {
        let ident = token(
            TokenKind::Identifier,
            TokenValue::Literal(Literal::Text("foo".into())),
        );
        let err = ParseError::expected(Expected::Rule("SCOPE"), &ident);
        assert_eq!(
            err.to_string(),
            "main.lama:3 error: Expected \"SCOPE\", found IDENTIFIER: \"foo\""
        );
    }

    #[test]
    fn test_lexical_error_is_named() {
        let bad = token(TokenKind::Error, TokenValue::Error(LexError::InvalidNumber));
        let err = ParseError::expected(Expected::Rule("EXPRESSION"), &bad);
        assert_eq!(
            err.to_string(),
            "main.lama:3 error: Expected \"EXPRESSION\", found ERROR: \"Invalid number\""
        );
    }

    #[test]
    fn test_internal_is_distinct() {
        let eof = token(TokenKind::Eof, TokenValue::None);
        let err = ParseError::internal("unreachable", &eof);
        assert!(err.is_internal());
        assert_eq!(err.to_string(), "main.lama:3 internal error: unreachable");
        assert_eq!(err.line(), 3);
    }

    #[test]
    fn test_vec_sink_collects() {
        let eof = token(TokenKind::Eof, TokenValue::None);
        let err = ParseError::internal("boom", &eof);
        let mut sink: Vec<ParseError> = Vec::new();
        sink.report(&err);
        assert_eq!(sink, vec![err]);
    }
}
