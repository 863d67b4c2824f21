use std::fmt;
use std::sync::Arc;

use crate::LexError;

/// Token classification for lama source.
///
/// The payload (literal value, identifier text, lexical error) lives in
/// [`TokenValue`] so kinds stay `Copy` and can be named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Basic
    Annotation,
    Identifier,
    Literal,

    // Comparison
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    EqualEqual,
    BangEqual,

    // Logical
    And,
    Or,
    Not,
    AmpersandAmpersand,
    PipePipe,
    Bang,

    // Bitwise
    Ampersand,
    Pipe,
    Tilde,
    Caret,
    LessLess,
    GreaterGreater,

    // Math
    Plus,
    Minus,
    Star,
    StarStar,
    Slash,
    Percent,

    // Assignment
    Equal,
    PlusEqual,
    MinusEqual,
    StarEqual,
    StarStarEqual,
    SlashEqual,
    PercentEqual,
    LessLessEqual,
    GreaterGreaterEqual,
    AmpersandEqual,
    PipeEqual,
    CaretEqual,

    // Control flow
    If,
    Elif,
    Else,
    For,
    While,
    Break,
    Continue,
    Pass,
    Ret,
    Match,
    When,

    // Keywords
    As,
    Assert,
    Await,
    Breakpoint,
    Class,
    ClassName,
    Const,
    Enum,
    Extends,
    Func,
    In,
    Is,
    Let,
    Preload,
    SelfKw,
    Signal,
    Space,
    Static,
    Super,
    Trait,
    Type,
    Void,
    Yield,

    // Punctuation
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    ParenOpen,
    ParenClose,
    Comma,
    Semicolon,
    Period,
    PeriodPeriod,
    Colon,
    Dollar,
    Arrow,
    Underscore,

    // Named constants
    ConstPi,
    ConstTau,
    ConstInf,
    ConstNan,

    // Reserved for friendlier errors
    Backtick,
    QuestionMark,

    // Special
    Error,
    Eof,
}

impl TokenKind {
    /// Canonical display string, used verbatim in diagnostics.
    pub fn display_name(self) -> &'static str {
        use TokenKind::*;
        match self {
            Annotation => "Annotation",
            Identifier => "Identifier",
            Literal => "Literal",
            Less => "<",
            LessEqual => "<=",
            Greater => ">",
            GreaterEqual => ">=",
            EqualEqual => "==",
            BangEqual => "!=",
            And => "and",
            Or => "or",
            Not => "not",
            AmpersandAmpersand => "&&",
            PipePipe => "||",
            Bang => "!",
            Ampersand => "&",
            Pipe => "|",
            Tilde => "~",
            Caret => "^",
            LessLess => "<<",
            GreaterGreater => ">>",
            Plus => "+",
            Minus => "-",
            Star => "*",
            StarStar => "**",
            Slash => "/",
            Percent => "%",
            Equal => "=",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            StarStarEqual => "**=",
            SlashEqual => "/=",
            PercentEqual => "%=",
            LessLessEqual => "<<=",
            GreaterGreaterEqual => ">>=",
            AmpersandEqual => "&=",
            PipeEqual => "|=",
            CaretEqual => "^=",
            If => "if",
            Elif => "elif",
            Else => "else",
            For => "for",
            While => "while",
            Break => "break",
            Continue => "continue",
            Pass => "pass",
            Ret => "ret",
            Match => "match",
            When => "when",
            As => "as",
            Assert => "assert",
            Await => "await",
            Breakpoint => "breakpoint",
            Class => "class",
            ClassName => "class_name",
            Const => "const",
            Enum => "enum",
            Extends => "extends",
            Func => "func",
            In => "in",
            Is => "is",
            Let => "let",
            Preload => "preload",
            SelfKw => "self",
            Signal => "signal",
            Space => "space",
            Static => "static",
            Super => "super",
            Trait => "trait",
            Type => "type",
            Void => "void",
            Yield => "yield",
            BracketOpen => "[",
            BracketClose => "]",
            BraceOpen => "{",
            BraceClose => "}",
            ParenOpen => "(",
            ParenClose => ")",
            Comma => ",",
            Semicolon => ";",
            Period => ".",
            PeriodPeriod => "..",
            Colon => ":",
            Dollar => "$",
            Arrow => "->",
            Underscore => "_",
            ConstPi => "pi",
            ConstTau => "tau",
            ConstInf => "inf",
            ConstNan => "nan",
            Backtick => "`",
            QuestionMark => "?",
            Error => "Error",
            Eof => "End of file",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// The value carried by a token.
///
/// Identifier tokens carry their name as [`crate::Literal::Text`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    None,
    Literal(crate::Literal),
    Error(LexError),
}

/// A token produced by the lama scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: TokenValue,
    pub line: usize,
    /// Name of the originating source, shared by every token of one scan.
    pub origin: Arc<str>,
}

impl Token {
    pub fn new(kind: TokenKind, value: TokenValue, line: usize, origin: Arc<str>) -> Self {
        Self {
            kind,
            value,
            line,
            origin,
        }
    }

    pub fn literal(&self) -> Option<&crate::Literal> {
        match &self.value {
            TokenValue::Literal(literal) => Some(literal),
            _ => None,
        }
    }

    /// The identifier text, for identifier tokens only.
    pub fn name(&self) -> Option<&str> {
        match self.kind {
            TokenKind::Identifier => self.literal().and_then(crate::Literal::as_text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<LexError> {
        match self.value {
            TokenValue::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Take the literal out of the token, leaving `TokenValue::None` behind.
    pub fn take_literal(&mut self) -> Option<crate::Literal> {
        match std::mem::replace(&mut self.value, TokenValue::None) {
            TokenValue::Literal(literal) => Some(literal),
            other => {
                self.value = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Literal;

    fn token(kind: TokenKind, value: TokenValue) -> Token {
        Token::new(kind, value, 1, Arc::from("test.lama"))
    }

    #[test]
    fn test_display_names() {
        assert_eq!(TokenKind::BraceClose.display_name(), "}");
        assert_eq!(TokenKind::Eof.to_string(), "End of file");
        assert_eq!(TokenKind::Identifier.to_string(), "Identifier");
        assert_eq!(TokenKind::StarStarEqual.to_string(), "**=");
    }

    #[test]
    fn test_name_only_for_identifiers() {
        let ident = token(
            TokenKind::Identifier,
            TokenValue::Literal(Literal::Text("count".into())),
        );
        assert_eq!(ident.name(), Some("count"));

        let text = token(
            TokenKind::Literal,
            TokenValue::Literal(Literal::Text("count".into())),
        );
        assert_eq!(text.name(), None);
    }

    #[test]
    fn test_take_literal() {
        let mut tok = token(TokenKind::Literal, TokenValue::Literal(Literal::Int(7)));
        assert_eq!(tok.take_literal(), Some(Literal::Int(7)));
        assert_eq!(tok.value, TokenValue::None);
        assert_eq!(tok.take_literal(), None);
    }

    #[test]
    fn test_take_literal_keeps_error() {
        let mut tok = token(TokenKind::Error, TokenValue::Error(LexError::InvalidNumber));
        assert_eq!(tok.take_literal(), None);
        assert_eq!(tok.error(), Some(LexError::InvalidNumber));
    }
}
