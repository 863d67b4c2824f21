use std::sync::Arc;

use crate::source::CharSource;
use crate::token::{Token, TokenKind, TokenValue};
use crate::{LexError, Literal};
use crate::{MAX_IDENTIFIER_LEN, MAX_KEYWORD_LEN, MAX_NUMBER_LEN, MIN_KEYWORD_LEN};

/// lama source scanner.
///
/// Pulls one byte at a time from a [`CharSource`] and produces one token per
/// [`advance`](Scanner::advance) call. The scanner keeps a single byte of
/// lookahead and no token history: every token is returned owned and the
/// caller decides what to retain.
///
/// - Spaces, tabs, carriage returns and newlines are skipped; newlines bump the line.
/// - `#` starts a comment that runs to the end of the line.
/// - Operators are matched longest first (`*`, `**`, `**=`).
/// - Lexical problems become [`TokenKind::Error`] tokens, never panics.
pub struct Scanner<S> {
    source: S,
    origin: Arc<str>,
    lookahead: Option<u8>,
    primed: bool,
    line: usize,
}

impl<'a> Scanner<std::str::Bytes<'a>> {
    /// Tokenize a whole string, up to and including the EOF token.
    pub fn tokenize(origin: &str, text: &'a str) -> Vec<Token> {
        let mut scanner = Scanner::new(origin, text.bytes());
        let mut tokens = Vec::new();
        loop {
            let token = scanner.advance();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

impl<S: CharSource> Scanner<S> {
    /// Create a scanner over `source`, labelling tokens with `origin`.
    pub fn new(origin: impl Into<Arc<str>>, source: S) -> Self {
        Self {
            source,
            origin: origin.into(),
            lookahead: None,
            primed: false,
            line: 1,
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn origin(&self) -> &Arc<str> {
        &self.origin
    }

    /// Scan the next token.
    ///
    /// Once the input is exhausted every further call returns an EOF token.
    pub fn advance(&mut self) -> Token {
        loop {
            let Some(ch) = self.peek() else {
                return self.emit(TokenKind::Eof);
            };

            match ch {
                b'\n' => {
                    self.line += 1;
                    self.bump();
                }
                b' ' | b'\t' | b'\r' => self.bump(),
                b'#' => self.skip_comment(),
                _ => return self.scan_token(ch),
            }
        }
    }

    /// Scan a token starting with `ch` (already peeked, not consumed).
    fn scan_token(&mut self, ch: u8) -> Token {
        use TokenKind::*;

        match ch {
            b'"' => self.scan_string(),
            b'0'..=b'9' => self.scan_number(),
            c if is_ident_start(c) => self.scan_identifier(),

            b'@' => self.single(Annotation),
            b'~' => self.single(Tilde),
            b'[' => self.single(BracketOpen),
            b']' => self.single(BracketClose),
            b'{' => self.single(BraceOpen),
            b'}' => self.single(BraceClose),
            b'(' => self.single(ParenOpen),
            b')' => self.single(ParenClose),
            b',' => self.single(Comma),
            b';' => self.single(Semicolon),
            b':' => self.single(Colon),
            b'$' => self.single(Dollar),
            b'`' => self.single(Backtick),
            b'?' => self.single(QuestionMark),

            b'=' => self.after_first(&[(b'=', EqualEqual)], Equal),
            b'!' => self.after_first(&[(b'=', BangEqual)], Bang),
            b'+' => self.after_first(&[(b'=', PlusEqual)], Plus),
            b'/' => self.after_first(&[(b'=', SlashEqual)], Slash),
            b'%' => self.after_first(&[(b'=', PercentEqual)], Percent),
            b'^' => self.after_first(&[(b'=', CaretEqual)], Caret),
            b'.' => self.after_first(&[(b'.', PeriodPeriod)], Period),
            b'-' => self.after_first(&[(b'=', MinusEqual), (b'>', Arrow)], Minus),
            b'&' => self.after_first(
                &[(b'&', AmpersandAmpersand), (b'=', AmpersandEqual)],
                Ampersand,
            ),
            b'|' => self.after_first(&[(b'|', PipePipe), (b'=', PipeEqual)], Pipe),

            // Three-character forms: `<<=`, `>>=`, `**=`
            b'<' => {
                self.bump();
                match self.peek() {
                    Some(b'=') => self.single(LessEqual),
                    Some(b'<') => {
                        self.bump();
                        self.either(b'=', LessLessEqual, LessLess)
                    }
                    _ => self.emit(Less),
                }
            }
            b'>' => {
                self.bump();
                match self.peek() {
                    Some(b'=') => self.single(GreaterEqual),
                    Some(b'>') => {
                        self.bump();
                        self.either(b'=', GreaterGreaterEqual, GreaterGreater)
                    }
                    _ => self.emit(Greater),
                }
            }
            b'*' => {
                self.bump();
                match self.peek() {
                    Some(b'=') => self.single(StarEqual),
                    Some(b'*') => {
                        self.bump();
                        self.either(b'=', StarStarEqual, StarStar)
                    }
                    _ => self.emit(Star),
                }
            }

            _ => {
                self.bump();
                self.emit_error(LexError::Unreachable, self.line)
            }
        }
    }

    // --- Scanners ---

    /// Scan an identifier, wildcard, or keyword.
    fn scan_identifier(&mut self) -> Token {
        let line = self.line;
        let mut name = String::new();
        let mut has_digit = false;

        while let Some(c) = self.peek().filter(|c| is_ident_char(*c)) {
            if name.len() == MAX_IDENTIFIER_LEN {
                self.skip_while(is_ident_char);
                return self.emit_error(LexError::IdentifierTooLong, line);
            }
            has_digit |= c.is_ascii_digit();
            name.push(char::from(c));
            self.bump();
        }

        if name == "_" {
            return self.emit_at(TokenKind::Underscore, TokenValue::None, line);
        }

        // No keyword contains a digit
        let keyword = if has_digit { None } else { keyword(&name) };
        match keyword {
            Some(kind) => self.emit_at(kind, TokenValue::None, line),
            None => self.emit_at(
                TokenKind::Identifier,
                TokenValue::Literal(Literal::Text(name)),
                line,
            ),
        }
    }

    /// Scan a number literal: digits with at most one `.`.
    fn scan_number(&mut self) -> Token {
        let line = self.line;
        let mut text = String::new();
        let mut is_float = false;

        while let Some(c) = self.peek() {
            match c {
                b'0'..=b'9' => {}
                b'.' if !is_float => is_float = true,
                b'.' => return self.invalid_number(line),
                _ => break,
            }
            if text.len() == MAX_NUMBER_LEN {
                return self.invalid_number(line);
            }
            text.push(char::from(c));
            self.bump();
        }

        // TODO: numeric suffixes (`10u8`, `1.5f32`) once the type system lands
        let literal = if is_float {
            text.parse::<f64>().ok().map(Literal::Float)
        } else {
            text.parse::<i64>().ok().map(Literal::Int)
        };

        match literal {
            Some(literal) => self.emit_at(TokenKind::Literal, TokenValue::Literal(literal), line),
            None => self.emit_error(LexError::InvalidNumber, line),
        }
    }

    fn invalid_number(&mut self, line: usize) -> Token {
        self.skip_while(|c| c.is_ascii_digit() || c == b'.');
        self.emit_error(LexError::InvalidNumber, line)
    }

    /// Scan a `"`-delimited string literal with `\n \t \r \\ \"` escapes.
    fn scan_string(&mut self) -> Token {
        let line = self.line;
        self.bump(); // consume opening quote

        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                None => return self.emit_error(LexError::UnterminatedString, line),
                Some(b'"') => {
                    self.bump();
                    break;
                }
                Some(b'\\') => {
                    self.bump();
                    let Some(escaped) = self.peek() else {
                        return self.emit_error(LexError::UnterminatedString, line);
                    };
                    match escaped {
                        b'n' => bytes.push(b'\n'),
                        b't' => bytes.push(b'\t'),
                        b'r' => bytes.push(b'\r'),
                        b'\\' | b'"' => bytes.push(escaped),
                        other => {
                            if other == b'\n' {
                                self.line += 1;
                            }
                            bytes.push(b'\\');
                            bytes.push(other);
                        }
                    }
                    self.bump();
                }
                Some(c) => {
                    if c == b'\n' {
                        self.line += 1;
                    }
                    bytes.push(c);
                    self.bump();
                }
            }
        }

        let text = String::from_utf8_lossy(&bytes).into_owned();
        self.emit_at(TokenKind::Literal, TokenValue::Literal(Literal::Text(text)), line)
    }

    /// Skip a `#` comment up to (not including) the newline.
    fn skip_comment(&mut self) {
        self.skip_while(|c| c != b'\n');
    }

    // --- Helpers ---

    fn peek(&mut self) -> Option<u8> {
        if !self.primed {
            self.lookahead = self.source.next_char();
            self.primed = true;
        }
        self.lookahead
    }

    fn bump(&mut self) {
        // End of input stays primed so EOF is sticky
        if self.lookahead.is_some() {
            self.primed = false;
        }
    }

    fn skip_while(&mut self, keep: impl Fn(u8) -> bool) {
        while self.peek().is_some_and(&keep) {
            self.bump();
        }
    }

    /// Consume the current byte and emit `kind`.
    fn single(&mut self, kind: TokenKind) -> Token {
        self.bump();
        self.emit(kind)
    }

    /// Emit `long` if the next byte is `next` (consuming it), else `short`.
    fn either(&mut self, next: u8, long: TokenKind, short: TokenKind) -> Token {
        if self.peek() == Some(next) {
            self.single(long)
        } else {
            self.emit(short)
        }
    }

    /// Consume the current byte, then try each two-byte continuation before
    /// falling back to the one-byte form.
    fn after_first(&mut self, longer: &[(u8, TokenKind)], short: TokenKind) -> Token {
        self.bump();
        let next = self.peek();
        match longer.iter().find(|(c, _)| Some(*c) == next) {
            Some(&(_, kind)) => self.single(kind),
            None => self.emit(short),
        }
    }

    fn emit(&self, kind: TokenKind) -> Token {
        self.emit_at(kind, TokenValue::None, self.line)
    }

    fn emit_error(&self, err: LexError, line: usize) -> Token {
        self.emit_at(TokenKind::Error, TokenValue::Error(err), line)
    }

    fn emit_at(&self, kind: TokenKind, value: TokenValue, line: usize) -> Token {
        Token::new(kind, value, line, Arc::clone(&self.origin))
    }
}

// --- Keyword detection ---

/// Classify `text` as a keyword, if it is one.
///
/// Gated on the keyword length bounds, then matched exactly. The table has
/// no duplicates, so a keyword always wins over a plain identifier.
pub fn keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;

    if !(MIN_KEYWORD_LEN..=MAX_KEYWORD_LEN).contains(&text.len()) {
        return None;
    }

    let kind = match text {
        "and" => And,
        "as" => As,
        "assert" => Assert,
        "await" => Await,
        "break" => Break,
        "breakpoint" => Breakpoint,
        "class" => Class,
        "class_name" => ClassName,
        "const" => Const,
        "continue" => Continue,
        "elif" => Elif,
        "else" => Else,
        "enum" => Enum,
        "extends" => Extends,
        "for" => For,
        "func" => Func,
        "if" => If,
        "in" => In,
        "inf" => ConstInf,
        "is" => Is,
        "let" => Let,
        "match" => Match,
        "nan" => ConstNan,
        "not" => Not,
        "or" => Or,
        "pass" => Pass,
        "pi" => ConstPi,
        "preload" => Preload,
        "ret" => Ret,
        "self" => SelfKw,
        "signal" => Signal,
        "space" => Space,
        "static" => Static,
        "super" => Super,
        "tau" => ConstTau,
        "trait" => Trait,
        "type" => Type,
        "void" => Void,
        "when" => When,
        "while" => While,
        "yield" => Yield,
        _ => return None,
    };
    Some(kind)
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Helper: tokenize and return token kinds (ignoring payloads).
    fn kinds(source: &str) -> Vec<TokenKind> {
        Scanner::tokenize("test.lama", source)
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    /// Helper: scan exactly one token.
    fn first(source: &str) -> Token {
        Scanner::new("test.lama", source.bytes()).advance()
    }

    // =========================================================================
    // Structure: empty, whitespace, comments, EOF
    // =========================================================================

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_whitespace_only() {
        assert_eq!(kinds(" \t\r\n\n  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_eof_is_sticky() {
        let mut scanner = Scanner::new("test.lama", "x".bytes());
        assert_eq!(scanner.advance().kind, TokenKind::Identifier);
        for _ in 0..3 {
            assert_eq!(scanner.advance().kind, TokenKind::Eof);
        }
    }

    #[test]
    fn test_comment_to_end_of_line() {
        assert_eq!(
            kinds("let # the rest is ignored ( { \nx"),
            vec![TokenKind::Let, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    #[test]
    fn test_comment_at_end_of_input() {
        assert_eq!(kinds("# only a comment"), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_line_numbers() {
        let tokens = Scanner::tokenize("test.lama", "a\n\nb # c\n  d");
        let lines: Vec<usize> = tokens.iter().map(|t| t.line).collect();
        assert_eq!(lines, vec![1, 3, 4, 4]);
    }

    #[test]
    fn test_origin_on_every_token() {
        let tokens = Scanner::tokenize("demo.lama", "a b");
        assert!(tokens.iter().all(|t| &*t.origin == "demo.lama"));
    }

    // =========================================================================
    // Operators: maximal munch
    // =========================================================================

    #[test]
    fn test_less_family() {
        assert_eq!(
            kinds("< <= << <<="),
            vec![
                TokenKind::Less,
                TokenKind::LessEqual,
                TokenKind::LessLess,
                TokenKind::LessLessEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_greater_family() {
        assert_eq!(
            kinds("> >= >> >>="),
            vec![
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::GreaterGreater,
                TokenKind::GreaterGreaterEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_star_family() {
        assert_eq!(
            kinds("* *= ** **="),
            vec![
                TokenKind::Star,
                TokenKind::StarEqual,
                TokenKind::StarStar,
                TokenKind::StarStarEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_ampersand_and_pipe_families() {
        assert_eq!(
            kinds("& && &= | || |="),
            vec![
                TokenKind::Ampersand,
                TokenKind::AmpersandAmpersand,
                TokenKind::AmpersandEqual,
                TokenKind::Pipe,
                TokenKind::PipePipe,
                TokenKind::PipeEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_minus_family() {
        assert_eq!(
            kinds("- -> -="),
            vec![
                TokenKind::Minus,
                TokenKind::Arrow,
                TokenKind::MinusEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_equal_and_bang() {
        assert_eq!(
            kinds("= == ! !="),
            vec![
                TokenKind::Equal,
                TokenKind::EqualEqual,
                TokenKind::Bang,
                TokenKind::BangEqual,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_operators_without_spaces() {
        // `a<=-b` is `a`, `<=`, `-`, `b`
        assert_eq!(
            kinds("a<=-b"),
            vec![
                TokenKind::Identifier,
                TokenKind::LessEqual,
                TokenKind::Minus,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            kinds("***="),
            vec![TokenKind::StarStar, TokenKind::StarEqual, TokenKind::Eof]
        );
    }

    #[test]
    fn test_punctuation() {
        assert_eq!(
            kinds("[ ] { } ( ) , ; . .. : $ @ ~ ^ ^= % %= / /= + += ` ?"),
            vec![
                TokenKind::BracketOpen,
                TokenKind::BracketClose,
                TokenKind::BraceOpen,
                TokenKind::BraceClose,
                TokenKind::ParenOpen,
                TokenKind::ParenClose,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Period,
                TokenKind::PeriodPeriod,
                TokenKind::Colon,
                TokenKind::Dollar,
                TokenKind::Annotation,
                TokenKind::Tilde,
                TokenKind::Caret,
                TokenKind::CaretEqual,
                TokenKind::Percent,
                TokenKind::PercentEqual,
                TokenKind::Slash,
                TokenKind::SlashEqual,
                TokenKind::Plus,
                TokenKind::PlusEqual,
                TokenKind::Backtick,
                TokenKind::QuestionMark,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_annotation_has_no_payload() {
        let tok = first("@export");
        assert_eq!(tok.kind, TokenKind::Annotation);
        assert_eq!(tok.value, TokenValue::None);
    }

    // =========================================================================
    // Identifiers and keywords
    // =========================================================================

    #[test]
    fn test_identifier_text_verbatim() {
        for name in ["x", "count", "my_var", "_private", "a1b2", "Self_", "letx", "spaces"] {
            let tok = first(name);
            assert_eq!(tok.kind, TokenKind::Identifier, "{name}");
            assert_eq!(tok.name(), Some(name));
        }
    }

    #[test]
    fn test_underscore_is_wildcard() {
        let tok = first("_");
        assert_eq!(tok.kind, TokenKind::Underscore);
        assert_eq!(tok.value, TokenValue::None);
        assert_eq!(first("__").kind, TokenKind::Identifier);
    }

    #[test]
    fn test_keywords() {
        assert_eq!(
            kinds("space enum type let func if match const static"),
            vec![
                TokenKind::Space,
                TokenKind::Enum,
                TokenKind::Type,
                TokenKind::Let,
                TokenKind::Func,
                TokenKind::If,
                TokenKind::Match,
                TokenKind::Const,
                TokenKind::Static,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_keyword_length_bounds() {
        assert_eq!(keyword("breakpoint"), Some(TokenKind::Breakpoint));
        assert_eq!(keyword("class_name"), Some(TokenKind::ClassName));
        assert_eq!(keyword("breakpoints"), None);
        assert_eq!(keyword("i"), None);
        assert_eq!(keyword(""), None);
    }

    #[test]
    fn test_every_keyword_round_trips_through_display_name() {
        let words = [
            "and", "as", "assert", "await", "break", "breakpoint", "class", "class_name",
            "const", "continue", "elif", "else", "enum", "extends", "for", "func", "if", "in",
            "inf", "is", "let", "match", "nan", "not", "or", "pass", "pi", "preload", "ret",
            "self", "signal", "space", "static", "super", "tau", "trait", "type", "void",
            "when", "while", "yield",
        ];
        for word in words {
            let kind = keyword(word).unwrap_or_else(|| panic!("{word} is a keyword"));
            assert_eq!(kind.display_name(), word);
        }
    }

    #[test]
    fn test_identifier_with_digit_skips_keyword_lookup() {
        assert_eq!(first("if2").kind, TokenKind::Identifier);
    }

    #[test]
    fn test_identifier_at_max_length() {
        let name = "a".repeat(MAX_IDENTIFIER_LEN);
        let tok = first(&name);
        assert_eq!(tok.kind, TokenKind::Identifier);
        assert_eq!(tok.name(), Some(name.as_str()));
    }

    #[test]
    fn test_identifier_too_long() {
        let name = "a".repeat(MAX_IDENTIFIER_LEN + 1);
        let tokens = Scanner::tokenize("test.lama", &format!("{name} x"));
        assert_eq!(tokens[0].kind, TokenKind::Error);
        assert_eq!(tokens[0].error(), Some(LexError::IdentifierTooLong));
        // The rest of the over-long name is not re-scanned as a new identifier
        assert_eq!(tokens[1].name(), Some("x"));
    }

    #[test]
    fn test_identifier_too_long_with_trailing_underscore() {
        let name = format!("{}_", "a".repeat(MAX_IDENTIFIER_LEN));
        assert_eq!(first(&name).error(), Some(LexError::IdentifierTooLong));
    }

    // =========================================================================
    // Numbers
    // =========================================================================

    #[test]
    fn test_integer() {
        let tok = first("42");
        assert_eq!(tok.kind, TokenKind::Literal);
        assert_eq!(tok.literal(), Some(&Literal::Int(42)));
    }

    #[test]
    fn test_float() {
        assert_eq!(first("3.25").literal(), Some(&Literal::Float(3.25)));
        assert_eq!(first("5.").literal(), Some(&Literal::Float(5.0)));
    }

    #[test]
    fn test_second_dot_is_invalid() {
        let tok = first("1.2.3");
        assert_eq!(tok.kind, TokenKind::Error);
        assert_eq!(tok.error(), Some(LexError::InvalidNumber));
    }

    #[test]
    fn test_number_too_long() {
        let digits = "1".repeat(MAX_NUMBER_LEN + 1);
        assert_eq!(first(&digits).error(), Some(LexError::InvalidNumber));
    }

    #[test]
    fn test_integer_overflow_is_invalid() {
        assert_eq!(first("99999999999999999999").error(), Some(LexError::InvalidNumber));
    }

    #[test]
    fn test_number_then_identifier() {
        assert_eq!(
            kinds("10px"),
            vec![TokenKind::Literal, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    // =========================================================================
    // Strings
    // =========================================================================

    #[test]
    fn test_string_contents() {
        let tok = first(r#""hello world""#);
        assert_eq!(tok.kind, TokenKind::Literal);
        assert_eq!(tok.literal(), Some(&Literal::Text("hello world".into())));
    }

    #[test]
    fn test_string_escapes() {
        let tok = first(r#""a\n\t\"b\\\q""#);
        assert_eq!(tok.literal(), Some(&Literal::Text("a\n\t\"b\\\\q".into())));
    }

    #[test]
    fn test_unterminated_string() {
        let tok = first("\"never closed");
        assert_eq!(tok.kind, TokenKind::Error);
        assert_eq!(tok.error(), Some(LexError::UnterminatedString));
    }

    #[test]
    fn test_multiline_string_counts_lines() {
        let tokens = Scanner::tokenize("test.lama", "\"a\nb\" x");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    #[test]
    fn test_unclassifiable_character() {
        let tokens = Scanner::tokenize("test.lama", "\\ x");
        assert_eq!(tokens[0].error(), Some(LexError::Unreachable));
        assert_eq!(tokens[1].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_non_ascii_is_unclassifiable() {
        assert_eq!(first("é").error(), Some(LexError::Unreachable));
    }

    // =========================================================================
    // Realistic input
    // =========================================================================

    #[test]
    fn test_method_declaration() {
        assert_eq!(
            kinds("func f(a: const Int) Int {\n  a = a + 1\n}"),
            vec![
                TokenKind::Func,
                TokenKind::Identifier,
                TokenKind::ParenOpen,
                TokenKind::Identifier,
                TokenKind::Colon,
                TokenKind::Const,
                TokenKind::Identifier,
                TokenKind::ParenClose,
                TokenKind::Identifier,
                TokenKind::BraceOpen,
                TokenKind::Identifier,
                TokenKind::Equal,
                TokenKind::Identifier,
                TokenKind::Plus,
                TokenKind::Literal,
                TokenKind::BraceClose,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_match_arm() {
        assert_eq!(
            kinds("match x { _ -> { } }"),
            vec![
                TokenKind::Match,
                TokenKind::Identifier,
                TokenKind::BraceOpen,
                TokenKind::Underscore,
                TokenKind::Arrow,
                TokenKind::BraceOpen,
                TokenKind::BraceClose,
                TokenKind::BraceClose,
                TokenKind::Eof,
            ]
        );
    }
}
