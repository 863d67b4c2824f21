use std::fmt;

/// An immutable scalar value produced by the scanner.
///
/// Number tokens carry `Int` or `Float`, string and identifier tokens carry
/// `Text`. Ownership moves with the token (or tree node) holding it.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Literal {
    /// Short tag used by the token and tree dumps.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Text(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(n) => write!(f, "{n:?}"),
            Literal::Text(text) => write!(f, "{text:?}"),
        }
    }
}
