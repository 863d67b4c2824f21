//! lama Parser
//!
//! Parses a token stream into a syntax tree held in a single arena.
//! The parse engine keeps its grammar rules on an explicit frame stack, so
//! deeply nested input cannot overflow the native stack.
//!
//! Identifiers are hashed on the way in (see [`ident`]); the tree can be
//! dumped for debugging ([`printer`]) or written back out as normalized
//! source ([`unparse`]).
//!
//! # Example
//!
//! ```
//! use lama_parser::{parse_source, Node};
//!
//! let ast = parse_source("main.lama", "let x = 1 + 2").unwrap();
//! let root = ast.root().unwrap();
//! assert!(matches!(ast.node(root), Ok(Node::Namespace(_))));
//! ```

pub mod ast;
pub mod diagnostics;
pub mod ident;
pub mod parser;
pub mod printer;
pub mod unparse;

pub use ast::{Ast, Node, NodeId, TreeError};
pub use diagnostics::{DiagnosticSink, Expected, Found, ParseError};
pub use ident::Ident;
pub use parser::{Parser, ParserConfig};

use lama_lexer::Scanner;

/// Parse `text` with the default configuration, discarding diagnostics
/// beyond the returned error.
pub fn parse_source(origin: &str, text: &str) -> Result<Ast, ParseError> {
    let scanner = Scanner::new(origin, text.bytes());
    Parser::new(scanner, ParserConfig::default()).parse(&mut ())
}
