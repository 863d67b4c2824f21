use clap::{Parser, Subcommand};
use lama_lexer::{Scanner, TokenKind, TokenValue};
use lama_parser::{printer, unparse, Ast, ParseError, ParserConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "lama")]
#[command(about = "lama front end: tokenize, parse and pretty-print .lama sources")]
#[command(version)]
struct Cli {
    /// Abort parsing once more than this many grammar rules are nested
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    /// Log parser activity to stderr (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream, one token per line
    Tokens {
        /// Input .lama file
        path: String,
    },

    /// Print the syntax tree
    Tree {
        /// Input .lama file
        path: String,
    },

    /// Check a .lama file for syntax errors
    Check {
        /// Input .lama file
        path: String,
    },

    /// Print the file as normalized source
    Fmt {
        /// Input .lama file
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = ParserConfig::new();
    if let Some(limit) = cli.max_depth {
        config = config.max_depth(limit);
    }

    match cli.command {
        Command::Tokens { path } => cmd_tokens(&path),
        Command::Tree { path } => cmd_tree(&path, config),
        Command::Check { path } => cmd_check(&path, config),
        Command::Fmt { path } => cmd_fmt(&path, config),
    }
}

/// `RUST_LOG` wins; otherwise `-v` picks the level, defaulting to warnings.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .try_init();
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse or exit with the diagnostic on stderr.
fn parse(path: &str, config: ParserConfig) -> Ast {
    let source = read_source(path);
    let scanner = Scanner::new(path, source.bytes());
    let mut diagnostics: Vec<ParseError> = Vec::new();

    match lama_parser::Parser::new(scanner, config).parse(&mut diagnostics) {
        Ok(ast) => ast,
        Err(_) => {
            for diagnostic in &diagnostics {
                eprintln!("{diagnostic}");
            }
            std::process::exit(1);
        }
    }
}

fn cmd_tokens(path: &str) {
    let source = read_source(path);
    let mut scanner = Scanner::new(path, source.bytes());
    let mut failed = false;

    loop {
        let token = scanner.advance();
        let payload = match &token.value {
            TokenValue::None => String::new(),
            TokenValue::Literal(literal) => format!(" {literal}"),
            TokenValue::Error(err) => {
                failed = true;
                format!(" ({err})")
            }
        };
        println!("{:>4}  {}{payload}", token.line, token.kind);
        if token.kind == TokenKind::Eof {
            break;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

fn cmd_tree(path: &str, config: ParserConfig) {
    let ast = parse(path, config);
    match printer::dump(&ast) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("Internal error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_check(path: &str, config: ParserConfig) {
    let ast = parse(path, config);
    tracing::info!(nodes = ast.len(), "syntax ok");
    eprintln!("OK: {path}");
}

fn cmd_fmt(path: &str, config: ParserConfig) {
    let ast = parse(path, config);
    match unparse::to_source(&ast) {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("Internal error: {e}");
            std::process::exit(1);
        }
    }
}
