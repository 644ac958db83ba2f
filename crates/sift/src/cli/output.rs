//! Rendering and JSON serialization for CLI output.

use std::{fmt::Display, process::ExitCode};

use serde::Serialize;
use sift_query::{Token, TokenKind};

/// JSON output for one token.
#[derive(Serialize)]
struct JsonToken<'a> {
    /// Token class.
    kind: &'static str,
    /// Source text of the token.
    text: &'a str,
    /// Byte offset of the first character.
    start: usize,
    /// Byte offset just past the last character.
    end: usize,
}

/// Short class name for a token.
fn kind_name(kind: &TokenKind) -> &'static str {
    match kind {
        TokenKind::Operator(_) => "operator",
        TokenKind::Literal(literal) if literal.quoted => "quoted",
        TokenKind::Literal(_) => "literal",
        TokenKind::LParen => "lparen",
        TokenKind::RParen => "rparen",
        TokenKind::GroupSep => "group-sep",
        TokenKind::FieldSep => "field-sep",
    }
}

/// Prints one token per line as `start..end kind text`.
pub fn print_tokens(query: &str, tokens: &[Token]) {
    for token in tokens {
        let span = format!("{}..{}", token.span.start, token.span.end);
        println!(
            "{span:<9} {:<10} {}",
            kind_name(&token.kind),
            token.text(query)
        );
    }
}

/// Prints tokens as a JSON array.
pub fn print_tokens_json(query: &str, tokens: &[Token]) -> ExitCode {
    let tokens: Vec<JsonToken<'_>> = tokens
        .iter()
        .map(|token| JsonToken {
            kind: kind_name(&token.kind),
            text: token.text(query),
            start: token.span.start,
            end: token.span.end,
        })
        .collect();
    print_json(&tokens)
}

/// Prints any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to serialize output: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Reports an error on stderr and returns the failure code.
pub fn fail(err: &dyn Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}
