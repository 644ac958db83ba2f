//! Syntax errors for query tokenizing and parsing.
//!
//! Every failure carries the offending fragment and its byte position so callers can
//! surface the message verbatim to the person who wrote the query.

use std::{error::Error, fmt};

/// The category of a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// The query contains no tokens.
    EmptyQuery,
    /// An expression starts with a word that is not in the operator catalog.
    UnknownOperator,
    /// A double-quoted literal is never closed.
    UnterminatedQuote,
    /// A token appears where the grammar does not allow it.
    UnexpectedToken,
    /// The query ends while an expression or group is still open.
    UnexpectedEnd,
    /// An operator received more or fewer operands than it declares.
    Arity,
    /// A group of plain values appears where an expression is required.
    MisplacedGroup,
    /// The query exceeds the configured nesting depth or token count.
    LimitExceeded,
}

/// A query syntax error with position information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// What went wrong.
    pub kind: SyntaxErrorKind,
    /// Human-readable description.
    pub message: String,
    /// The offending fragment of the query.
    pub snippet: String,
    /// Byte position of the fragment in the query.
    pub position: usize,
    /// The full query text.
    pub query: String,
}

impl SyntaxError {
    /// Creates a syntax error pointing at `query[position..position + snippet.len()]`.
    pub fn new(
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        snippet: impl Into<String>,
        position: usize,
        query: &str,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            snippet: snippet.into(),
            position,
            query: query.to_string(),
        }
    }

    /// Returns a suggestion for common mistakes.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind {
            SyntaxErrorKind::UnterminatedQuote => {
                Some("Add a closing quote (\") to complete the literal")
            }
            SyntaxErrorKind::UnknownOperator => Some(
                "Expressions start with and, or, not, exists, missing, freetext, freergxp, \
                 equals, contains, startswith, endswith, regexp, gt, gte, lt or lte",
            ),
            SyntaxErrorKind::Arity if self.message.contains("'not'") => {
                Some("Wrap several expressions in and(...) or or(...) before negating them")
            }
            SyntaxErrorKind::MisplacedGroup => {
                Some("Groups like or(a‖b) may only replace a field or a value, e.g. equals|f|or(a‖b)")
            }
            _ => None,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "query syntax error: {}", self.message)?;
        writeln!(f, "  {}", self.query)?;

        // Caret columns count characters, not bytes, so multi-byte separators line up.
        let clamped = self.position.min(self.query.len());
        let column = self
            .query
            .get(..clamped)
            .map_or(clamped, |prefix| prefix.chars().count());
        write!(f, "  {}^", " ".repeat(column))?;

        if let Some(suggestion) = self.suggestion() {
            write!(f, "\nhint: {}", suggestion)?;
        }

        Ok(())
    }
}

impl Error for SyntaxError {}
