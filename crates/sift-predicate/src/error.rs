//! Error types for predicate compilation.

use sift_query::{SyntaxError, SyntaxErrorKind};
use thiserror::Error;

/// Errors raised while compiling an AST into a predicate tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The field resolver does not recognise a logical field name.
    #[error("unknown field: {name}")]
    UnknownField {
        /// The unrecognised field name.
        name: String,
    },

    /// The AST violates an arity invariant the parser enforces.
    #[error("malformed query tree: {message}")]
    MalformedAst {
        /// What is wrong with the tree.
        message: String,
    },
}

/// Errors from [`parse_and_compile`](crate::parse_and_compile).
///
/// Both variants are terminal: the query text must be corrected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The query text is malformed.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A field name could not be resolved.
    #[error("unknown field: {name}")]
    UnknownField {
        /// The unrecognised field name.
        name: String,
    },
}

impl EngineError {
    /// The error message without context.
    pub fn message(&self) -> String {
        match self {
            Self::Syntax(err) => err.message.clone(),
            Self::UnknownField { name } => format!("unknown field: {name}"),
        }
    }

    /// The offending fragment of the query.
    pub fn snippet(&self) -> &str {
        match self {
            Self::Syntax(err) => &err.snippet,
            Self::UnknownField { name } => name,
        }
    }
}

impl From<CompileError> for EngineError {
    fn from(err: CompileError) -> Self {
        match err {
            CompileError::UnknownField { name } => Self::UnknownField { name },
            // Only reachable for hand-built trees; report it as the arity violation it is.
            CompileError::MalformedAst { message } => Self::Syntax(SyntaxError::new(
                SyntaxErrorKind::Arity,
                message,
                "",
                0,
                "",
            )),
        }
    }
}
