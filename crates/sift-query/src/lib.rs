//! Tokenizer, AST and parser for the sift record query language.
//!
//! A query is a single prefix expression:
//!
//! - **Logical**: `and(e‖e‖…)`, `or(e‖e‖…)` - one or more child expressions
//! - **Negation**: `not(e)` - exactly one child expression
//! - **Field tests**: `exists|field`, `missing|field`
//! - **Free text**: `freetext|value`, `freergxp|value`
//! - **Comparisons**: `equals|field|value`, `contains`, `startswith`, `endswith`,
//!   `regexp`, `gt`, `gte`, `lt`, `lte`
//! - **Groups**: `or(a‖b)`, `and(a‖b)`, `not(a‖b)` in place of a single field or value
//!
//! `‖` may also be written `,`. Unquoted literals are typed as integers, decimals or
//! strings by shape; `"quoted"` literals are always strings.
//!
//! # Example
//!
//! ```
//! use sift_query::{Expr, parse};
//!
//! let expr = parse("and(exists|pos‖equals|or(f1‖f2)|\"nn\")").unwrap();
//! assert!(matches!(expr, Expr::Logical { .. }));
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod limits;
mod parser;
mod value;

pub use ast::{
    Arity, BinaryOp, Connective, Expr, FIELD_SEPARATOR, FieldUnaryOp, GROUP_SEPARATOR, Group,
    Literal, LogicalOp, Operand, Operator, OperatorKind, ValueUnaryOp,
};
pub use error::{SyntaxError, SyntaxErrorKind};
pub use lexer::{Span, Token, TokenKind, tokenize, tokenize_with_limits};
pub use limits::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_TOKENS, ParseLimits};
pub use parser::{parse, parse_with_limits};
pub use value::Value;
