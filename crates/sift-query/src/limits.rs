//! Hard ceilings on query size.

/// Default maximum nesting depth of parenthesised nodes.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default maximum number of tokens in one query.
pub const DEFAULT_MAX_TOKENS: usize = 4096;

/// Bounds applied while tokenizing and parsing.
///
/// Exceeding either limit is a syntax error rather than unbounded recursion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    /// Maximum nesting of `(`: logical nodes, negations and groups all count.
    pub max_depth: usize,
    /// Maximum number of tokens.
    pub max_tokens: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}
