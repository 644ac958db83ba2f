//! Query lexer (tokenizer).
//!
//! Converts a query string into a stream of typed tokens. The two separators are
//! distinct token kinds from the start: `‖` (or its ASCII spelling `,`) separates the
//! children of a group, `|` separates an operator from its field and value.

use std::{iter::Peekable, str::CharIndices};

use crate::{
    ast::{Literal, Operator},
    error::{SyntaxError, SyntaxErrorKind},
    limits::ParseLimits,
};

/// Byte range of a token in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl Span {
    /// Creates a span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A word from the operator catalog.
    Operator(Operator),
    /// A typed literal (bare word or quoted string).
    Literal(Literal),
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `‖` or `,`: separates the children of a group.
    GroupSep,
    /// `|`: separates an operator from its operands.
    FieldSep,
}

impl TokenKind {
    /// Describes the token for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Operator(op) => format!("operator '{op}'"),
            Self::Literal(literal) => format!("literal {literal}"),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
            Self::GroupSep => "group separator '‖'".to_string(),
            Self::FieldSep => "field separator '|'".to_string(),
        }
    }
}

/// A token and its position.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was read.
    pub kind: TokenKind,
    /// Where it was read.
    pub span: Span,
}

impl Token {
    /// The raw text of this token in `input`.
    pub fn text<'a>(&self, input: &'a str) -> &'a str {
        input.get(self.span.start..self.span.end).unwrap_or_default()
    }
}

/// Characters that end a bare word.
fn is_delimiter(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '(' | ')' | '|' | '‖' | ',' | '"')
}

/// Tokenizes a query string.
struct Lexer<'a> {
    /// The original input string.
    input: &'a str,
    /// Character iterator with one-character lookahead.
    chars: Peekable<CharIndices<'a>>,
    /// Maximum number of tokens to produce.
    max_tokens: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    fn new(input: &'a str, limits: &ParseLimits) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            max_tokens: limits.max_tokens,
        }
    }

    /// Creates an error at a specific position.
    fn error_at(
        &self,
        kind: SyntaxErrorKind,
        message: impl Into<String>,
        span: Span,
    ) -> SyntaxError {
        let snippet = self.input.get(span.start..span.end).unwrap_or_default();
        SyntaxError::new(kind, message, snippet, span.start, self.input)
    }

    /// Tokenizes the entire input, returning all tokens or an error.
    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        let mut tokens = Vec::new();

        while let Some(token) = self.next_token()? {
            if tokens.len() == self.max_tokens {
                return Err(self.error_at(
                    SyntaxErrorKind::LimitExceeded,
                    format!("query has more than {} tokens", self.max_tokens),
                    token.span,
                ));
            }
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Returns the next token, or None if at end of input.
    fn next_token(&mut self) -> Result<Option<Token>, SyntaxError> {
        self.skip_whitespace();

        let Some(&(start, ch)) = self.chars.peek() else {
            return Ok(None);
        };

        let kind = match ch {
            '"' => return self.read_quoted(start).map(Some),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '|' => TokenKind::FieldSep,
            '‖' | ',' => TokenKind::GroupSep,
            _ => return Ok(Some(self.read_word(start))),
        };
        self.chars.next();

        Ok(Some(Token {
            kind,
            span: Span::new(start, start + ch.len_utf8()),
        }))
    }

    /// Reads a double-quoted literal, honouring `\"` and `\\` escapes.
    fn read_quoted(&mut self, start: usize) -> Result<Token, SyntaxError> {
        self.chars.next(); // consume opening quote

        let mut content = String::new();

        loop {
            match self.chars.next() {
                Some((end, '"')) => {
                    return Ok(Token {
                        kind: TokenKind::Literal(Literal::quoted(content)),
                        span: Span::new(start, end + 1),
                    });
                }
                Some((_, '\\')) => match self.chars.peek() {
                    Some(&(_, escaped @ ('"' | '\\'))) => {
                        content.push(escaped);
                        self.chars.next();
                    }
                    // Other backslashes are kept verbatim so regexps survive unescaped.
                    _ => content.push('\\'),
                },
                Some((_, ch)) => content.push(ch),
                None => {
                    return Err(self.error_at(
                        SyntaxErrorKind::UnterminatedQuote,
                        "unterminated quoted literal",
                        Span::new(start, self.input.len()),
                    ));
                }
            }
        }
    }

    /// Reads a bare word: an operator keyword or an unquoted literal.
    fn read_word(&mut self, start: usize) -> Token {
        let mut end = start;
        while let Some(&(pos, ch)) = self.chars.peek() {
            if is_delimiter(ch) {
                break;
            }
            end = pos + ch.len_utf8();
            self.chars.next();
        }

        let word = &self.input[start..end];
        let kind = match Operator::from_name(word) {
            Some(op) => TokenKind::Operator(op),
            None => TokenKind::Literal(Literal::bare(word)),
        };

        Token {
            kind,
            span: Span::new(start, end),
        }
    }

    /// Skips whitespace characters.
    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|&(_, ch)| ch.is_whitespace()).is_some() {}
    }
}

/// Tokenizes a query string with the default limits.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SyntaxError> {
    tokenize_with_limits(input, &ParseLimits::default())
}

/// Tokenizes a query string, failing once it exceeds `limits.max_tokens`.
pub fn tokenize_with_limits(input: &str, limits: &ParseLimits) -> Result<Vec<Token>, SyntaxError> {
    Lexer::new(input, limits).tokenize()
}
