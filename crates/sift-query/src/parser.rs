//! Query parser.
//!
//! Parses a token stream into a query AST using recursive descent.
//!
//! # Grammar
//!
//! ```text
//! query     → expr
//! expr      → logical | negation | operation
//! logical   → ("and" | "or") "(" expr ("‖" expr)* ")"
//! negation  → "not" "(" expr ")"
//! operation → OPERATOR ("|" operand)*          ; count checked against the operator's arity
//! operand   → group | LITERAL | OPERATOR       ; a keyword not followed by "(" is a literal
//! group     → ("and" | "or" | "not") "(" operand ("‖" operand)* ")"
//! ```
//!
//! `‖` only ever separates the children of a parenthesised node and `|` only ever
//! introduces an operand, so the two never compete for the same position.

use std::{iter::Peekable, vec};

use tracing::trace;

use crate::{
    ast::{Connective, Expr, Literal, LogicalOp, Operand, Operator, OperatorKind},
    error::{SyntaxError, SyntaxErrorKind},
    lexer::{Span, Token, TokenKind, tokenize_with_limits},
    limits::ParseLimits,
};

/// Recursive descent parser for query expressions.
struct Parser<'a> {
    /// The original input string.
    input: &'a str,
    /// Token stream to parse.
    tokens: Peekable<vec::IntoIter<Token>>,
    /// Span of the most recently consumed token.
    last: Span,
    /// Current nesting depth of open parentheses.
    depth: usize,
    /// Maximum nesting depth.
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Creates a new parser from a token stream.
    fn new(input: &'a str, tokens: Vec<Token>, limits: &ParseLimits) -> Self {
        Self {
            input,
            tokens: tokens.into_iter().peekable(),
            last: Span::new(0, 0),
            depth: 0,
            max_depth: limits.max_depth,
        }
    }

    /// Parses the token stream into a single rooted expression.
    fn parse(mut self) -> Result<Expr, SyntaxError> {
        if self.tokens.peek().is_none() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::EmptyQuery,
                "empty query",
                self.input,
                0,
                self.input,
            ));
        }

        let expr = self.parse_expr(None)?;

        if let Some(token) = self.tokens.next() {
            return Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!(
                    "unexpected {} after the end of the expression",
                    token.kind.describe()
                ),
                token.span,
            ));
        }

        expr.check_saturated().map_err(|message| {
            SyntaxError::new(SyntaxErrorKind::Arity, message, self.input, 0, self.input)
        })?;

        Ok(expr)
    }

    /// Parses: expr → logical | negation | operation
    ///
    /// `parent` is the enclosing combinator, used to explain misplaced value groups.
    fn parse_expr(&mut self, parent: Option<Operator>) -> Result<Expr, SyntaxError> {
        let token = self.expect("an expression")?;

        match token.kind {
            TokenKind::Operator(op) => match op.kind() {
                OperatorKind::Logical(logical) => self.parse_logical(logical, token.span),
                OperatorKind::Not => self.parse_negation(token.span),
                _ => self.parse_operation(op, token.span),
            },
            TokenKind::Literal(literal) => Err(self.literal_at_head(&literal, token.span, parent)),
            other => Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!("expected an expression, found {}", other.describe()),
                token.span,
            )),
        }
    }

    /// Explains why a literal cannot start an expression.
    fn literal_at_head(
        &mut self,
        literal: &Literal,
        span: Span,
        parent: Option<Operator>,
    ) -> SyntaxError {
        let followed_by_operand = self.peek_is(&TokenKind::FieldSep);

        if !literal.quoted && (followed_by_operand || parent.is_none()) {
            return self.error_at(
                SyntaxErrorKind::UnknownOperator,
                format!("unknown operator '{}'", literal.raw),
                span,
            );
        }

        match parent {
            Some(op) => self.error_at(
                SyntaxErrorKind::MisplacedGroup,
                format!(
                    "'{op}(...)' holds expressions, found {}; plain values can only be grouped \
                     in a field or value position",
                    TokenKind::Literal(literal.clone()).describe()
                ),
                span,
            ),
            None => self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!(
                    "expected an operator, found {}",
                    TokenKind::Literal(literal.clone()).describe()
                ),
                span,
            ),
        }
    }

    /// Parses: logical → ("and" | "or") "(" expr ("‖" expr)* ")"
    fn parse_logical(&mut self, op: LogicalOp, head: Span) -> Result<Expr, SyntaxError> {
        let keyword = op.operator();
        self.open(keyword)?;

        if self.peek_is(&TokenKind::RParen) {
            self.bump();
            return Err(self.arity_error(keyword, 0, head));
        }

        let mut children = vec![self.parse_expr(Some(keyword))?];
        while self.eat(&TokenKind::GroupSep) {
            children.push(self.parse_expr(Some(keyword))?);
        }

        self.close(keyword, head)?;
        Ok(Expr::Logical { op, children })
    }

    /// Parses: negation → "not" "(" expr ")"
    fn parse_negation(&mut self, head: Span) -> Result<Expr, SyntaxError> {
        self.open(Operator::Not)?;

        if self.peek_is(&TokenKind::RParen) {
            self.bump();
            return Err(self.arity_error(Operator::Not, 0, head));
        }

        let inner = self.parse_expr(Some(Operator::Not))?;

        if self.peek_is(&TokenKind::GroupSep) {
            // Consume the remaining children so the error can name the whole node.
            let mut count = 1;
            while self.eat(&TokenKind::GroupSep) {
                self.parse_expr(Some(Operator::Not))?;
                count += 1;
            }
            self.eat(&TokenKind::RParen);
            return Err(self.arity_error(Operator::Not, count, head));
        }

        self.close(Operator::Not, head)?;
        Ok(Expr::negate(inner))
    }

    /// Parses: operation → OPERATOR ("|" operand)*
    ///
    /// All `|`-introduced operands are collected first, then their count is checked
    /// against the operator's arity, so both missing and surplus operands are reported.
    fn parse_operation(&mut self, op: Operator, head: Span) -> Result<Expr, SyntaxError> {
        let mut operands = Vec::new();
        while self.eat(&TokenKind::FieldSep) {
            operands.push(self.parse_operand()?);
        }

        if self.peek_is(&TokenKind::LParen) {
            let span = self.peek_span();
            return Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!("'{op}' takes '|'-separated operands, not a parenthesised list"),
                span,
            ));
        }

        let count = operands.len();
        let mut operands = operands.into_iter();
        match (op.kind(), operands.next(), operands.next(), operands.next()) {
            (OperatorKind::FieldUnary(op), Some(field), None, None) => {
                Ok(Expr::FieldUnary { op, field })
            }
            (OperatorKind::ValueUnary(op), Some(value), None, None) => {
                Ok(Expr::ValueUnary { op, value })
            }
            (OperatorKind::Binary(op), Some(field), Some(value), None) => {
                Ok(Expr::Binary { op, field, value })
            }
            _ => Err(self.arity_error(op, count, head)),
        }
    }

    /// Parses: operand → group | LITERAL | OPERATOR
    fn parse_operand(&mut self) -> Result<Operand, SyntaxError> {
        let token = self.expect("a field or value")?;

        match token.kind {
            TokenKind::Literal(literal) => Ok(Operand::Literal(literal)),
            TokenKind::Operator(op) => match op.connective() {
                Some(connective) if self.peek_is(&TokenKind::LParen) => {
                    self.parse_group(connective, token.span)
                }
                // A keyword used as a plain name, e.g. a field called "exists".
                _ => Ok(Operand::Literal(Literal::bare(self.slice(token.span)))),
            },
            other => Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!("expected a field or value, found {}", other.describe()),
                token.span,
            )),
        }
    }

    /// Parses: group → ("and" | "or" | "not") "(" operand ("‖" operand)* ")"
    fn parse_group(&mut self, connective: Connective, head: Span) -> Result<Operand, SyntaxError> {
        let keyword = connective.operator();
        self.open(keyword)?;

        if self.peek_is(&TokenKind::RParen) {
            self.bump();
            return Err(self.error_at(
                SyntaxErrorKind::Arity,
                format!("'{keyword}' group takes at least 1 item, found 0"),
                Span::new(head.start, self.last.end),
            ));
        }

        let mut items = vec![self.parse_operand()?];
        while self.eat(&TokenKind::GroupSep) {
            items.push(self.parse_operand()?);
        }

        self.close(keyword, head)?;
        Ok(Operand::group(connective, items))
    }

    /// Consumes the `(` after a keyword and enters one nesting level.
    fn open(&mut self, keyword: Operator) -> Result<(), SyntaxError> {
        let token = self.expect(&format!("'(' after '{keyword}'"))?;
        if token.kind != TokenKind::LParen {
            return Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!(
                    "'{keyword}' must be followed by '(', found {}",
                    token.kind.describe()
                ),
                token.span,
            ));
        }

        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error_at(
                SyntaxErrorKind::LimitExceeded,
                format!("nesting exceeds the maximum depth of {}", self.max_depth),
                token.span,
            ));
        }
        Ok(())
    }

    /// Consumes the `)` closing the node opened at `head` and leaves one nesting level.
    fn close(&mut self, keyword: Operator, head: Span) -> Result<(), SyntaxError> {
        match self.bump() {
            Some(token) if token.kind == TokenKind::RParen => {
                self.depth -= 1;
                Ok(())
            }
            Some(token) => Err(self.error_at(
                SyntaxErrorKind::UnexpectedToken,
                format!(
                    "expected '‖' or ')' to continue '{keyword}(...)', found {}",
                    token.kind.describe()
                ),
                token.span,
            )),
            None => Err(self.error_at(
                SyntaxErrorKind::UnexpectedEnd,
                format!("unclosed '{keyword}(': expected ')'"),
                Span::new(head.start, self.input.len()),
            )),
        }
    }

    /// Builds an arity error covering the node from `head` to the last consumed token.
    fn arity_error(&self, op: Operator, found: usize, head: Span) -> SyntaxError {
        self.error_at(
            SyntaxErrorKind::Arity,
            format!(
                "'{op}' takes {} {}, found {found}",
                op.arity(),
                op.operand_names()
            ),
            Span::new(head.start, self.last.end.max(head.end)),
        )
    }

    /// Consumes the next token, failing at end of input.
    fn expect(&mut self, expected: &str) -> Result<Token, SyntaxError> {
        match self.bump() {
            Some(token) => Ok(token),
            None => Err(self.error_at(
                SyntaxErrorKind::UnexpectedEnd,
                format!("unexpected end of query: expected {expected}"),
                Span::new(self.last.start, self.input.len()),
            )),
        }
    }

    /// Creates an error for the given span of the input.
    fn error_at(&self, kind: SyntaxErrorKind, message: impl Into<String>, span: Span) -> SyntaxError {
        SyntaxError::new(kind, message, self.slice(span), span.start, self.input)
    }

    /// Returns the input text under `span`.
    fn slice(&self, span: Span) -> &'a str {
        self.input.get(span.start..span.end).unwrap_or_default()
    }

    /// Returns the span of the next token, or an empty span at end of input.
    fn peek_span(&mut self) -> Span {
        let end = self.input.len();
        self.tokens
            .peek()
            .map_or(Span::new(end, end), |token| token.span)
    }

    /// Checks if the next token has the given kind.
    fn peek_is(&mut self, kind: &TokenKind) -> bool {
        self.tokens.peek().is_some_and(|token| &token.kind == kind)
    }

    /// Consumes the next token if it has the given kind.
    fn eat(&mut self, kind: &TokenKind) -> bool {
        match self.tokens.next_if(|token| &token.kind == kind) {
            Some(token) => {
                self.last = token.span;
                true
            }
            None => false,
        }
    }

    /// Consumes the next token.
    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.last = token.span;
        Some(token)
    }
}

/// Parses a query string into an AST using the default limits.
pub fn parse(input: &str) -> Result<Expr, SyntaxError> {
    parse_with_limits(input, &ParseLimits::default())
}

/// Parses a query string into an AST, enforcing `limits`.
///
/// Pure function: every call owns its token stream and tree.
pub fn parse_with_limits(input: &str, limits: &ParseLimits) -> Result<Expr, SyntaxError> {
    let tokens = tokenize_with_limits(input, limits)?;
    trace!(tokens = tokens.len(), "tokenized query");
    Parser::new(input, tokens, limits).parse()
}
