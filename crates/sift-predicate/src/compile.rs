//! AST to predicate compilation.
//!
//! The compiler builds a fresh [`Predicate`] tree bottom-up; the source [`Expr`] is only
//! borrowed and stays reusable. Multi-valued positions are expanded into the full cross
//! product of atomic predicates:
//!
//! - the field group is the outer combinator,
//! - the value group is combined inside each field,
//! - alias expansion of one concrete field is the innermost `Or`.
//!
//! So `equals|or(f1‖f2)|and(v1‖v2)` becomes `Or[And[f1=v1, f1=v2], And[f2=v1, f2=v2]]`.
//! A `not(...)` group means "none of" and compiles to `Not(Or[...])`.

use serde::{Deserialize, Serialize};
use sift_query::{
    BinaryOp, Connective, Expr, FieldUnaryOp, Literal, LogicalOp, Operand, ValueUnaryOp,
};
use tracing::{debug, trace, warn};

use crate::{
    error::CompileError,
    optimize::merge_ranges,
    predicate::{PatternKind, Predicate, RangeKind, TextMode},
    resolver::{FieldAliases, FieldResolver},
};

/// What to do with a field name the resolver does not recognise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownFieldPolicy {
    /// Fail the whole compile with [`CompileError::UnknownField`].
    #[default]
    Reject,
    /// Use the logical name as the only concrete path.
    PassThrough,
}

/// Knobs for a compile run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    /// Handling of unrecognised field names.
    pub unknown_fields: UnknownFieldPolicy,
    /// Whether to join complementary single-bound ranges under an `And`.
    pub merge_ranges: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            unknown_fields: UnknownFieldPolicy::Reject,
            merge_ranges: true,
        }
    }
}

/// Compiles query ASTs against a field resolver.
pub struct Compiler<'r, R: FieldResolver + ?Sized> {
    /// Field name lookup.
    resolver: &'r R,
    /// Compile options.
    options: CompileOptions,
}

impl<'r, R: FieldResolver + ?Sized> Compiler<'r, R> {
    /// Creates a compiler with default options.
    pub fn new(resolver: &'r R) -> Self {
        Self {
            resolver,
            options: CompileOptions::default(),
        }
    }

    /// Replaces the compile options.
    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Compiles one expression.
    ///
    /// Fails only for unknown fields (under [`UnknownFieldPolicy::Reject`]) or for trees
    /// the parser would never produce.
    pub fn compile(&self, expr: &Expr) -> Result<Predicate, CompileError> {
        expr.check_saturated()
            .map_err(|message| CompileError::MalformedAst { message })?;
        let mut predicate = self.compile_expr(expr)?;
        if self.options.merge_ranges {
            predicate = merge_ranges(predicate);
        }
        debug!(
            root = %expr.operator(),
            depth = expr.depth(),
            leaves = predicate.leaf_count(),
            fields = predicate.fields().len(),
            "compiled query"
        );
        Ok(predicate)
    }

    /// Compiles a node and its subtree.
    fn compile_expr(&self, expr: &Expr) -> Result<Predicate, CompileError> {
        match expr {
            Expr::Logical { op, children } => {
                let children = children
                    .iter()
                    .map(|child| self.compile_expr(child))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(match op {
                    LogicalOp::And => Predicate::and(children),
                    LogicalOp::Or => Predicate::or(children),
                })
            }
            Expr::Not(inner) => Ok(Predicate::not(self.compile_expr(inner)?)),
            Expr::FieldUnary { op, field } => distribute(field, &|name: &Literal| {
                let aliases = self.resolve(&name.raw)?;
                let exists = per_alias(&aliases, |path| Predicate::exists(path.to_string()));
                Ok(match op {
                    FieldUnaryOp::Exists => exists,
                    FieldUnaryOp::Missing => Predicate::not(exists),
                })
            }),
            Expr::ValueUnary { op, value } => {
                let mode = match op {
                    ValueUnaryOp::FreeText => TextMode::Terms,
                    ValueUnaryOp::FreeRegexp => TextMode::Regexp,
                };
                distribute(value, &|text: &Literal| {
                    Ok(Predicate::free_text(text.raw.clone(), mode))
                })
            }
            Expr::Binary { op, field, value } => distribute(field, &|name: &Literal| {
                let aliases = self.resolve(&name.raw)?;
                distribute(value, &|literal: &Literal| {
                    Ok(per_alias(&aliases, |path| atom(*op, path, literal)))
                })
            }),
        }
    }

    /// Resolves a logical field name, applying the unknown-field policy.
    fn resolve(&self, field: &str) -> Result<FieldAliases, CompileError> {
        if let Some(aliases) = self.resolver.resolve(field) {
            trace!(field, aliases = aliases.count(), "resolved field");
            return Ok(aliases);
        }
        match self.options.unknown_fields {
            UnknownFieldPolicy::Reject => Err(CompileError::UnknownField {
                name: field.to_string(),
            }),
            UnknownFieldPolicy::PassThrough => {
                warn!(field, "passing unknown field through unresolved");
                Ok(FieldAliases::single(field))
            }
        }
    }
}

/// Compiles `expr` against `resolver` with default options.
pub fn compile<R: FieldResolver + ?Sized>(
    expr: &Expr,
    resolver: &R,
) -> Result<Predicate, CompileError> {
    Compiler::new(resolver).compile(expr)
}

/// Expands an operand position, building one predicate per literal and combining them
/// with each group's connective.
fn distribute<F>(operand: &Operand, leaf: &F) -> Result<Predicate, CompileError>
where
    F: Fn(&Literal) -> Result<Predicate, CompileError>,
{
    match operand {
        Operand::Literal(literal) => leaf(literal),
        Operand::Group(group) => {
            let items = group
                .items
                .iter()
                .map(|item| distribute(item, leaf))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(match group.connective {
                Connective::And => Predicate::and(items),
                Connective::Or => Predicate::or(items),
                Connective::Not => Predicate::not(Predicate::or(items)),
            })
        }
    }
}

/// Builds one predicate per concrete path, joined by `Or` when there are several.
fn per_alias(aliases: &FieldAliases, build: impl Fn(&str) -> Predicate) -> Predicate {
    Predicate::or(aliases.iter().map(build).collect())
}

/// The atomic predicate for a binary operator against one concrete path.
fn atom(op: BinaryOp, path: &str, value: &Literal) -> Predicate {
    if let Some(kind) = RangeKind::from_operator(op) {
        Predicate::range(path, kind, value.value.clone())
    } else if let Some(kind) = PatternKind::from_operator(op) {
        Predicate::pattern(path, kind, value.raw.clone())
    } else {
        Predicate::eq(path, value.value.clone())
    }
}
