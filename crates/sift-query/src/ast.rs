//! Query abstract syntax tree.
//!
//! The node catalog is closed: every operator the language knows is listed in
//! [`Operator`], and each operator maps onto exactly one [`Expr`] shape whose arity is
//! fixed by its fields. Only the n-ary kinds (logical combinators and groups) can be
//! unsaturated, which [`Expr::check_saturated`] verifies.

use std::fmt;

use crate::value::Value;

/// Canonical group separator used when rendering queries.
pub const GROUP_SEPARATOR: char = '‖';

/// Canonical field/value separator.
pub const FIELD_SEPARATOR: char = '|';

/// Every operator keyword in the query language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `and(e‖e‖…)`, or an AND-group in a field/value position.
    And,
    /// `or(e‖e‖…)`, or an OR-group in a field/value position.
    Or,
    /// `not(e)`, or a NOT-group ("none of") in a field/value position.
    Not,
    /// `freetext|value`
    FreeText,
    /// `freergxp|value`
    FreeRegexp,
    /// `exists|field`
    Exists,
    /// `missing|field`
    Missing,
    /// `equals|field|value`
    Equals,
    /// `contains|field|value`
    Contains,
    /// `startswith|field|value`
    StartsWith,
    /// `endswith|field|value`
    EndsWith,
    /// `regexp|field|value`
    Regexp,
    /// `gt|field|value`
    Gt,
    /// `gte|field|value`
    Gte,
    /// `lt|field|value`
    Lt,
    /// `lte|field|value`
    Lte,
}

/// Number of operands an operator declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// One or more children.
    AtLeastOne,
    /// Exactly this many operands.
    Exactly(usize),
}

impl Arity {
    /// Returns true if `count` operands satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::AtLeastOne => count >= 1,
            Self::Exactly(n) => count == n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AtLeastOne => write!(f, "at least 1"),
            Self::Exactly(n) => write!(f, "exactly {n}"),
        }
    }
}

/// The structural role an operator plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// n-ary combinator over expressions.
    Logical(LogicalOp),
    /// Negation of a single expression.
    Not,
    /// Operator taking a single field.
    FieldUnary(FieldUnaryOp),
    /// Operator taking a single value.
    ValueUnary(ValueUnaryOp),
    /// Operator taking a field and a value.
    Binary(BinaryOp),
}

impl Operator {
    /// All operators, in catalog order.
    pub const ALL: [Self; 16] = [
        Self::And,
        Self::Or,
        Self::Not,
        Self::FreeText,
        Self::FreeRegexp,
        Self::Exists,
        Self::Missing,
        Self::Equals,
        Self::Contains,
        Self::StartsWith,
        Self::EndsWith,
        Self::Regexp,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
    ];

    /// Looks up an operator by keyword (ASCII case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    /// The canonical keyword.
    pub fn name(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::FreeText => "freetext",
            Self::FreeRegexp => "freergxp",
            Self::Exists => "exists",
            Self::Missing => "missing",
            Self::Equals => "equals",
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Regexp => "regexp",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }

    /// The structural role of this operator at the head of an expression.
    pub fn kind(self) -> OperatorKind {
        match self {
            Self::And => OperatorKind::Logical(LogicalOp::And),
            Self::Or => OperatorKind::Logical(LogicalOp::Or),
            Self::Not => OperatorKind::Not,
            Self::FreeText => OperatorKind::ValueUnary(ValueUnaryOp::FreeText),
            Self::FreeRegexp => OperatorKind::ValueUnary(ValueUnaryOp::FreeRegexp),
            Self::Exists => OperatorKind::FieldUnary(FieldUnaryOp::Exists),
            Self::Missing => OperatorKind::FieldUnary(FieldUnaryOp::Missing),
            Self::Equals => OperatorKind::Binary(BinaryOp::Equals),
            Self::Contains => OperatorKind::Binary(BinaryOp::Contains),
            Self::StartsWith => OperatorKind::Binary(BinaryOp::StartsWith),
            Self::EndsWith => OperatorKind::Binary(BinaryOp::EndsWith),
            Self::Regexp => OperatorKind::Binary(BinaryOp::Regexp),
            Self::Gt => OperatorKind::Binary(BinaryOp::Gt),
            Self::Gte => OperatorKind::Binary(BinaryOp::Gte),
            Self::Lt => OperatorKind::Binary(BinaryOp::Lt),
            Self::Lte => OperatorKind::Binary(BinaryOp::Lte),
        }
    }

    /// The declared operand count at the head of an expression.
    pub fn arity(self) -> Arity {
        match self.kind() {
            OperatorKind::Logical(_) => Arity::AtLeastOne,
            OperatorKind::Not | OperatorKind::FieldUnary(_) | OperatorKind::ValueUnary(_) => {
                Arity::Exactly(1)
            }
            OperatorKind::Binary(_) => Arity::Exactly(2),
        }
    }

    /// The group connective this keyword denotes in a field or value position.
    pub fn connective(self) -> Option<Connective> {
        match self {
            Self::And => Some(Connective::And),
            Self::Or => Some(Connective::Or),
            Self::Not => Some(Connective::Not),
            _ => None,
        }
    }

    /// Describes the expected operands, for error messages.
    pub fn operand_names(self) -> &'static str {
        match self.kind() {
            OperatorKind::Logical(_) | OperatorKind::Not => "expression",
            OperatorKind::FieldUnary(_) => "operand (field)",
            OperatorKind::ValueUnary(_) => "operand (value)",
            OperatorKind::Binary(_) => "operands (field|value)",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// n-ary logical combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    /// All children must match.
    And,
    /// At least one child must match.
    Or,
}

/// Operators over a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldUnaryOp {
    /// The field has a value.
    Exists,
    /// The field has no value.
    Missing,
}

/// Operators over a single value, matched across all text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueUnaryOp {
    /// Free-text term search.
    FreeText,
    /// Regular expression over all text.
    FreeRegexp,
}

/// Operators over a field and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Exact equality.
    Equals,
    /// Substring match.
    Contains,
    /// Prefix match.
    StartsWith,
    /// Suffix match.
    EndsWith,
    /// Regular expression match.
    Regexp,
    /// Strictly greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Strictly less than.
    Lt,
    /// Less than or equal.
    Lte,
}

impl LogicalOp {
    /// The keyword for this combinator.
    pub fn operator(self) -> Operator {
        match self {
            Self::And => Operator::And,
            Self::Or => Operator::Or,
        }
    }
}

impl FieldUnaryOp {
    /// The keyword for this operator.
    pub fn operator(self) -> Operator {
        match self {
            Self::Exists => Operator::Exists,
            Self::Missing => Operator::Missing,
        }
    }
}

impl ValueUnaryOp {
    /// The keyword for this operator.
    pub fn operator(self) -> Operator {
        match self {
            Self::FreeText => Operator::FreeText,
            Self::FreeRegexp => Operator::FreeRegexp,
        }
    }
}

impl BinaryOp {
    /// The keyword for this operator.
    pub fn operator(self) -> Operator {
        match self {
            Self::Equals => Operator::Equals,
            Self::Contains => Operator::Contains,
            Self::StartsWith => Operator::StartsWith,
            Self::EndsWith => Operator::EndsWith,
            Self::Regexp => Operator::Regexp,
            Self::Gt => Operator::Gt,
            Self::Gte => Operator::Gte,
            Self::Lt => Operator::Lt,
            Self::Lte => Operator::Lte,
        }
    }
}

/// How the items of a group combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Connective {
    /// Every item must match.
    And,
    /// Any item may match.
    Or,
    /// None of the items may match.
    Not,
}

impl Connective {
    /// The keyword for this connective.
    pub fn operator(self) -> Operator {
        match self {
            Self::And => Operator::And,
            Self::Or => Operator::Or,
            Self::Not => Operator::Not,
        }
    }
}

/// A literal leaf: its text as written plus its typed value.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Text as written, with quotes and escapes removed.
    pub raw: String,
    /// Typed value.
    pub value: Value,
    /// Whether the literal was double-quoted.
    pub quoted: bool,
}

impl Literal {
    /// Creates an unquoted literal, typed by shape.
    pub fn bare(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            value: Value::classify(&raw),
            raw,
            quoted: false,
        }
    }

    /// Creates a quoted literal, always typed as a string.
    pub fn quoted(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        Self {
            value: Value::String(raw.clone()),
            raw,
            quoted: true,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            write!(f, "\"{}\"", self.raw.replace('\\', "\\\\").replace('"', "\\\""))
        } else {
            f.write_str(&self.raw)
        }
    }
}

/// A multi-valued placeholder in a field or value position.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// How the items combine.
    pub connective: Connective,
    /// Items: literals or nested groups.
    pub items: Vec<Operand>,
}

/// What can stand in a field or value position.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A single literal.
    Literal(Literal),
    /// Several alternatives combined by a connective.
    Group(Group),
}

impl Operand {
    /// An unquoted literal operand.
    pub fn bare(raw: impl Into<String>) -> Self {
        Self::Literal(Literal::bare(raw))
    }

    /// A quoted literal operand.
    pub fn quoted(raw: impl Into<String>) -> Self {
        Self::Literal(Literal::quoted(raw))
    }

    /// A group operand.
    pub fn group(connective: Connective, items: Vec<Self>) -> Self {
        Self::Group(Group { connective, items })
    }

    /// Checks that every group holds at least one item.
    fn check_saturated(&self) -> Result<(), String> {
        match self {
            Self::Literal(_) => Ok(()),
            Self::Group(group) => {
                if group.items.is_empty() {
                    return Err(format!(
                        "'{}' group has no items",
                        group.connective.operator()
                    ));
                }
                group.items.iter().try_for_each(Self::check_saturated)
            }
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{literal}"),
            Self::Group(group) => {
                write!(f, "{}(", group.connective.operator())?;
                write_separated(f, &group.items)?;
                write!(f, ")")
            }
        }
    }
}

/// A parsed query expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `and(...)` / `or(...)` over one or more expressions.
    Logical {
        /// Combinator.
        op: LogicalOp,
        /// Child expressions.
        children: Vec<Self>,
    },

    /// `not(e)`: negation of exactly one expression.
    Not(Box<Self>),

    /// `exists|field` / `missing|field`.
    FieldUnary {
        /// Operator.
        op: FieldUnaryOp,
        /// Field position.
        field: Operand,
    },

    /// `freetext|value` / `freergxp|value`.
    ValueUnary {
        /// Operator.
        op: ValueUnaryOp,
        /// Value position.
        value: Operand,
    },

    /// `op|field|value`.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Field position.
        field: Operand,
        /// Value position.
        value: Operand,
    },
}

impl Expr {
    /// Creates an `and(...)` expression.
    pub fn and(children: Vec<Self>) -> Self {
        Self::Logical {
            op: LogicalOp::And,
            children,
        }
    }

    /// Creates an `or(...)` expression.
    pub fn or(children: Vec<Self>) -> Self {
        Self::Logical {
            op: LogicalOp::Or,
            children,
        }
    }

    /// Creates a `not(...)` expression.
    pub fn negate(inner: Self) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Creates a field-unary expression.
    pub fn field_unary(op: FieldUnaryOp, field: Operand) -> Self {
        Self::FieldUnary { op, field }
    }

    /// Creates a value-unary expression.
    pub fn value_unary(op: ValueUnaryOp, value: Operand) -> Self {
        Self::ValueUnary { op, value }
    }

    /// Creates a binary field/value expression.
    pub fn binary(op: BinaryOp, field: Operand, value: Operand) -> Self {
        Self::Binary { op, field, value }
    }

    /// The operator at the head of this expression.
    pub fn operator(&self) -> Operator {
        match self {
            Self::Logical { op, .. } => op.operator(),
            Self::Not(_) => Operator::Not,
            Self::FieldUnary { op, .. } => op.operator(),
            Self::ValueUnary { op, .. } => op.operator(),
            Self::Binary { op, .. } => op.operator(),
        }
    }

    /// Verifies that every node holds exactly as many children as its operator declares.
    ///
    /// Fixed-arity nodes are saturated by construction; this walks the tree for the
    /// n-ary ones.
    pub fn check_saturated(&self) -> Result<(), String> {
        match self {
            Self::Logical { op, children } => {
                if !op.operator().arity().accepts(children.len()) {
                    return Err(format!("'{}' has no children", op.operator()));
                }
                children.iter().try_for_each(Self::check_saturated)
            }
            Self::Not(inner) => inner.check_saturated(),
            Self::FieldUnary { field, .. } => field.check_saturated(),
            Self::ValueUnary { value, .. } => value.check_saturated(),
            Self::Binary { field, value, .. } => {
                field.check_saturated()?;
                value.check_saturated()
            }
        }
    }

    /// Nesting depth of parenthesised nodes (logical, not and groups).
    pub fn depth(&self) -> usize {
        fn operand_depth(operand: &Operand) -> usize {
            match operand {
                Operand::Literal(_) => 0,
                Operand::Group(group) => {
                    1 + group.items.iter().map(operand_depth).max().unwrap_or(0)
                }
            }
        }

        match self {
            Self::Logical { children, .. } => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Not(inner) => 1 + inner.depth(),
            Self::FieldUnary { field, .. } => operand_depth(field),
            Self::ValueUnary { value, .. } => operand_depth(value),
            Self::Binary { field, value, .. } => operand_depth(field).max(operand_depth(value)),
        }
    }

    /// Formats the expression as an indented tree.
    fn fmt_tree(&self, out: &mut String, indent: usize) {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Logical { op, children } => {
                out.push_str(&format!("{prefix}{}\n", op.operator()));
                for child in children {
                    child.fmt_tree(out, indent + 1);
                }
            }
            Self::Not(inner) => {
                out.push_str(&format!("{prefix}not\n"));
                inner.fmt_tree(out, indent + 1);
            }
            Self::FieldUnary { op, field } => {
                out.push_str(&format!("{prefix}{} field={field}\n", op.operator()));
            }
            Self::ValueUnary { op, value } => {
                out.push_str(&format!("{prefix}{} value={value}\n", op.operator()));
            }
            Self::Binary { op, field, value } => {
                out.push_str(&format!(
                    "{prefix}{} field={field} value={value}\n",
                    op.operator()
                ));
            }
        }
    }

    /// Renders the expression as an indented tree, one node per line.
    pub fn to_tree_string(&self) -> String {
        let mut out = String::new();
        self.fmt_tree(&mut out, 0);
        out
    }
}

/// Renders the canonical query text, which parses back to an equal expression.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logical { op, children } => {
                write!(f, "{}(", op.operator())?;
                write_separated(f, children)?;
                write!(f, ")")
            }
            Self::Not(inner) => write!(f, "not({inner})"),
            Self::FieldUnary { op, field } => {
                write!(f, "{}{FIELD_SEPARATOR}{field}", op.operator())
            }
            Self::ValueUnary { op, value } => {
                write!(f, "{}{FIELD_SEPARATOR}{value}", op.operator())
            }
            Self::Binary { op, field, value } => write!(
                f,
                "{}{FIELD_SEPARATOR}{field}{FIELD_SEPARATOR}{value}",
                op.operator()
            ),
        }
    }
}

/// Writes items joined by the group separator.
fn write_separated<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{GROUP_SEPARATOR}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_round_trip() {
        for op in Operator::ALL {
            assert_eq!(Operator::from_name(op.name()), Some(op));
        }
        assert_eq!(Operator::from_name("EQUALS"), Some(Operator::Equals));
        assert_eq!(Operator::from_name("equal"), None);
    }

    #[test]
    fn arities() {
        assert_eq!(Operator::And.arity(), Arity::AtLeastOne);
        assert_eq!(Operator::Not.arity(), Arity::Exactly(1));
        assert_eq!(Operator::Exists.arity(), Arity::Exactly(1));
        assert_eq!(Operator::FreeText.arity(), Arity::Exactly(1));
        assert_eq!(Operator::Lte.arity(), Arity::Exactly(2));
        assert!(Arity::AtLeastOne.accepts(3));
        assert!(!Arity::AtLeastOne.accepts(0));
        assert!(!Arity::Exactly(2).accepts(1));
    }

    #[test]
    fn only_boolean_keywords_are_connectives() {
        let connectives: Vec<_> = Operator::ALL
            .into_iter()
            .filter_map(Operator::connective)
            .collect();
        assert_eq!(
            connectives,
            vec![Connective::And, Connective::Or, Connective::Not]
        );
    }

    #[test]
    fn literal_typing() {
        assert_eq!(Literal::bare("3").value, Value::Integer(3));
        assert_eq!(Literal::quoted("3").value, Value::String("3".into()));
    }

    #[test]
    fn display_is_canonical_query() {
        let expr = Expr::and(vec![
            Expr::field_unary(FieldUnaryOp::Exists, Operand::bare("pos")),
            Expr::negate(Expr::binary(
                BinaryOp::Equals,
                Operand::group(Connective::Or, vec![Operand::bare("f1"), Operand::bare("f2")]),
                Operand::quoted("say \"hi\""),
            )),
        ]);
        assert_eq!(
            expr.to_string(),
            r#"and(exists|pos‖not(equals|or(f1‖f2)|"say \"hi\""))"#
        );
    }

    #[test]
    fn saturation() {
        assert!(Expr::and(vec![]).check_saturated().is_err());
        let empty_group = Expr::field_unary(
            FieldUnaryOp::Exists,
            Operand::group(Connective::Or, vec![]),
        );
        assert!(empty_group.check_saturated().is_err());
        let ok = Expr::or(vec![Expr::value_unary(
            ValueUnaryOp::FreeText,
            Operand::bare("x"),
        )]);
        assert!(ok.check_saturated().is_ok());
    }

    #[test]
    fn depth_counts_parenthesised_nodes() {
        let leaf = Expr::field_unary(FieldUnaryOp::Exists, Operand::bare("a"));
        assert_eq!(leaf.depth(), 0);
        let nested = Expr::negate(Expr::and(vec![Expr::binary(
            BinaryOp::Equals,
            Operand::bare("f"),
            Operand::group(
                Connective::Or,
                vec![Operand::group(Connective::And, vec![Operand::bare("v")])],
            ),
        )]));
        assert_eq!(nested.depth(), 4);
    }

    #[test]
    fn tree_rendering() {
        let expr = Expr::or(vec![
            Expr::field_unary(FieldUnaryOp::Missing, Operand::bare("a")),
            Expr::value_unary(ValueUnaryOp::FreeRegexp, Operand::quoted("x.*")),
        ]);
        assert_eq!(
            expr.to_tree_string(),
            "or\n  missing field=a\n  freergxp value=\"x.*\"\n"
        );
    }
}
