//! Backend-agnostic search predicates.
//!
//! A [`Predicate`] tree is the compiled form of a query handed to the search
//! execution component. It owns all of its data and never refers back to the AST it
//! was built from.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;
use sift_query::{BinaryOp, Value};

/// Direction and strictness of a single range bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    /// `field > value`
    Gt,
    /// `field >= value`
    Gte,
    /// `field < value`
    Lt,
    /// `field <= value`
    Lte,
}

impl RangeKind {
    /// Maps a comparison operator to its range kind.
    pub fn from_operator(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Gt => Some(Self::Gt),
            BinaryOp::Gte => Some(Self::Gte),
            BinaryOp::Lt => Some(Self::Lt),
            BinaryOp::Lte => Some(Self::Lte),
            _ => None,
        }
    }

    /// True for `gt`/`gte`, which bound the range from below.
    pub fn is_lower(self) -> bool {
        matches!(self, Self::Gt | Self::Gte)
    }

    /// True for `gte`/`lte`.
    pub fn is_inclusive(self) -> bool {
        matches!(self, Self::Gte | Self::Lte)
    }
}

/// One end of a range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bound {
    /// Boundary value.
    pub value: Value,
    /// Whether the boundary value itself matches.
    pub inclusive: bool,
}

/// Kinds of textual pattern match against one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Substring.
    Contains,
    /// Prefix.
    StartsWith,
    /// Suffix.
    EndsWith,
    /// Regular expression.
    Regexp,
}

impl PatternKind {
    /// Maps a pattern operator to its kind.
    pub fn from_operator(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Contains => Some(Self::Contains),
            BinaryOp::StartsWith => Some(Self::StartsWith),
            BinaryOp::EndsWith => Some(Self::EndsWith),
            BinaryOp::Regexp => Some(Self::Regexp),
            _ => None,
        }
    }

    /// Lowercase name, matching the query keyword.
    pub fn name(self) -> &'static str {
        match self {
            Self::Contains => "contains",
            Self::StartsWith => "startswith",
            Self::EndsWith => "endswith",
            Self::Regexp => "regexp",
        }
    }
}

/// How free text is matched across all indexed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextMode {
    /// Analysed term search.
    Terms,
    /// Regular expression.
    Regexp,
}

/// A compiled boolean search condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// The field equals the value.
    Eq {
        /// Concrete field path.
        field: String,
        /// Typed value.
        value: Value,
    },

    /// The field lies within one or two bounds.
    Range {
        /// Concrete field path.
        field: String,
        /// Lower bound (`gt`/`gte`).
        #[serde(skip_serializing_if = "Option::is_none")]
        lower: Option<Bound>,
        /// Upper bound (`lt`/`lte`).
        #[serde(skip_serializing_if = "Option::is_none")]
        upper: Option<Bound>,
    },

    /// The field has a value.
    Exists {
        /// Concrete field path.
        field: String,
    },

    /// The field's text matches a pattern.
    Pattern {
        /// Concrete field path.
        field: String,
        /// Kind of match.
        kind: PatternKind,
        /// Pattern text.
        text: String,
    },

    /// Text matched across all indexed content.
    FreeText {
        /// Search text.
        text: String,
        /// How the text is matched.
        mode: TextMode,
    },

    /// Every child must match.
    And {
        /// Children.
        children: Vec<Self>,
    },

    /// At least one child must match.
    Or {
        /// Children.
        children: Vec<Self>,
    },

    /// The child must not match.
    Not {
        /// Negated child.
        child: Box<Self>,
    },
}

impl Predicate {
    /// An equality predicate.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// A single-bound range predicate.
    pub fn range(field: impl Into<String>, kind: RangeKind, value: impl Into<Value>) -> Self {
        let bound = Bound {
            value: value.into(),
            inclusive: kind.is_inclusive(),
        };
        let (lower, upper) = if kind.is_lower() {
            (Some(bound), None)
        } else {
            (None, Some(bound))
        };
        Self::Range {
            field: field.into(),
            lower,
            upper,
        }
    }

    /// An existence predicate.
    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    /// A pattern predicate.
    pub fn pattern(field: impl Into<String>, kind: PatternKind, text: impl Into<String>) -> Self {
        Self::Pattern {
            field: field.into(),
            kind,
            text: text.into(),
        }
    }

    /// A free-text predicate.
    pub fn free_text(text: impl Into<String>, mode: TextMode) -> Self {
        Self::FreeText {
            text: text.into(),
            mode,
        }
    }

    /// A conjunction. A single child is returned unwrapped.
    pub fn and(children: Vec<Self>) -> Self {
        Self::unwrap_single(children).unwrap_or_else(|children| Self::And { children })
    }

    /// A disjunction. A single child is returned unwrapped.
    pub fn or(children: Vec<Self>) -> Self {
        Self::unwrap_single(children).unwrap_or_else(|children| Self::Or { children })
    }

    /// A negation.
    pub fn not(child: Self) -> Self {
        Self::Not {
            child: Box::new(child),
        }
    }

    /// Returns the sole element of `children`, or gives the vector back.
    fn unwrap_single(mut children: Vec<Self>) -> Result<Self, Vec<Self>> {
        match children.pop() {
            Some(only) if children.is_empty() => Ok(only),
            Some(last) => {
                children.push(last);
                Err(children)
            }
            None => Err(children),
        }
    }

    /// Number of atomic (non-boolean) predicates in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::And { children } | Self::Or { children } => {
                children.iter().map(Self::leaf_count).sum()
            }
            Self::Not { child } => child.leaf_count(),
            _ => 1,
        }
    }

    /// The set of concrete field paths referenced anywhere in the tree.
    pub fn fields(&self) -> BTreeSet<&str> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    /// Adds referenced field paths to `out`.
    fn collect_fields<'a>(&'a self, out: &mut BTreeSet<&'a str>) {
        match self {
            Self::Eq { field, .. }
            | Self::Range { field, .. }
            | Self::Exists { field }
            | Self::Pattern { field, .. } => {
                out.insert(field);
            }
            Self::FreeText { .. } => {}
            Self::And { children } | Self::Or { children } => {
                for child in children {
                    child.collect_fields(out);
                }
            }
            Self::Not { child } => child.collect_fields(out),
        }
    }

    /// Formats the predicate as a tree structure with the given indentation level.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let prefix = "  ".repeat(indent);
        match self {
            Self::Eq { field, value } => writeln!(f, "{prefix}Eq({field} = {value})"),
            Self::Range {
                field,
                lower,
                upper,
            } => {
                write!(f, "{prefix}Range(")?;
                if let Some(bound) = lower {
                    let op = if bound.inclusive { "<=" } else { "<" };
                    write!(f, "{} {op} ", bound.value)?;
                }
                write!(f, "{field}")?;
                if let Some(bound) = upper {
                    let op = if bound.inclusive { "<=" } else { "<" };
                    write!(f, " {op} {}", bound.value)?;
                }
                writeln!(f, ")")
            }
            Self::Exists { field } => writeln!(f, "{prefix}Exists({field})"),
            Self::Pattern { field, kind, text } => {
                writeln!(f, "{prefix}Pattern({field} {} {text:?})", kind.name())
            }
            Self::FreeText { text, mode } => match mode {
                TextMode::Terms => writeln!(f, "{prefix}FreeText({text:?})"),
                TextMode::Regexp => writeln!(f, "{prefix}FreeText(regexp {text:?})"),
            },
            Self::And { children } => {
                writeln!(f, "{prefix}And")?;
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Or { children } => {
                writeln!(f, "{prefix}Or")?;
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
            Self::Not { child } => {
                writeln!(f, "{prefix}Not")?;
                child.fmt_tree(f, indent + 1)
            }
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn single_children_unwrap() {
        assert_eq!(
            Predicate::or(vec![Predicate::exists("a")]),
            Predicate::exists("a")
        );
        assert_eq!(
            Predicate::and(vec![Predicate::exists("a"), Predicate::exists("b")]),
            Predicate::And {
                children: vec![Predicate::exists("a"), Predicate::exists("b")]
            }
        );
        assert_eq!(Predicate::or(vec![]), Predicate::Or { children: vec![] });
    }

    #[test]
    fn range_places_bound_by_kind() {
        let Predicate::Range { lower, upper, .. } = Predicate::range("val", RangeKind::Gt, Value::Integer(2))
        else {
            panic!("expected range");
        };
        assert_eq!(
            lower,
            Some(Bound {
                value: Value::Integer(2),
                inclusive: false
            })
        );
        assert_eq!(upper, None);

        let Predicate::Range { lower, upper, .. } = Predicate::range("val", RangeKind::Lte, Value::Integer(5))
        else {
            panic!("expected range");
        };
        assert_eq!(lower, None);
        assert!(upper.unwrap().inclusive);
    }

    #[test]
    fn serializes_tagged() {
        let predicate = Predicate::and(vec![
            Predicate::eq("pos", "nn"),
            Predicate::not(Predicate::range("val", RangeKind::Gte, 2.5)),
            Predicate::pattern("title", PatternKind::StartsWith, "intro"),
            Predicate::free_text("hello", TextMode::Terms),
        ]);
        assert_eq!(
            serde_json::to_value(&predicate).unwrap(),
            json!({
                "type": "and",
                "children": [
                    {"type": "eq", "field": "pos", "value": "nn"},
                    {"type": "not", "child": {
                        "type": "range", "field": "val",
                        "lower": {"value": 2.5, "inclusive": true}
                    }},
                    {"type": "pattern", "field": "title", "kind": "startswith", "text": "intro"},
                    {"type": "free_text", "text": "hello", "mode": "terms"}
                ]
            })
        );
    }

    #[test]
    fn tree_display() {
        let predicate = Predicate::or(vec![
            Predicate::exists("field"),
            Predicate::Range {
                field: "val".into(),
                lower: Some(Bound {
                    value: Value::Integer(1),
                    inclusive: true,
                }),
                upper: Some(Bound {
                    value: Value::Integer(5),
                    inclusive: false,
                }),
            },
            Predicate::not(Predicate::free_text("a.*", TextMode::Regexp)),
        ]);
        assert_eq!(
            predicate.to_string(),
            "Or\n  Exists(field)\n  Range(1 <= val < 5)\n  Not\n    FreeText(regexp \"a.*\")\n"
        );
    }

    #[test]
    fn leaves_and_fields() {
        let predicate = Predicate::and(vec![
            Predicate::or(vec![Predicate::exists("b"), Predicate::exists("a")]),
            Predicate::not(Predicate::eq("b", Value::Integer(1))),
            Predicate::free_text("x", TextMode::Terms),
        ]);
        assert_eq!(predicate.leaf_count(), 4);
        assert_eq!(predicate.fields().into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
