//! Range merging.
//!
//! Under an `And`, `Range(val > 1)` and `Range(val < 5)` on the same concrete field can be
//! answered by one two-bound range `Range(1 < val < 5)`. Ranges are only joined when their
//! bounds occupy opposite ends; two lower bounds on one field are left alone.

use crate::predicate::{Bound, Predicate};

/// Rebuilds `predicate` with complementary ranges under each `And` merged.
pub fn merge_ranges(predicate: Predicate) -> Predicate {
    match predicate {
        Predicate::And { children } => {
            let children = children.into_iter().map(merge_ranges).collect();
            Predicate::and(absorb_ranges(children))
        }
        Predicate::Or { children } => {
            Predicate::or(children.into_iter().map(merge_ranges).collect())
        }
        Predicate::Not { child } => Predicate::not(merge_ranges(*child)),
        leaf => leaf,
    }
}

/// Folds each range into an earlier range on the same field where the bounds fit.
fn absorb_ranges(children: Vec<Predicate>) -> Vec<Predicate> {
    let mut out: Vec<Predicate> = Vec::with_capacity(children.len());
    for child in children {
        let child = match child {
            Predicate::Range {
                field,
                lower,
                upper,
            } => match absorb(&mut out, &field, lower, upper) {
                Some((lower, upper)) => Predicate::Range {
                    field,
                    lower,
                    upper,
                },
                None => continue,
            },
            other => other,
        };
        out.push(child);
    }
    out
}

/// Fills the free ends of an earlier range on `field`. Returns the bounds back if no
/// earlier range can take them.
fn absorb(
    earlier: &mut [Predicate],
    field: &str,
    lower: Option<Bound>,
    upper: Option<Bound>,
) -> Option<(Option<Bound>, Option<Bound>)> {
    for predicate in earlier.iter_mut() {
        if let Predicate::Range {
            field: existing,
            lower: existing_lower,
            upper: existing_upper,
        } = predicate
            && existing.as_str() == field
            && (lower.is_none() || existing_lower.is_none())
            && (upper.is_none() || existing_upper.is_none())
        {
            if lower.is_some() {
                *existing_lower = lower;
            }
            if upper.is_some() {
                *existing_upper = upper;
            }
            return None;
        }
    }
    Some((lower, upper))
}
