//! Compilation of sift query ASTs into backend-agnostic search predicates.
//!
//! A parsed [`Expr`](sift_query::Expr) names logical fields and may hold grouped field and
//! value positions. The compiler resolves each logical field through a [`FieldResolver`]
//! into its concrete index paths and expands every group into the cross product of atomic
//! predicates, yielding a [`Predicate`] tree the search backend can execute.
//!
//! ```
//! use sift_predicate::{AliasTable, FieldAliases, Predicate, parse_and_compile};
//!
//! let fields = AliasTable::new()
//!     .with("state", FieldAliases::new("state", ["v_municipality.state"]));
//! let predicate = parse_and_compile("exists|state", &fields).unwrap();
//! assert_eq!(
//!     predicate,
//!     Predicate::or(vec![
//!         Predicate::exists("state"),
//!         Predicate::exists("v_municipality.state"),
//!     ])
//! );
//! ```

#![warn(missing_docs)]

mod compile;
mod engine;
mod error;
mod optimize;
mod predicate;
mod resolver;

pub use compile::{CompileOptions, Compiler, UnknownFieldPolicy, compile};
pub use engine::{Engine, parse_and_compile};
pub use error::{CompileError, EngineError};
pub use optimize::merge_ranges;
pub use predicate::{Bound, PatternKind, Predicate, RangeKind, TextMode};
pub use resolver::{AliasTable, FieldAliases, FieldResolver, IdentityResolver};
