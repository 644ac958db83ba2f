//! sift: record query compiler
//!
//! `sift` shows how a record query is tokenized, parsed and compiled against the field
//! aliases declared in `.sift.toml`, which makes it the quickest way to debug a query
//! before it reaches a search backend. The command-line front end lives in [`cli`];
//! the language itself is implemented by `sift-query` and `sift-predicate`.

#![warn(missing_docs)]

pub mod cli;
