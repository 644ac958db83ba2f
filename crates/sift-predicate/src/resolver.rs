//! Field resolution.
//!
//! A logical field name may be mirrored into denormalized copies inside linked records
//! ("virtual fields"). A [`FieldResolver`] maps the logical name onto every concrete
//! index path that answers to it, e.g. `state` → `{state, v_municipality.state}`.

use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
    sync::Arc,
};

use indexmap::IndexSet;

/// A non-empty, insertion-ordered set of concrete field paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAliases(IndexSet<String>);

impl FieldAliases {
    /// A single path.
    pub fn single(path: impl Into<String>) -> Self {
        let mut set = IndexSet::with_capacity(1);
        set.insert(path.into());
        Self(set)
    }

    /// A primary path followed by further aliases. Duplicates are dropped.
    pub fn new<I, S>(primary: impl Into<String>, rest: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut aliases = Self::single(primary);
        aliases.0.extend(rest.into_iter().map(Into::into));
        aliases
    }

    /// Builds a set from paths in order, or `None` if there are none.
    pub fn from_paths<I, S>(paths: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: IndexSet<String> = paths.into_iter().map(Into::into).collect();
        if set.is_empty() { None } else { Some(Self(set)) }
    }

    /// The first path.
    pub fn primary(&self) -> &str {
        // Non-empty by construction.
        self.0.first().map_or("", String::as_str)
    }

    /// Iterates over the paths in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of paths (always at least one).
    pub fn count(&self) -> usize {
        self.0.len()
    }

    /// Checks whether `path` is one of the aliases.
    pub fn contains(&self, path: &str) -> bool {
        self.0.contains(path)
    }
}

/// Maps logical field names onto concrete index paths.
///
/// Implementations must be side-effect free from the caller's point of view; any
/// caching or I/O is their own concern. Returning `None` means the name is not
/// recognised.
pub trait FieldResolver {
    /// Resolves a logical field name.
    fn resolve(&self, field: &str) -> Option<FieldAliases>;
}

impl<R: FieldResolver + ?Sized> FieldResolver for &R {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        (**self).resolve(field)
    }
}

impl<R: FieldResolver + ?Sized> FieldResolver for Box<R> {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        (**self).resolve(field)
    }
}

impl<R: FieldResolver + ?Sized> FieldResolver for Rc<R> {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        (**self).resolve(field)
    }
}

impl<R: FieldResolver + ?Sized> FieldResolver for Arc<R> {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        (**self).resolve(field)
    }
}

impl FieldResolver for HashMap<String, FieldAliases> {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        self.get(field).cloned()
    }
}

/// Resolves every field to itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl FieldResolver for IdentityResolver {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        Some(FieldAliases::single(field))
    }
}

/// An explicit table of logical fields and their aliases.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    /// Logical field name → concrete paths.
    entries: BTreeMap<String, FieldAliases>,
    /// Whether names missing from the table resolve to themselves.
    identity_fallback: bool,
}

impl AliasTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes names missing from the table resolve to themselves instead of failing.
    pub fn with_fallback_identity(mut self) -> Self {
        self.identity_fallback = true;
        self
    }

    /// Adds a field, returning the table for chaining.
    pub fn with(mut self, field: impl Into<String>, aliases: FieldAliases) -> Self {
        self.insert(field, aliases);
        self
    }

    /// Adds or replaces a field, returning the previous aliases.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        aliases: FieldAliases,
    ) -> Option<FieldAliases> {
        self.entries.insert(field.into(), aliases)
    }

    /// Iterates over entries in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldAliases)> {
        self.entries.iter().map(|(field, aliases)| (field.as_str(), aliases))
    }

    /// Number of fields in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, FieldAliases)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (String, FieldAliases)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
            identity_fallback: false,
        }
    }
}

impl FieldResolver for AliasTable {
    fn resolve(&self, field: &str) -> Option<FieldAliases> {
        match self.entries.get(field) {
            Some(aliases) => Some(aliases.clone()),
            None if self.identity_fallback => Some(FieldAliases::single(field)),
            None => None,
        }
    }
}
