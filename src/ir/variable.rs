// src/ir/variable.rs
//! Variable identifiers and the debug-name bookkeeping carried across
//! renaming.

use std::collections::BTreeSet;
use std::fmt;

/// An opaque reference to a variable slot in a [`super::procedure::Procedure`].
///
/// Indices are dense and start at zero; [`super::procedure::Procedure::create_variable`]
/// always returns the next unused index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub usize);

impl VarId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Per-variable metadata: currently just the set of debug names accumulated
/// for it. Debug names are never dropped, only unioned, so that a fresh
/// variable standing in for an original one on some path keeps every name
/// the original (or any other fresh variable merged into it) ever carried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableData {
    debug_names: BTreeSet<String>,
}

impl VariableData {
    #[must_use]
    pub fn debug_names(&self) -> &BTreeSet<String> {
        &self.debug_names
    }

    pub fn add_debug_name(&mut self, name: impl Into<String>) {
        self.debug_names.insert(name.into());
    }

    /// Unions `other`'s debug names into `self`.
    pub fn merge_from(&mut self, other: &Self) {
        self.debug_names.extend(other.debug_names.iter().cloned());
    }
}
