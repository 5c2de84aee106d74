//! Selection state for one role being edited

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::path::PermissionPath;

/// Derived checkbox state of a node. Never stored, always recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckState {
    Unchecked,
    Checked,
    Indeterminate,
}

/// Set of granted permission paths.
///
/// Only [`crate::toggle`], [`SelectionSet::select_all`] and
/// [`SelectionSet::deselect_all`] change an existing set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionSet {
    paths: BTreeSet<PermissionPath>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from already-normalized paths.
    pub fn from_paths<I: IntoIterator<Item = PermissionPath>>(paths: I) -> Self {
        Self { paths: paths.into_iter().collect() }
    }

    #[inline]
    pub fn is_selected(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Some but not all descendants granted. Leaves and unknown paths are never partial.
    pub fn is_partially_selected(&self, path: &str, catalog: &Catalog) -> bool {
        let below = catalog.descendants_of(path);
        if below.is_empty() {
            return false;
        }
        let granted = below.iter().filter(|p| self.paths.contains(p.as_str())).count();
        granted > 0 && granted < below.len()
    }

    /// Checkbox state; a partial subtree shows indeterminate even if the node
    /// itself is granted.
    pub fn state(&self, path: &str, catalog: &Catalog) -> CheckState {
        if self.is_partially_selected(path, catalog) {
            CheckState::Indeterminate
        } else if self.is_selected(path) {
            CheckState::Checked
        } else {
            CheckState::Unchecked
        }
    }

    /// Replace the set with every path in the catalog.
    pub fn select_all(&mut self, catalog: &Catalog) {
        self.paths = catalog.universe().iter().cloned().collect();
    }

    pub fn deselect_all(&mut self) {
        self.paths.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PermissionPath> {
        self.paths.iter()
    }

    /// Granted paths that exist in `catalog`.
    pub fn granted_count(&self, catalog: &Catalog) -> usize {
        self.paths.iter().filter(|p| catalog.contains(p.as_str())).count()
    }

    /// Granted paths in catalog render order; paths unknown to the catalog are skipped.
    pub fn to_paths(&self, catalog: &Catalog) -> Vec<PermissionPath> {
        catalog.universe().iter().filter(|p| self.paths.contains(p.as_str())).cloned().collect()
    }

    // Propagation internals

    #[inline]
    pub(crate) fn insert(&mut self, path: PermissionPath) -> bool {
        self.paths.insert(path)
    }

    #[inline]
    pub(crate) fn remove(&mut self, path: &str) -> bool {
        self.paths.remove(path)
    }
}

impl FromIterator<PermissionPath> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = PermissionPath>>(iter: I) -> Self {
        Self::from_paths(iter)
    }
}
