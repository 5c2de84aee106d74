//! Search view over the catalog's root list.
//!
//! Read-only: filtering changes what is displayed, never what is granted.

use crate::catalog::Catalog;
use crate::path::PermissionPath;

/// Roots whose subtree (the root included) holds a node whose name contains
/// `query`, case-insensitively. A blank query returns every root.
pub fn filter_roots<'c>(catalog: &'c Catalog, query: &str) -> Vec<&'c PermissionPath> {
    let Some(needle) = needle(query) else {
        return catalog.roots().collect();
    };
    catalog
        .roots()
        .filter(|root| {
            catalog
                .flatten_from(root.as_str())
                .iter()
                .any(|(p, _)| name_matches(p, &needle))
        })
        .collect()
}

/// Every path whose own name matches `query`, in render order. A blank query
/// matches nothing.
pub fn matching_paths<'c>(catalog: &'c Catalog, query: &str) -> Vec<&'c PermissionPath> {
    let Some(needle) = needle(query) else {
        return Vec::new();
    };
    catalog.universe().iter().filter(|p| name_matches(p, &needle)).collect()
}

fn needle(query: &str) -> Option<String> {
    let q = query.trim();
    (!q.is_empty()).then(|| q.to_lowercase())
}

#[inline]
fn name_matches(path: &PermissionPath, needle: &str) -> bool {
    path.name().to_lowercase().contains(needle)
}
