//! Selection propagation
//!
//! Pure transforms `(path, SelectionSet, Catalog) -> SelectionSet`:
//! - grant: path + whole subtree, then promote ancestors one level at a time
//!   while every direct child is granted
//! - revoke: path + whole subtree + every ancestor
//!
//! - seed: stored grants folded through grant, so a stored group grant covers
//!   its whole subtree
//!
//! Paths missing from the catalog leave the set unchanged.

use tracing::debug;

use crate::catalog::Catalog;
use crate::path::PermissionPath;
use crate::selection::SelectionSet;

/// Flip `path`: revoke it if granted, grant it otherwise.
pub fn toggle(path: &str, current: &SelectionSet, catalog: &Catalog) -> SelectionSet {
    if current.is_selected(path) {
        revoke(path, current, catalog)
    } else {
        grant(path, current, catalog)
    }
}

/// Build a closed selection from stored grants: each path is granted with its
/// subtree and fully granted ancestors are promoted, as if toggled on in turn.
pub fn seed<'a, I>(paths: I, catalog: &Catalog) -> SelectionSet
where
    I: IntoIterator<Item = &'a PermissionPath>,
{
    paths.into_iter().fold(SelectionSet::new(), |s, p| {
        if s.is_selected(p.as_str()) {
            s
        } else {
            grant(p.as_str(), &s, catalog)
        }
    })
}

/// Grant `path` and its subtree, auto-promoting fully granted ancestors.
pub fn grant(path: &str, current: &SelectionSet, catalog: &Catalog) -> SelectionSet {
    let Some(target) = catalog.get(path) else {
        debug!(path, "grant of unknown path ignored");
        return current.clone();
    };

    let mut next = current.clone();
    next.insert(target.clone());
    for d in catalog.descendants_of(path) {
        next.insert(d.clone());
    }

    let mut promoted: Vec<&PermissionPath> = Vec::new();
    let mut cur = catalog.parent_of(path);
    while let Some(ancestor) = cur {
        let full = catalog
            .direct_children_of(ancestor.as_str())
            .all(|c| next.is_selected(c.as_str()));
        if !full {
            break;
        }
        next.insert(ancestor.clone());
        promoted.push(ancestor);
        cur = catalog.parent_of(ancestor.as_str());
    }

    debug!(path, ?promoted, size = next.len(), "granted");
    next
}

/// Revoke `path`, its subtree and every ancestor.
pub fn revoke(path: &str, current: &SelectionSet, catalog: &Catalog) -> SelectionSet {
    if !catalog.contains(path) {
        debug!(path, "revoke of unknown path ignored");
        return current.clone();
    }

    let mut next = current.clone();
    next.remove(path);
    for d in catalog.descendants_of(path) {
        next.remove(d.as_str());
    }

    let mut demoted = 0usize;
    let mut cur = catalog.parent_of(path);
    while let Some(ancestor) = cur {
        if next.remove(ancestor.as_str()) {
            demoted += 1;
        }
        cur = catalog.parent_of(ancestor.as_str());
    }

    debug!(path, demoted, size = next.len(), "revoked");
    next
}
