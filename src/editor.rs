//! Permission editing session for one role
//!
//! Lifecycle: `open` loads the catalog and the role's grants from a
//! [`RoleStore`], toggles run through [`crate::propagate`], `save` hands the
//! full grant list back, `discard` drops the session without writing.

use std::collections::BTreeSet;

use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::Result;
use crate::filter::{filter_roots, matching_paths};
use crate::path::PermissionPath;
use crate::propagate::{seed, toggle};
use crate::selection::{CheckState, SelectionSet};
use crate::store::RoleStore;

pub struct PermissionEditor<S: RoleStore> {
    store: S,
    role_id: u64,
    role_name: String,
    catalog: Catalog,
    selection: SelectionSet,
    baseline: SelectionSet,
    stale: BTreeSet<PermissionPath>,
    retain_stale: bool,
    query: String,
}

impl<S: RoleStore> PermissionEditor<S> {
    /// Load the catalog and the role's grants. A malformed catalog fails here.
    /// A stored group grant is widened to its whole subtree.
    pub fn open(store: S, role_id: u64, config: &Config) -> Result<Self> {
        let nodes = store.load_catalog()?;
        let catalog = Catalog::with_max_depth(&nodes, config.catalog.max_depth)?;
        let role = store.load_role(role_id)?;

        let mut granted = Vec::with_capacity(role.permissions.len());
        let mut stale = BTreeSet::new();
        for raw in &role.permissions {
            match catalog.normalize_grant(raw) {
                Some(p) => granted.push(p),
                None => {
                    if let Ok(p) = PermissionPath::parse(raw.trim()) {
                        stale.insert(p);
                    }
                }
            }
        }
        if !stale.is_empty() {
            warn!(role = role_id, count = stale.len(), paths = ?stale, "grants not in catalog");
        }

        let selection = seed(&granted, &catalog);
        info!(role = role_id, name = %role.name, granted = selection.len(), "permission editor opened");
        Ok(Self {
            store,
            role_id,
            role_name: role.name,
            catalog,
            baseline: selection.clone(),
            selection,
            stale,
            retain_stale: config.editor.retain_stale_grants,
            query: String::new(),
        })
    }

    #[inline]
    pub fn role_id(&self) -> u64 {
        self.role_id
    }

    #[inline]
    pub fn role_name(&self) -> &str {
        &self.role_name
    }

    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[inline]
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    // ========================================================================
    // Selection
    // ========================================================================

    pub fn toggle(&mut self, path: &str) -> &SelectionSet {
        self.selection = toggle(path, &self.selection, &self.catalog);
        &self.selection
    }

    pub fn select_all(&mut self) {
        self.selection.select_all(&self.catalog);
    }

    pub fn deselect_all(&mut self) {
        self.selection.deselect_all();
    }

    pub fn is_selected(&self, path: &str) -> bool {
        self.selection.is_selected(path)
    }

    pub fn is_partially_selected(&self, path: &str) -> bool {
        self.selection.is_partially_selected(path, &self.catalog)
    }

    pub fn state(&self, path: &str) -> CheckState {
        self.selection.state(path, &self.catalog)
    }

    /// Stored grants the catalog does not know. Never shown, never toggled.
    pub fn stale_grants(&self) -> impl Iterator<Item = &PermissionPath> {
        self.stale.iter()
    }

    /// Selection differs from what was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.selection != self.baseline
    }

    // ========================================================================
    // Search
    // ========================================================================

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Roots to display for the current query.
    pub fn visible_roots(&self) -> Vec<&PermissionPath> {
        filter_roots(&self.catalog, &self.query)
    }

    /// Nodes whose own name matches the current query.
    pub fn matches(&self) -> Vec<&PermissionPath> {
        matching_paths(&self.catalog, &self.query)
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Flat, deduplicated grant list in render order, followed by retained
    /// stale grants when configured.
    pub fn paths_to_save(&self) -> Vec<PermissionPath> {
        let mut paths = self.selection.to_paths(&self.catalog);
        if self.retain_stale {
            paths.extend(self.stale.iter().cloned());
        }
        paths
    }

    /// Persist the whole grant set. The session stays open.
    pub fn save(&mut self) -> Result<Vec<PermissionPath>> {
        let paths = self.paths_to_save();
        self.store.save_grants(self.role_id, &paths, &self.catalog.fingerprint())?;
        self.baseline = self.selection.clone();
        info!(role = self.role_id, grants = paths.len(), "permissions saved");
        Ok(paths)
    }

    /// Close without saving.
    pub fn discard(self) {
        info!(role = self.role_id, dirty = self.is_dirty(), "permission editor discarded");
    }
}
