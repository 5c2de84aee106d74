//! Role store boundary
//!
//! The editor reads the catalog and a role's grants once when a session opens
//! and writes the complete grant list back on save. Transport, retries and
//! storage format belong to the implementation.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};

use crate::error::{PermTreeError, Result};
use crate::node::PermissionNode;
use crate::path::PermissionPath;

/// A role and its raw stored grants (bare names or dotted paths).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl Role {
    pub fn new(id: u64, name: impl Into<String>, permissions: Vec<String>) -> Self {
        Self { id, name: name.into(), permissions }
    }
}

/// Source of catalogs and sink for role grants.
pub trait RoleStore {
    fn load_catalog(&self) -> Result<Vec<PermissionNode>>;

    fn load_role(&self, role: u64) -> Result<Role>;

    /// Replace the role's grants with `paths` (the whole set, not a diff).
    /// `catalog_fp` is the fingerprint of the catalog the grants were edited against.
    fn save_grants(&self, role: u64, paths: &[PermissionPath], catalog_fp: &str) -> Result<()>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: RwLock<Vec<PermissionNode>>,
    roles: RwLock<HashMap<u64, Role>>,
    fingerprints: RwLock<HashMap<u64, String>>,
}

impl MemoryStore {
    pub fn new(catalog: Vec<PermissionNode>) -> Self {
        Self { catalog: RwLock::new(catalog), ..Self::default() }
    }

    pub fn with_role(self, role: Role) -> Self {
        self.put_role(role);
        self
    }

    pub fn put_role(&self, role: Role) {
        write(&self.roles).insert(role.id, role);
    }

    pub fn set_catalog(&self, catalog: Vec<PermissionNode>) {
        *write(&self.catalog) = catalog;
    }

    pub fn get_role(&self, role: u64) -> Option<Role> {
        read(&self.roles).get(&role).cloned()
    }

    pub fn grants_fingerprint(&self, role: u64) -> Option<String> {
        read(&self.fingerprints).get(&role).cloned()
    }
}

impl RoleStore for MemoryStore {
    fn load_catalog(&self) -> Result<Vec<PermissionNode>> {
        Ok(read(&self.catalog).clone())
    }

    fn load_role(&self, role: u64) -> Result<Role> {
        self.get_role(role).ok_or(PermTreeError::RoleNotFound(role))
    }

    fn save_grants(&self, role: u64, paths: &[PermissionPath], catalog_fp: &str) -> Result<()> {
        let mut roles = write(&self.roles);
        let r = roles.get_mut(&role).ok_or(PermTreeError::RoleNotFound(role))?;
        r.permissions = paths.iter().map(|p| p.to_string()).collect();
        write(&self.fingerprints).insert(role, catalog_fp.to_string());
        Ok(())
    }
}

impl<S: RoleStore + ?Sized> RoleStore for &S {
    fn load_catalog(&self) -> Result<Vec<PermissionNode>> {
        (**self).load_catalog()
    }

    fn load_role(&self, role: u64) -> Result<Role> {
        (**self).load_role(role)
    }

    fn save_grants(&self, role: u64, paths: &[PermissionPath], catalog_fp: &str) -> Result<()> {
        (**self).save_grants(role, paths, catalog_fp)
    }
}

// A poisoned lock still holds consistent data: every write is a single assignment.
fn read<T>(l: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    l.read().unwrap_or_else(|p| p.into_inner())
}

fn write<T>(l: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    l.write().unwrap_or_else(|p| p.into_inner())
}
