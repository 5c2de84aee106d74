//! LMDB-backed role store
//!
//! Tables:
//! - `roles`:  role id → role name
//! - `grants`: role id → JSON array of granted paths
//! - `meta`:   `catalog` → JSON catalog, `fp:{id}` → catalog fingerprint at last save

use std::path::Path;

use byteorder::BigEndian;
use heed::types::{Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::constants::{DB_GRANTS, DB_META, DB_ROLES, META_CATALOG};
use crate::error::{err, PermTreeError, Result};
use crate::node::PermissionNode;
use crate::path::PermissionPath;
use crate::store::{Role, RoleStore};

// Database type aliases
pub type DbRole = Database<U64<BigEndian>, Str>;
pub type DbMeta = Database<Str, Str>;

/// All database handles
struct Dbs {
    roles: DbRole,
    grants: DbRole,
    meta: DbMeta,
}

/// Persistent [`RoleStore`] on an LMDB environment.
pub struct LmdbStore {
    env: Env,
    dbs: Dbs,
}

#[inline]
fn fp_key(role: u64) -> String {
    format!("fp:{}", role)
}

impl LmdbStore {
    /// Open (creating if needed) the store at `path`.
    pub fn open(path: impl AsRef<Path>, map_size: usize) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path).map_err(err)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(3)
                .open(path)
                .map_err(err)?
        };
        let mut tx = env.write_txn().map_err(err)?;
        let dbs = Dbs {
            roles: env.create_database(&mut tx, Some(DB_ROLES)).map_err(err)?,
            grants: env.create_database(&mut tx, Some(DB_GRANTS)).map_err(err)?,
            meta: env.create_database(&mut tx, Some(DB_META)).map_err(err)?,
        };
        tx.commit().map_err(err)?;
        info!(path = %path.display(), "role store opened");
        Ok(Self { env, dbs })
    }

    pub fn open_with(config: &StoreConfig) -> Result<Self> {
        Self::open(&config.path, config.map_size)
    }

    /// Execute a read-only operation
    fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        f(&self.dbs, &self.env.read_txn().map_err(err)?)
    }

    /// Execute a write operation in one transaction
    fn write<T, F: FnOnce(&Dbs, &mut RwTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = self.env.write_txn().map_err(err)?;
        let r = f(&self.dbs, &mut tx)?;
        tx.commit().map_err(err)?;
        Ok(r)
    }

    /// Replace the stored catalog.
    pub fn put_catalog(&self, catalog: &[PermissionNode]) -> Result<()> {
        let json = serde_json::to_string(catalog)?;
        self.write(|d, tx| d.meta.put(tx, META_CATALOG, &json).map_err(err))
    }

    /// Create or overwrite a role with its grants.
    pub fn put_role(&self, role: &Role) -> Result<()> {
        let json = serde_json::to_string(&role.permissions)?;
        self.write(|d, tx| {
            d.roles.put(tx, &role.id, &role.name).map_err(err)?;
            d.grants.put(tx, &role.id, &json).map_err(err)
        })
    }

    pub fn delete_role(&self, role: u64) -> Result<bool> {
        self.write(|d, tx| {
            let r = d.roles.delete(tx, &role).map_err(err)?;
            d.grants.delete(tx, &role).map_err(err)?;
            d.meta.delete(tx, &fp_key(role)).map_err(err)?;
            Ok(r)
        })
    }

    /// All roles as `(id, name)`, ordered by id.
    pub fn list_roles(&self) -> Result<Vec<(u64, String)>> {
        self.read(|d, tx| {
            let mut r = Vec::new();
            for item in d.roles.iter(tx).map_err(err)? {
                let (id, name) = item.map_err(err)?;
                r.push((id, name.to_string()));
            }
            Ok(r)
        })
    }

    /// Fingerprint of the catalog the role's grants were last saved against.
    pub fn grants_fingerprint(&self, role: u64) -> Result<Option<String>> {
        self.read(|d, tx| Ok(d.meta.get(tx, &fp_key(role)).map_err(err)?.map(str::to_string)))
    }

    /// Clear all tables (for testing)
    pub fn clear_all(&self) -> Result<()> {
        self.write(|d, tx| {
            d.roles.clear(tx).map_err(err)?;
            d.grants.clear(tx).map_err(err)?;
            d.meta.clear(tx).map_err(err)
        })
    }
}

impl RoleStore for LmdbStore {
    fn load_catalog(&self) -> Result<Vec<PermissionNode>> {
        let json = self.read(|d, tx| Ok(d.meta.get(tx, META_CATALOG).map_err(err)?.map(str::to_string)))?;
        match json {
            Some(j) => Ok(serde_json::from_str(&j)?),
            None => Ok(Vec::new()),
        }
    }

    fn load_role(&self, role: u64) -> Result<Role> {
        let (name, grants) = self.read(|d, tx| {
            let name = d.roles.get(tx, &role).map_err(err)?.ok_or(PermTreeError::RoleNotFound(role))?;
            let grants = d.grants.get(tx, &role).map_err(err)?.unwrap_or("[]");
            Ok((name.to_string(), grants.to_string()))
        })?;
        Ok(Role::new(role, name, serde_json::from_str(&grants)?))
    }

    fn save_grants(&self, role: u64, paths: &[PermissionPath], catalog_fp: &str) -> Result<()> {
        let json = serde_json::to_string(paths)?;
        self.write(|d, tx| {
            if d.roles.get(tx, &role).map_err(err)?.is_none() {
                return Err(PermTreeError::RoleNotFound(role));
            }
            d.grants.put(tx, &role, &json).map_err(err)?;
            d.meta.put(tx, &fp_key(role), catalog_fp).map_err(err)
        })?;
        debug!(role, grants = paths.len(), "grants persisted");
        Ok(())
    }
}
