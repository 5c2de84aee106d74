//! Path syntax, limits and storage names

/// Separator between segments of a permission path (`bookings.delete.own`)
pub const PATH_SEPARATOR: char = '.';

/// Deepest catalog accepted at load time (observed catalogs are 4 deep)
pub const MAX_CATALOG_DEPTH: usize = 16;

// LMDB store defaults
pub const DEFAULT_STORE_PATH: &str = "permtree_data";
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

// Environment overrides (prefixed, e.g. PERMTREE_STORE_PATH)
pub const DEFAULT_ENV_PREFIX: &str = "PERMTREE";
pub const ENV_STORE_PATH: &str = "STORE_PATH";
pub const ENV_MAP_SIZE: &str = "MAP_SIZE";
pub const ENV_RETAIN_STALE: &str = "RETAIN_STALE";
pub const ENV_MAX_DEPTH: &str = "MAX_DEPTH";

// LMDB sub-database names
pub(crate) const DB_ROLES: &str = "roles";
pub(crate) const DB_GRANTS: &str = "grants";
pub(crate) const DB_META: &str = "meta";
pub(crate) const META_CATALOG: &str = "catalog";
