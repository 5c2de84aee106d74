//! Permtree - role permission-tree assignment engine
//!
//! Grantable capabilities form a tree of named nodes addressed by dotted
//! paths (`bookings.delete.own`). A role's grants are a flat set of paths;
//! toggling a node cascades to its subtree, promotes ancestors whose children
//! are all granted, and demotes every ancestor on revoke.
//!
//! ```
//! use permtree::*;
//!
//! let catalog = Catalog::from_nodes(&[
//!     PermissionNode::new("bookings", vec![PermissionNode::leaf("create"), PermissionNode::leaf("delete")]),
//! ]).unwrap();
//!
//! let s = toggle("bookings.create", &SelectionSet::new(), &catalog);
//! assert!(s.is_partially_selected("bookings", &catalog));
//! let s = toggle("bookings.delete", &s, &catalog);
//! assert!(s.is_selected("bookings"));
//! ```

pub mod catalog;
pub mod config;
pub mod constants;
pub mod db;
pub mod editor;
pub mod error;
pub mod filter;
pub mod node;
pub mod path;
pub mod propagate;
pub mod selection;
pub mod store;

pub use catalog::{descendants_in, Catalog};
pub use config::{CatalogConfig, Config, ConfigLoader, EditorConfig, StoreConfig};
pub use constants::{MAX_CATALOG_DEPTH, PATH_SEPARATOR};
pub use db::LmdbStore;
pub use editor::PermissionEditor;
pub use error::{PermTreeError, Result};
pub use filter::{filter_roots, matching_paths};
pub use node::{CatalogRecord, PermissionNode};
pub use path::PermissionPath;
pub use propagate::{grant, revoke, seed, toggle};
pub use selection::{CheckState, SelectionSet};
pub use store::{MemoryStore, Role, RoleStore};
