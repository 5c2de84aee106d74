//! Catalog input shapes: nested nodes and flat parent-linked records

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;
use crate::path::PermissionPath;

/// A named capability with ordered children, as delivered by the catalog source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionNode {
    pub name: String,
    #[serde(
        default,
        rename = "sub_permissions",
        alias = "children",
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<PermissionNode>,
}

fn null_as_empty<'de, D>(d: D) -> std::result::Result<Vec<PermissionNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<PermissionNode>>::deserialize(d)?.unwrap_or_default())
}

impl PermissionNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        Self { name: name.into(), children: Vec::new() }
    }

    pub fn new(name: impl Into<String>, children: Vec<PermissionNode>) -> Self {
        Self { name: name.into(), children }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first, sibling-ordered walk of this node and everything below it.
    /// Depth is counted from this node (0).
    pub fn flatten(&self) -> Result<Vec<(PermissionPath, usize)>> {
        let mut out = Vec::new();
        let root = PermissionPath::from_segments([&self.name])?;
        flatten_into(self, root, 0, &mut out)?;
        Ok(out)
    }
}

fn flatten_into(
    node: &PermissionNode,
    path: PermissionPath,
    depth: usize,
    out: &mut Vec<(PermissionPath, usize)>,
) -> Result<()> {
    out.push((path.clone(), depth));
    for child in &node.children {
        flatten_into(child, path.child(&child.name)?, depth + 1, out)?;
    }
    Ok(())
}

/// Flat catalog row (`{id, name, parent_id}`) as many REST backends return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
}

impl CatalogRecord {
    pub fn new(id: u64, name: impl Into<String>, parent_id: Option<u64>) -> Self {
        Self { id, name: name.into(), parent_id }
    }
}
