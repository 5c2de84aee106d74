//! Permission tree model
//!
//! The catalog is stored as an arena in depth-first, sibling-ordered layout:
//! - `paths[i]` is the dotted path of node `i`
//! - every subtree occupies the contiguous range `[i, end)`
//! - ancestor, child and descendant lookups are index reads, never tree walks
//!
//! Construction is the only place the tree shape is validated. Lookups on
//! paths that are not in the catalog return empty results.

use std::collections::{HashMap, HashSet};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::constants::{MAX_CATALOG_DEPTH, PATH_SEPARATOR};
use crate::error::{invalid_catalog, Result};
use crate::node::{CatalogRecord, PermissionNode};
use crate::path::{is_strictly_below, PermissionPath};

#[derive(Debug, Clone)]
struct Slot {
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    /// One past the last descendant
    end: usize,
}

/// Immutable, validated permission tree for one editing session.
#[derive(Debug, Clone)]
pub struct Catalog {
    paths: Vec<PermissionPath>,
    slots: Vec<Slot>,
    index: HashMap<PermissionPath, usize>,
    by_name: HashMap<String, Vec<usize>>,
    roots: Vec<usize>,
}

impl Catalog {
    /// Build from nested nodes with the default depth guard.
    pub fn from_nodes(roots: &[PermissionNode]) -> Result<Self> {
        Self::with_max_depth(roots, MAX_CATALOG_DEPTH)
    }

    /// Build from nested nodes, rejecting empty names, names containing the
    /// path separator, duplicate sibling names and trees deeper than `max_depth`.
    pub fn with_max_depth(roots: &[PermissionNode], max_depth: usize) -> Result<Self> {
        let mut b = Builder { cat: Catalog::empty(), max_depth };
        let mut seen = HashSet::new();
        for node in roots {
            if !seen.insert(node.name.as_str()) {
                return Err(invalid_catalog(format!("duplicate root '{}'", node.name)));
            }
            let idx = b.push(node, None, 0)?;
            b.cat.roots.push(idx);
        }
        let cat = b.cat;
        debug!(nodes = cat.len(), roots = cat.roots.len(), "catalog built");
        Ok(cat)
    }

    /// Assemble flat `{id, name, parent_id}` rows into a tree. Sibling order
    /// follows record order. Unknown parents and parent cycles are rejected.
    pub fn from_records(records: &[CatalogRecord]) -> Result<Self> {
        Self::records_with_max_depth(records, MAX_CATALOG_DEPTH)
    }

    pub fn records_with_max_depth(records: &[CatalogRecord], max_depth: usize) -> Result<Self> {
        let mut parents: HashMap<u64, Option<u64>> = HashMap::with_capacity(records.len());
        for r in records {
            if parents.insert(r.id, r.parent_id).is_some() {
                return Err(invalid_catalog(format!("duplicate record id {}", r.id)));
            }
        }
        for r in records {
            no_cycle(&parents, r.id, max_depth)?;
        }

        let mut kids: HashMap<Option<u64>, Vec<&CatalogRecord>> = HashMap::new();
        for r in records {
            kids.entry(r.parent_id).or_default().push(r);
        }
        let roots = assemble(&kids, None);
        Self::with_max_depth(&roots, max_depth)
    }

    /// Parse the nested JSON catalog (`name` + optional `sub_permissions`).
    pub fn from_json(json: &str) -> Result<Self> {
        let roots: Vec<PermissionNode> = serde_json::from_str(json)?;
        Self::from_nodes(&roots)
    }

    fn empty() -> Self {
        Catalog {
            paths: Vec::new(),
            slots: Vec::new(),
            index: HashMap::new(),
            by_name: HashMap::new(),
            roots: Vec::new(),
        }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    #[inline]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[inline]
    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Resolve a path to the catalog's own copy.
    #[inline]
    pub fn get(&self, path: &str) -> Option<&PermissionPath> {
        self.index.get(path).map(|&i| &self.paths[i])
    }

    /// Every path in render order.
    #[inline]
    pub fn universe(&self) -> &[PermissionPath] {
        &self.paths
    }

    pub fn roots(&self) -> impl Iterator<Item = &PermissionPath> {
        self.roots.iter().map(move |&i| &self.paths[i])
    }

    /// Whole tree as `(path, depth)` in depth-first order. Roots have depth 0.
    pub fn flatten(&self) -> impl Iterator<Item = (&PermissionPath, usize)> {
        self.paths.iter().zip(self.slots.iter().map(|s| s.depth))
    }

    /// `path` and everything below it as `(path, depth)`; empty if unknown.
    pub fn flatten_from(&self, path: &str) -> Vec<(&PermissionPath, usize)> {
        match self.index.get(path) {
            Some(&i) => (i..self.slots[i].end).map(|j| (&self.paths[j], self.slots[j].depth)).collect(),
            None => Vec::new(),
        }
    }

    /// All paths strictly below `path`; empty for leaves and unknown paths.
    pub fn descendants_of(&self, path: &str) -> &[PermissionPath] {
        match self.index.get(path) {
            Some(&i) => &self.paths[i + 1..self.slots[i].end],
            None => &[],
        }
    }

    /// Immediate parent; `None` for roots and unknown paths.
    pub fn parent_of(&self, path: &str) -> Option<&PermissionPath> {
        let &i = self.index.get(path)?;
        self.slots[i].parent.map(|p| &self.paths[p])
    }

    /// Paths exactly one level below `path`, in sibling order.
    pub fn direct_children_of(&self, path: &str) -> impl Iterator<Item = &PermissionPath> {
        let kids: &[usize] = match self.index.get(path) {
            Some(&i) => &self.slots[i].children,
            None => &[],
        };
        kids.iter().map(move |&c| &self.paths[c])
    }

    pub fn depth_of(&self, path: &str) -> Option<usize> {
        self.index.get(path).map(|&i| self.slots[i].depth)
    }

    /// True for known paths without children.
    pub fn is_leaf(&self, path: &str) -> bool {
        self.index.get(path).map(|&i| self.slots[i].children.is_empty()).unwrap_or(false)
    }

    // ========================================================================
    // Grant normalization
    // ========================================================================

    /// Map a stored grant (bare name or dotted path) onto a catalog path.
    ///
    /// Dotted grants must match exactly. A bare name resolves to the root of
    /// that name, otherwise to the single node carrying it. Unknown and
    /// ambiguous grants yield `None`.
    pub fn normalize_grant(&self, raw: &str) -> Option<PermissionPath> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if let Some(p) = self.get(raw) {
            return Some(p.clone());
        }
        if raw.contains(PATH_SEPARATOR) {
            return None;
        }
        match self.by_name.get(raw).map(Vec::as_slice) {
            Some([only]) => Some(self.paths[*only].clone()),
            Some(many) if many.len() > 1 => {
                warn!(grant = raw, candidates = many.len(), "ambiguous bare grant name");
                None
            }
            _ => None,
        }
    }

    /// SHA-256 over the path universe in render order, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for p in &self.paths {
            hasher.update(p.as_str().as_bytes());
            hasher.update(b"\n");
        }
        hex::encode(hasher.finalize())
    }
}

/// Descendants of `path` found by prefix filtering a flat path universe.
///
/// Works without the tree: only needs the paths. Returns nothing when `path`
/// itself is absent from `universe`.
pub fn descendants_in<'a>(universe: &'a [PermissionPath], path: &str) -> Vec<&'a PermissionPath> {
    if !universe.iter().any(|p| p.as_str() == path) {
        return Vec::new();
    }
    universe.iter().filter(|p| is_strictly_below(p.as_str(), path)).collect()
}

// ============================================================================
// Construction
// ============================================================================

struct Builder {
    cat: Catalog,
    max_depth: usize,
}

impl Builder {
    fn push(&mut self, node: &PermissionNode, parent: Option<usize>, depth: usize) -> Result<usize> {
        if depth >= self.max_depth {
            return Err(invalid_catalog(format!(
                "'{}' exceeds max depth {}",
                node.name, self.max_depth
            )));
        }
        if node.name.is_empty() {
            return Err(invalid_catalog("empty permission name"));
        }
        if node.name.contains(PATH_SEPARATOR) {
            return Err(invalid_catalog(format!(
                "name '{}' contains '{}'",
                node.name, PATH_SEPARATOR
            )));
        }
        let path = match parent {
            Some(p) => self.cat.paths[p].child(&node.name)?,
            None => PermissionPath::parse(&node.name)?,
        };

        let idx = self.cat.paths.len();
        self.cat.index.insert(path.clone(), idx);
        self.cat.by_name.entry(node.name.clone()).or_default().push(idx);
        self.cat.paths.push(path);
        self.cat.slots.push(Slot { depth, parent, children: Vec::with_capacity(node.children.len()), end: idx + 1 });

        let mut seen = HashSet::new();
        for child in &node.children {
            if !seen.insert(child.name.as_str()) {
                return Err(invalid_catalog(format!(
                    "duplicate name '{}' under '{}'",
                    child.name, self.cat.paths[idx]
                )));
            }
            let c = self.push(child, Some(idx), depth + 1)?;
            self.cat.slots[idx].children.push(c);
        }
        self.cat.slots[idx].end = self.cat.paths.len();
        Ok(idx)
    }
}

/// Walk the parent chain of `start`; fails on self-reference, cycles,
/// dangling parents and chains longer than `max_depth`.
fn no_cycle(parents: &HashMap<u64, Option<u64>>, start: u64, max_depth: usize) -> Result<()> {
    let mut cur = start;
    for _ in 0..max_depth {
        match parents.get(&cur) {
            Some(Some(p)) if *p == start => {
                return Err(if cur == start {
                    invalid_catalog(format!("record {} is its own parent", start))
                } else {
                    invalid_catalog(format!("circular parent chain through record {}", start))
                });
            }
            Some(Some(p)) => {
                if !parents.contains_key(p) {
                    return Err(invalid_catalog(format!("record {} has unknown parent {}", cur, p)));
                }
                cur = *p;
            }
            Some(None) => return Ok(()),
            None => return Err(invalid_catalog(format!("unknown record {}", cur))),
        }
    }
    Err(invalid_catalog(format!(
        "record {} is deeper than {} or part of a cycle",
        start, max_depth
    )))
}

fn assemble(kids: &HashMap<Option<u64>, Vec<&CatalogRecord>>, parent: Option<u64>) -> Vec<PermissionNode> {
    kids.get(&parent)
        .map(|rs| {
            rs.iter()
                .map(|r| PermissionNode::new(r.name.clone(), assemble(kids, Some(r.id))))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================
