//! Dotted permission paths.
//!
//! Format: `segment(.segment)*`, e.g. `bookings.delete.own`
//!
//! A path is the only identifier exchanged with role stores. It is validated on
//! construction so every segment is non-empty; whether the path exists in a
//! given catalog is a separate question answered by [`crate::Catalog`].

use std::borrow::Borrow;
use std::fmt;

use crate::constants::PATH_SEPARATOR;
use crate::error::{PermTreeError, Result};

/// Canonical identifier of a permission node.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PermissionPath(String);

impl PermissionPath {
    /// Parse a dotted path.
    ///
    /// # Example
    /// ```
    /// use permtree::PermissionPath;
    /// let p = PermissionPath::parse("bookings.create").unwrap();
    /// assert_eq!(p.name(), "create");
    /// assert_eq!(p.depth(), 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() || s.split(PATH_SEPARATOR).any(str::is_empty) {
            return Err(PermTreeError::InvalidPath(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    /// Build a path from its segments. Segments must be non-empty and free of
    /// the separator.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out = String::new();
        for seg in segments {
            let seg = seg.as_ref();
            if seg.is_empty() || seg.contains(PATH_SEPARATOR) {
                return Err(PermTreeError::InvalidPath(seg.to_string()));
            }
            if !out.is_empty() {
                out.push(PATH_SEPARATOR);
            }
            out.push_str(seg);
        }
        if out.is_empty() {
            return Err(PermTreeError::InvalidPath(out));
        }
        Ok(Self(out))
    }

    /// Extend this path by one segment.
    pub fn child(&self, name: &str) -> Result<Self> {
        if name.is_empty() || name.contains(PATH_SEPARATOR) {
            return Err(PermTreeError::InvalidPath(format!("{}{}{}", self.0, PATH_SEPARATOR, name)));
        }
        Ok(Self(format!("{}{}{}", self.0, PATH_SEPARATOR, name)))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last segment (the node's own name).
    #[inline]
    pub fn name(&self) -> &str {
        match self.0.rfind(PATH_SEPARATOR) {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    /// Number of separators; roots have depth 0.
    #[inline]
    pub fn depth(&self) -> usize {
        self.0.matches(PATH_SEPARATOR).count()
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        !self.0.contains(PATH_SEPARATOR)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(PATH_SEPARATOR)
    }

    /// The path with its last segment removed; `None` for a root.
    pub fn parent(&self) -> Option<Self> {
        parent_str(&self.0).map(|p| Self(p.to_string()))
    }

    /// Ancestors from the immediate parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        std::iter::successors(parent_str(&self.0), |p| parent_str(p))
    }

    /// Strict descendant test: `a.b` is below `a`, `ab` is not.
    #[inline]
    pub fn is_descendant_of(&self, other: &str) -> bool {
        is_strictly_below(&self.0, other)
    }
}

/// `path` with its last segment removed, on plain strings.
#[inline]
pub(crate) fn parent_str(path: &str) -> Option<&str> {
    path.rfind(PATH_SEPARATOR).map(|i| &path[..i])
}

/// True when `path` starts with `ancestor` followed by the separator.
#[inline]
pub(crate) fn is_strictly_below(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(PATH_SEPARATOR)
}

// ============================================================================
// Trait implementations
// ============================================================================

impl fmt::Display for PermissionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PermissionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Borrow<str> for PermissionPath {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PermissionPath {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for PermissionPath {
    type Error = PermTreeError;

    fn try_from(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PermissionPath {
    type Error = PermTreeError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PermissionPath> for String {
    fn from(p: PermissionPath) -> Self {
        p.0
    }
}

// ============================================================================
// Serde support (plain dotted string on the wire)
// ============================================================================

impl serde::Serialize for PermissionPath {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PermissionPath {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_accessors() {
        let p = PermissionPath::parse("bookings.delete.own").unwrap();
        assert_eq!(p.as_str(), "bookings.delete.own");
        assert_eq!(p.name(), "own");
        assert_eq!(p.depth(), 2);
        assert!(!p.is_root());
        assert_eq!(p.segments().collect::<Vec<_>>(), vec!["bookings", "delete", "own"]);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(PermissionPath::parse("").is_err());
        assert!(PermissionPath::parse(".bookings").is_err());
        assert!(PermissionPath::parse("bookings.").is_err());
        assert!(PermissionPath::parse("bookings..create").is_err());
    }

    #[test]
    fn test_parent() {
        let p = PermissionPath::parse("bookings.delete.own").unwrap();
        assert_eq!(p.parent().unwrap().as_str(), "bookings.delete");
        assert!(PermissionPath::parse("bookings").unwrap().parent().is_none());
    }

    #[test]
    fn test_ancestors() {
        let p = PermissionPath::parse("a.b.c.d").unwrap();
        assert_eq!(p.ancestors().collect::<Vec<_>>(), vec!["a.b.c", "a.b", "a"]);
        assert_eq!(PermissionPath::parse("a").unwrap().ancestors().count(), 0);
    }

    #[test]
    fn test_descendant_needs_separator() {
        let p = PermissionPath::parse("bookings.create").unwrap();
        assert!(p.is_descendant_of("bookings"));
        assert!(!p.is_descendant_of("bookings.create"));
        assert!(!p.is_descendant_of("book"));

        let q = PermissionPath::parse("bookingsx.create").unwrap();
        assert!(!q.is_descendant_of("bookings"));
    }

    #[test]
    fn test_from_segments_and_child() {
        let p = PermissionPath::from_segments(["guests", "create"]).unwrap();
        assert_eq!(p.as_str(), "guests.create");
        assert_eq!(p.child("bulk").unwrap().as_str(), "guests.create.bulk");
        assert!(p.child("a.b").is_err());
        assert!(p.child("").is_err());
        assert!(PermissionPath::from_segments(Vec::<&str>::new()).is_err());
        assert!(PermissionPath::from_segments(["a.b"]).is_err());
    }

    #[test]
    fn test_borrow_lookup() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(PermissionPath::parse("guests").unwrap());
        assert!(set.contains("guests"));
        assert!(!set.contains("guests.create"));
    }

    #[test]
    fn test_serde_as_string() {
        let p = PermissionPath::parse("payments.refund").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"payments.refund\"");
        let back: PermissionPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<PermissionPath>("\"a..b\"").is_err());
    }

    #[test]
    fn test_unicode() {
        let p = PermissionPath::parse("予約.作成").unwrap();
        assert_eq!(p.name(), "作成");
        assert_eq!(p.parent().unwrap().as_str(), "予約");
    }
}
