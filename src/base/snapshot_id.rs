//! Identity of one version of one document.

use std::cmp::Ordering;
use std::fmt;

use super::DocumentId;

/// A specific version of a specific document.
///
/// Used as the key of the parse cache and as the staleness test for
/// cached trees. Snapshot ids are values: they are never mutated, only
/// replaced by a fresh id when the document changes.
///
/// There is no `Ord` impl. Versions of different documents
/// have no meaningful order, so ordering is only reachable through
/// [`cmp_version`](Self::cmp_version), which answers `None` across
/// documents and forces callers to handle that case.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct SnapshotId {
    pub document: DocumentId,
    pub version: i32,
}

impl SnapshotId {
    #[inline]
    pub const fn new(document: DocumentId, version: i32) -> Self {
        Self { document, version }
    }

    /// Compare versions of two snapshots of the same document.
    ///
    /// Returns `None` when the snapshots belong to different documents.
    #[inline]
    pub fn cmp_version(&self, other: &SnapshotId) -> Option<Ordering> {
        (self.document == other.document).then(|| self.version.cmp(&other.version))
    }

    /// Whether `self` is an older version of the same document as `other`.
    #[inline]
    pub fn precedes(&self, other: &SnapshotId) -> bool {
        self.cmp_version(other) == Some(Ordering::Less)
    }

    /// Whether a tree cached under `self` must become unreachable once a
    /// tree for `newer` is published: same document, version not after
    /// `newer`'s.
    #[inline]
    pub fn is_superseded_by(&self, newer: &SnapshotId) -> bool {
        matches!(
            self.cmp_version(newer),
            Some(Ordering::Less | Ordering::Equal)
        )
    }
}

impl fmt::Debug for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SnapshotId({}@v{})", self.document, self.version)
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@v{}", self.document, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(doc: u32, version: i32) -> SnapshotId {
        SnapshotId::new(DocumentId::new(doc), version)
    }

    #[test]
    fn test_snapshot_id_equality_is_by_value() {
        assert_eq!(id(1, 2), id(1, 2));
        assert_ne!(id(1, 2), id(1, 3));
        assert_ne!(id(1, 2), id(2, 2));
    }

    #[test]
    fn test_cmp_version_same_document() {
        assert_eq!(id(1, 2).cmp_version(&id(1, 5)), Some(Ordering::Less));
        assert_eq!(id(1, 5).cmp_version(&id(1, 5)), Some(Ordering::Equal));
        assert_eq!(id(1, 6).cmp_version(&id(1, 5)), Some(Ordering::Greater));
    }

    #[test]
    fn test_cmp_version_across_documents_is_undefined() {
        assert_eq!(id(1, 2).cmp_version(&id(2, 5)), None);
        assert!(!id(1, 2).precedes(&id(2, 5)));
        assert!(!id(2, 5).precedes(&id(1, 2)));
    }

    #[test]
    fn test_is_superseded_by_includes_equal_versions() {
        let newer = id(1, 4);
        assert!(id(1, 3).is_superseded_by(&newer));
        assert!(id(1, 4).is_superseded_by(&newer));
        assert!(!id(1, 5).is_superseded_by(&newer));
        assert!(!id(2, 0).is_superseded_by(&newer));
    }

    #[test]
    fn test_snapshot_id_display() {
        assert_eq!(id(3, 9).to_string(), "doc#3@v9");
    }
}
