//! Identifiers for open documents.

use std::fmt;

/// Identifies a document independently of its version.
///
/// Handed out by [`UriInterner`](super::UriInterner), one per URI, and
/// never reused for another URI. A document that is closed and reopened
/// keeps its id, so cache entries can be dropped per document with a
/// plain equality test on the key.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct DocumentId(pub u32);

impl DocumentId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Position of the URI in the interner that assigned this id.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

/// `doc#N`, the form used in log fields and error messages.
impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::SnapshotId;

    #[test]
    fn test_display_and_debug() {
        assert_eq!(DocumentId::new(7).to_string(), "doc#7");
        assert_eq!(format!("{:?}", DocumentId::new(7)), "DocumentId(7)");
    }

    #[test]
    fn test_versions_of_one_document_share_the_id() {
        let v1 = SnapshotId::new(DocumentId::new(2), 1);
        let v2 = SnapshotId::new(DocumentId::new(2), 2);
        let other = SnapshotId::new(DocumentId::new(3), 1);

        assert_eq!(v1.document, v2.document);
        assert_ne!(v1.document, other.document);
        assert_eq!(v2.to_string(), "doc#2@v2");
    }
}
