//! URI interning for document identifiers.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

use super::DocumentId;

/// Assigns stable [`DocumentId`]s to document URIs.
///
/// Ids are never recycled: a URI that is closed and reopened gets the
/// same id back, so trees cached under an old id can never be confused
/// with a different document.
///
/// Thread-safe via internal locking.
#[derive(Default)]
pub struct UriInterner {
    inner: RwLock<InternerInner>,
}

#[derive(Default)]
struct InternerInner {
    /// Map from URI to id
    map: FxHashMap<SmolStr, DocumentId>,
    /// Storage of all interned URIs, indexed by id
    uris: Vec<SmolStr>,
}

impl UriInterner {
    /// Create a new empty interner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a URI, returning its `DocumentId`.
    ///
    /// If the URI has been interned before, returns the existing id.
    pub fn intern(&self, uri: &str) -> DocumentId {
        // Fast path: check if already interned (read lock)
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.map.get(uri) {
                return id;
            }
        }

        // Slow path: need to insert (write lock)
        let mut inner = self.inner.write();

        // Double-check after acquiring write lock
        if let Some(&id) = inner.map.get(uri) {
            return id;
        }

        let smol = SmolStr::new(uri);
        let id = DocumentId::new(inner.uris.len() as u32);
        inner.uris.push(smol.clone());
        inner.map.insert(smol, id);

        id
    }

    /// Look up the id of a URI without interning it.
    pub fn get(&self, uri: &str) -> Option<DocumentId> {
        self.inner.read().map.get(uri).copied()
    }

    /// Look up the URI for a `DocumentId`.
    ///
    /// Returns `None` if the id was created by a different interner.
    pub fn lookup(&self, id: DocumentId) -> Option<SmolStr> {
        let inner = self.inner.read();
        inner.uris.get(id.index() as usize).cloned()
    }

    /// Get the number of interned URIs.
    pub fn len(&self) -> usize {
        self.inner.read().uris.len()
    }

    /// Check if the interner is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for UriInterner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("UriInterner")
            .field("count", &inner.uris.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_same_uri() {
        let interner = UriInterner::new();

        let a = interner.intern("file:///a.fn");
        let b = interner.intern("file:///a.fn");

        assert_eq!(a, b);
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_intern_different_uris() {
        let interner = UriInterner::new();

        let a = interner.intern("file:///a.fn");
        let b = interner.intern("file:///b.fn");

        assert_ne!(a, b);
        assert_eq!(interner.len(), 2);
    }

    #[test]
    fn test_lookup_and_get() {
        let interner = UriInterner::new();
        assert_eq!(interner.get("file:///t.fn"), None);

        let id = interner.intern("file:///t.fn");

        assert_eq!(interner.get("file:///t.fn"), Some(id));
        assert_eq!(interner.lookup(id).as_deref(), Some("file:///t.fn"));
        assert_eq!(interner.lookup(DocumentId::new(99)), None);
    }
}
