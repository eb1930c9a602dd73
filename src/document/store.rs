//! Open document tracking.

use indexmap::IndexMap;
use parking_lot::RwLock;
use smol_str::SmolStr;

use super::{ContentChange, DocumentSnapshot};
use crate::base::{DocumentId, SnapshotId, UriInterner};
use crate::error::{Error, Result};
use crate::syntax::EditSet;

/// The result of applying editor changes: both versions and the byte
/// edits between them, ready for
/// [`SyntaxTreeManager::register_edit`](crate::manager::SyntaxTreeManager::register_edit).
#[derive(Clone, Debug)]
pub struct EditedDocument {
    pub before: DocumentSnapshot,
    pub after: DocumentSnapshot,
    pub edits: EditSet,
}

/// Latest snapshot of every open document.
///
/// URIs map to stable `DocumentId`s that survive close and reopen.
#[derive(Debug, Default)]
pub struct DocumentStore {
    uris: UriInterner,
    open: RwLock<IndexMap<DocumentId, DocumentSnapshot>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a document.
    pub fn open(&self, uri: &str, version: i32, text: &str) -> Result<DocumentSnapshot> {
        let document = self.uris.intern(uri);
        let mut open = self.open.write();
        if open.contains_key(&document) {
            return Err(Error::DocumentAlreadyOpen(SmolStr::new(uri)));
        }
        let snapshot = DocumentSnapshot::new(SnapshotId::new(document, version), uri, text);
        open.insert(document, snapshot.clone());
        tracing::debug!(%document, version, uri, "document opened");
        Ok(snapshot)
    }

    /// Apply editor changes to an open document.
    ///
    /// Nothing is recorded if any change fails to translate.
    pub fn change(&self, uri: &str, version: i32, changes: &[ContentChange]) -> Result<EditedDocument> {
        let document = self.document_id(uri)?;
        let mut open = self.open.write();
        let before = open
            .get(&document)
            .cloned()
            .ok_or_else(|| Error::DocumentNotOpen(SmolStr::new(uri)))?;
        let (after, edits) = before.apply_changes(version, changes)?;
        open.insert(document, after.clone());
        tracing::debug!(%document, version, edits = edits.len(), "document changed");
        Ok(EditedDocument { before, after, edits })
    }

    /// Stop tracking a document. The returned id should be passed on to
    /// [`SyntaxTreeManager::clear`](crate::manager::SyntaxTreeManager::clear).
    pub fn close(&self, uri: &str) -> Result<DocumentId> {
        let document = self.document_id(uri)?;
        self.open
            .write()
            .shift_remove(&document)
            .ok_or_else(|| Error::DocumentNotOpen(SmolStr::new(uri)))?;
        tracing::debug!(%document, uri, "document closed");
        Ok(document)
    }

    /// Latest snapshot of an open document.
    pub fn latest(&self, uri: &str) -> Option<DocumentSnapshot> {
        let document = self.uris.get(uri)?;
        self.open.read().get(&document).cloned()
    }

    /// Id assigned to `uri`, if it was ever opened.
    pub fn document_id(&self, uri: &str) -> Result<DocumentId> {
        self.uris
            .get(uri)
            .ok_or_else(|| Error::DocumentNotOpen(SmolStr::new(uri)))
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.open.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
