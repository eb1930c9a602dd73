//! Immutable document versions and editor change translation.

use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::base::{LineIndex, SnapshotId, TextRange, Utf16Range};
use crate::error::{Error, Result};
use crate::syntax::{EditSet, TextEdit};

/// One editor change, in the shape of an LSP
/// `TextDocumentContentChangeEvent`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentChange {
    /// Range to replace. `None` replaces the whole document.
    pub range: Option<Utf16Range>,
    pub text: String,
}

impl ContentChange {
    pub fn replace(range: Utf16Range, text: impl Into<String>) -> Self {
        Self {
            range: Some(range),
            text: text.into(),
        }
    }

    pub fn full(text: impl Into<String>) -> Self {
        Self {
            range: None,
            text: text.into(),
        }
    }
}

/// A specific version of a document's text.
///
/// Cloning shares the text and line index.
#[derive(Clone)]
pub struct DocumentSnapshot {
    id: SnapshotId,
    uri: SmolStr,
    text: Arc<str>,
    line_index: Arc<LineIndex>,
}

impl DocumentSnapshot {
    pub fn new(id: SnapshotId, uri: impl Into<SmolStr>, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let line_index = Arc::new(LineIndex::new(&text));
        Self {
            id,
            uri: uri.into(),
            text,
            line_index,
        }
    }

    pub fn id(&self) -> SnapshotId {
        self.id
    }

    pub fn version(&self) -> i32 {
        self.id.version
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn text(&self) -> &Arc<str> {
        &self.text
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    /// Apply editor changes, producing the next version and the byte
    /// edits that lead to it from this one.
    ///
    /// Each change is positioned against the text left by the change
    /// before it. A change without a range replaces the whole text, but
    /// is narrowed to the bytes that actually differ so unchanged parts
    /// of the tree stay reusable.
    pub fn apply_changes(
        &self,
        version: i32,
        changes: &[ContentChange],
    ) -> Result<(DocumentSnapshot, EditSet)> {
        if version <= self.id.version {
            return Err(Error::StaleVersion {
                document: self.id.document,
                current: self.id.version,
                new: version,
            });
        }

        let mut text = self.text.to_string();
        let mut line_index = Arc::clone(&self.line_index);
        let mut edits = Vec::with_capacity(changes.len());
        for change in changes {
            let edit = match change.range {
                Some(range) => {
                    let start = line_index.offset_utf16(range.start)?;
                    let end = line_index.offset_utf16(range.end)?;
                    if end < start {
                        return Err(Error::InvertedRange {
                            start: start.into(),
                            end: end.into(),
                        });
                    }
                    TextEdit::replace(TextRange::new(start, end), change.text.as_str())
                }
                None => match TextEdit::diff(&text, &change.text) {
                    Some(edit) => edit,
                    None => continue,
                },
            };
            text.replace_range(
                usize::from(edit.range.start())..usize::from(edit.range.end()),
                &edit.replacement,
            );
            line_index = Arc::new(LineIndex::new(&text));
            edits.push(edit);
        }
        let edits = EditSet::from_sequential(edits)?;

        let next = DocumentSnapshot {
            id: SnapshotId::new(self.id.document, version),
            uri: self.uri.clone(),
            text: Arc::from(text),
            line_index,
        };
        Ok((next, edits))
    }
}

impl fmt::Debug for DocumentSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSnapshot")
            .field("id", &self.id)
            .field("uri", &self.uri)
            .field("len", &self.text.len())
            .finish()
    }
}
