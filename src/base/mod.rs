//! Foundation types for the tree cache.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`DocumentId`] - Interned document identifiers
//! - [`SnapshotId`] - One version of one document
//! - [`TextRange`], [`TextSize`] - Byte positions
//! - [`LineCol`], [`LineIndex`] - Line/column and UTF-16 conversion
//! - [`UriInterner`] - URI to `DocumentId` interning
//!
//! This module has NO dependencies on other crate modules except the
//! error type.

mod document_id;
mod intern;
mod snapshot_id;
mod span;

pub use document_id::DocumentId;
pub use intern::UriInterner;
pub use snapshot_id::SnapshotId;
pub use span::{LineCol, LineIndex, TextRange, TextSize, Utf16Position, Utf16Range};

// Re-export text-size types for convenience
pub use text_size;
