//! Error type shared by every layer of the crate.
//!
//! Parsing itself never fails: malformed input produces a tree with
//! embedded `Error` nodes. What can fail is the plumbing around it:
//! translating editor positions, validating edit ordering and joining a
//! parse task that panicked.

use smol_str::SmolStr;

use crate::base::{DocumentId, SnapshotId};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong outside of parsing proper.
///
/// `Clone` so a single failed [`ParseComputation`](crate::manager::ParseComputation)
/// can hand the same error to every waiter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A UTF-16 position addressed a line past the end of the document.
    #[error("position {line}:{character} is out of bounds")]
    PositionOutOfBounds { line: u32, character: u32 },

    /// A UTF-16 position pointed between the halves of a surrogate pair.
    #[error("position {line}:{character} splits a surrogate pair")]
    SplitSurrogatePair { line: u32, character: u32 },

    /// A range whose end precedes its start.
    #[error("range end {end} precedes start {start}")]
    InvertedRange { start: u32, end: u32 },

    /// A byte edit that reaches past the end of the text it applies to,
    /// or does not fall on a character boundary.
    #[error("edit {start}..{end} does not fit text of length {len}")]
    EditOutOfBounds { start: u32, end: u32, len: u32 },

    /// Two sequential edits that cannot be composed.
    #[error("edits overlap at {start}..{end}")]
    OverlappingEdits { start: u32, end: u32 },

    #[error("document `{0}` is not open")]
    DocumentNotOpen(SmolStr),

    #[error("document `{0}` is already open")]
    DocumentAlreadyOpen(SmolStr),

    /// A change whose version does not move the document forward.
    #[error("version {new} of {document} does not follow version {current}")]
    StaleVersion {
        document: DocumentId,
        current: i32,
        new: i32,
    },

    /// `register_edit` was handed snapshots of two different documents.
    #[error("edit based on {pre} cannot produce {post}")]
    DocumentMismatch { pre: DocumentId, post: DocumentId },

    /// `register_edit` was handed a post-edit version that does not
    /// follow the pre-edit version.
    #[error("edit from {pre} to {post} is out of order")]
    OutOfOrderEdit { pre: SnapshotId, post: SnapshotId },

    /// The task computing a tree panicked or was aborted by the runtime.
    #[error("parse task for {snapshot} failed: {reason}")]
    ParseTaskFailed { snapshot: SnapshotId, reason: SmolStr },
}
