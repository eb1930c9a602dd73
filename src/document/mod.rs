//! Versioned document text.
//!
//! Editors send changes as UTF-16 line/column ranges, each relative to the
//! text left by the previous change. This layer turns them into immutable
//! [`DocumentSnapshot`]s plus the byte [`EditSet`](crate::syntax::EditSet)
//! the incremental parser needs.

mod snapshot;
mod store;

pub use crate::base::{Utf16Position, Utf16Range};
pub use snapshot::{ContentChange, DocumentSnapshot};
pub use store::{DocumentStore, EditedDocument};
