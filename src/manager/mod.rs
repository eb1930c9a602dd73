//! Versioned tree cache and reparse scheduling.
//!
//! [`SyntaxTreeManager`] owns an [`IncrementalParseCache`] of
//! [`ParseComputation`]s keyed by snapshot. Reads join an existing
//! computation or start a full parse; edits chain an incremental parse
//! after the pre-edit computation and publish it under the post-edit
//! snapshot, evicting older versions of the document.

mod cache;
mod computation;
mod config;
mod lru;
mod tree_manager;

pub use cache::IncrementalParseCache;
pub use computation::{ParseComputation, ParseKind};
pub use config::{DEFAULT_CACHE_CAPACITY, ManagerConfig};
pub use lru::LruCache;
pub use tree_manager::{EditRegistration, ManagerStats, SyntaxTreeManager};
