//! # treecache
//!
//! Versioned syntax-tree cache with incremental reparse scheduling for
//! language servers.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! manager   → SyntaxTreeManager, IncrementalParseCache, ParseComputation
//!   ↓
//! document  → DocumentSnapshot, DocumentStore, UTF-16 content changes
//!   ↓
//! syntax    → Lexer, error-tolerant parser, incremental reparse, EditSet
//!   ↓
//! base      → Primitives (DocumentId, SnapshotId, TextRange, LineIndex)
//! ```
//!
//! ## Typical flow
//!
//! An editor opens a document through [`DocumentStore::open`] and asks
//! [`SyntaxTreeManager::tree_for`] for its tree. Each change goes through
//! [`DocumentStore::change`], which yields the pre-edit and post-edit
//! snapshots plus the byte edits between them; handing those to
//! [`SyntaxTreeManager::register_edit`] schedules an incremental reparse
//! that later `tree_for` calls pick up.

/// Foundation types: DocumentId, SnapshotId, positions and line indexes
pub mod base;

/// Syntax trees, the parser and incremental reparsing
pub mod syntax;

/// Versioned document text and editor change translation
pub mod document;

/// The parse cache and the tree manager
pub mod manager;

mod error;

pub use base::{DocumentId, LineCol, LineIndex, SnapshotId, TextRange, TextSize};
pub use document::{ContentChange, DocumentSnapshot, DocumentStore, EditedDocument};
pub use error::{Error, Result};
pub use manager::{EditRegistration, ManagerConfig, SyntaxTreeManager};
pub use syntax::{EditSet, IncrementalParser, ParseResult, Parser, SyntaxTree, TextEdit};
