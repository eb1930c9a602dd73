//! Editor session end to end: document store feeding the tree manager.

use std::sync::Arc;

use parking_lot::Mutex;
use treecache::document::{Utf16Position, Utf16Range};
use treecache::syntax::{ReuseObserver, ReusedSyntax, SyntaxKind};
use treecache::{
    ContentChange, DocumentStore, EditRegistration, IncrementalParser, ManagerConfig,
    SyntaxTreeManager,
};

const URI: &str = "file:///main.fn";

fn insert_at(line: u32, character: u32, text: &str) -> ContentChange {
    let at = Utf16Position::new(line, character);
    ContentChange::replace(Utf16Range::new(at, at), text)
}

#[tokio::test]
async fn test_open_edit_reparse_and_stale_read() {
    let store = DocumentStore::new();
    let manager = SyntaxTreeManager::new(
        IncrementalParser,
        ManagerConfig::default(),
        tokio::runtime::Handle::current(),
    );
    let seen: Arc<Mutex<Vec<ReusedSyntax>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let observer: ReuseObserver = Arc::new(move |reused| sink.lock().push(reused));
    manager.set_reuse_observer(Some(observer));

    let v0 = store.open(URI, 0, "func f() {}").unwrap();
    let tree = manager.tree_for(&v0).await.unwrap();
    assert_eq!(tree.tree().to_string(), "func f() {}");
    assert_eq!(manager.stats().full_parses, 1);

    // Insert inside the braces.
    let edited = store.change(URI, 1, &[insert_at(0, 10, "x")]).unwrap();
    assert_eq!(
        manager
            .register_edit(&edited.before, &edited.after, edited.edits.clone())
            .unwrap(),
        EditRegistration::Incremental
    );

    let v1 = manager.tree_for(&edited.after).await.unwrap();
    assert_eq!(v1.tree().to_string(), "func f() {x}");
    assert!(!v1.tree().has_errors());
    assert_eq!(manager.stats().incremental_parses, 1);

    let reused: Vec<_> = seen.lock().iter().map(|reused| reused.kind).collect();
    for kind in [SyntaxKind::FuncKw, SyntaxKind::Ident, SyntaxKind::LParen, SyntaxKind::RParen] {
        assert!(reused.contains(&kind), "{kind:?} should be reused");
    }
    assert!(!reused.contains(&SyntaxKind::FuncDecl));
    assert!(!reused.contains(&SyntaxKind::LBrace));

    // The old version was evicted but can still be parsed on its own.
    let stale = manager.tree_for(&v0).await.unwrap();
    assert_eq!(stale.tree().to_string(), "func f() {}");
    assert_eq!(manager.stats().full_parses, 2);
    assert_eq!(v1.tree().to_string(), "func f() {x}");

    let document = store.close(URI).unwrap();
    assert_eq!(manager.clear(document), 1);
    assert!(!manager.is_cached(edited.after.id()));
}

#[tokio::test]
async fn test_full_sync_changes_still_reparse_incrementally() {
    let store = DocumentStore::new();
    let manager = SyntaxTreeManager::new(
        IncrementalParser,
        ManagerConfig::default(),
        tokio::runtime::Handle::current(),
    );
    let seen: Arc<Mutex<Vec<ReusedSyntax>>> = Arc::default();
    let sink = Arc::clone(&seen);
    manager.set_reuse_observer(Some(Arc::new(move |reused| sink.lock().push(reused))));

    let mut current = store.open(URI, 1, "let a = 1\nlet b = 2\nlet c = 3\n").unwrap();
    manager.tree_for(&current).await.unwrap();

    for (version, text) in [
        (2, "let a = 1\nlet b = 20\nlet c = 3\n"),
        (3, "let a = 1\nlet b = 204\nlet c = 3\n"),
        (5, "let a = 1\nlet b = 204\nlet c = 3\nlet d = 4\n"),
    ] {
        let edited = store.change(URI, version, &[ContentChange::full(text)]).unwrap();
        manager
            .register_edit(&current, &edited.after, edited.edits)
            .unwrap();
        let tree = manager.tree_for(&edited.after).await.unwrap();
        assert_eq!(tree.text(), text);
        current = edited.after;
    }

    let stats = manager.stats();
    assert_eq!(stats.full_parses, 1);
    assert_eq!(stats.incremental_parses, 3);
    let items = seen
        .lock()
        .iter()
        .filter(|reused| reused.kind == SyntaxKind::LetDecl)
        .count();
    assert!(items >= 5, "untouched declarations should be reused, saw {items}");
}

#[tokio::test]
async fn test_utf16_positions_after_multibyte_text() {
    let store = DocumentStore::new();
    store.open(URI, 0, "let s = \"é😀\"\nlet t = 1").unwrap();

    // Line 0 has 13 UTF-16 units: the emoji counts twice.
    let edited = store.change(URI, 1, &[insert_at(0, 13, ";")]).unwrap();
    assert_eq!(&**edited.after.text(), "let s = \"é😀\";\nlet t = 1");

    let err = store.change(URI, 2, &[insert_at(0, 11, "!")]).unwrap_err();
    assert!(matches!(err, treecache::Error::SplitSurrogatePair { line: 0, character: 11 }));
}
