//! Tree scheduling on top of the parse cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tokio::runtime::Handle;

use super::cache::IncrementalParseCache;
use super::computation::{ParseComputation, ParseKind, run_blocking};
use super::config::ManagerConfig;
use crate::base::{DocumentId, SnapshotId};
use crate::document::DocumentSnapshot;
use crate::error::{Error, Result};
use crate::syntax::{EditSet, ParseResult, Parser, ReuseObserver};

/// What [`SyntaxTreeManager::register_edit`] scheduled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditRegistration {
    /// An incremental parse based on the pre-edit tree.
    Incremental,
    /// The pre-edit snapshot was not cached; the post-edit tree will be
    /// fully parsed on first request.
    NoBase,
}

/// Counters describing what the manager has done so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ManagerStats {
    pub full_parses: u64,
    pub incremental_parses: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

#[derive(Debug, Default)]
struct Counters {
    full_parses: AtomicU64,
    incremental_parses: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> ManagerStats {
        ManagerStats {
            full_parses: self.full_parses.load(Ordering::Relaxed),
            incremental_parses: self.incremental_parses.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
        }
    }
}

/// Hands out syntax trees for document snapshots, parsing each snapshot
/// at most once while it stays cached.
///
/// Parses run on the blocking pool of the runtime given to
/// [`new`](Self::new). The cache lock is only held to look up or publish
/// a [`ParseComputation`], never while a parse runs, so slow parses do not
/// block lookups for other documents.
///
/// Edits to one document must be registered in version order.
pub struct SyntaxTreeManager<P: Parser> {
    parser: Arc<P>,
    cache: Mutex<IncrementalParseCache<ParseComputation>>,
    observer: RwLock<Option<ReuseObserver>>,
    runtime: Handle,
    counters: Arc<Counters>,
}

impl<P: Parser> SyntaxTreeManager<P> {
    pub fn new(parser: P, config: ManagerConfig, runtime: Handle) -> Self {
        Self {
            parser: Arc::new(parser),
            cache: Mutex::new(IncrementalParseCache::new(config.cache_capacity)),
            observer: RwLock::new(None),
            runtime,
            counters: Arc::default(),
        }
    }

    /// The tree for `snapshot`, parsing it if no cached computation
    /// exists.
    ///
    /// Concurrent reads of the same snapshot share one parse, except for
    /// snapshots already superseded by a cached newer version: those are
    /// never cached, so each such read parses on its own.
    pub async fn tree_for(&self, snapshot: &DocumentSnapshot) -> Result<Arc<ParseResult>> {
        self.computation_for(snapshot).result().await
    }

    /// The cached computation for `snapshot`, or a freshly started full
    /// parse.
    ///
    /// A snapshot that a newer cached version has superseded is parsed
    /// but not cached, so it cannot push out the newer entry.
    pub fn computation_for(&self, snapshot: &DocumentSnapshot) -> ParseComputation {
        let id = snapshot.id();
        let mut cache = self.cache.lock();
        if let Some(computation) = cache.get(&id) {
            Counters::bump(&self.counters.cache_hits);
            tracing::trace!(snapshot = %id, "parse cache hit");
            return computation.clone();
        }
        Counters::bump(&self.counters.cache_misses);

        let computation = self.spawn_full(snapshot);
        if cache.has_newer(&id) {
            tracing::debug!(snapshot = %id, "parsing superseded snapshot without caching");
        } else {
            tracing::debug!(snapshot = %id, "scheduled full parse");
            cache.insert(id, computation.clone());
        }
        computation
    }

    /// Schedule an incremental parse of `post` based on the cached tree of
    /// `pre`, where `edits` turn `pre`'s text into `post`'s.
    ///
    /// Returns without waiting for any parse. When `pre` is not cached
    /// nothing is scheduled and `post` will be parsed in full on demand.
    pub fn register_edit(
        &self,
        pre: &DocumentSnapshot,
        post: &DocumentSnapshot,
        edits: EditSet,
    ) -> Result<EditRegistration> {
        let (pre_id, post_id) = (pre.id(), post.id());
        if pre_id.document != post_id.document {
            return Err(Error::DocumentMismatch {
                pre: pre_id.document,
                post: post_id.document,
            });
        }
        if !pre_id.precedes(&post_id) {
            return Err(Error::OutOfOrderEdit {
                pre: pre_id,
                post: post_id,
            });
        }
        edits.check_fits(pre.text())?;

        let mut cache = self.cache.lock();
        let Some(base) = cache.get(&pre_id).cloned() else {
            tracing::debug!(pre = %pre_id, post = %post_id, "no cached base, deferring to full parse");
            return Ok(EditRegistration::NoBase);
        };
        tracing::debug!(
            pre = %pre_id,
            post = %post_id,
            edits = edits.len(),
            "scheduled incremental parse"
        );
        let computation = self.spawn_incremental(base, post, edits);
        cache.insert(post_id, computation);
        Ok(EditRegistration::Incremental)
    }

    /// Drop every cached computation of `document`. Returns how many were
    /// dropped.
    pub fn clear(&self, document: DocumentId) -> usize {
        let removed = self.cache.lock().remove_document(document);
        tracing::debug!(%document, removed, "cleared cached trees");
        removed
    }

    /// Install a callback told about every node and token reused by
    /// incremental parses scheduled from now on.
    pub fn set_reuse_observer(&self, observer: Option<ReuseObserver>) {
        *self.observer.write() = observer;
    }

    /// Whether a computation for `snapshot` is cached.
    pub fn is_cached(&self, snapshot: SnapshotId) -> bool {
        self.cache.lock().contains(&snapshot)
    }

    pub fn stats(&self) -> ManagerStats {
        self.counters.snapshot()
    }

    fn spawn_full(&self, snapshot: &DocumentSnapshot) -> ParseComputation {
        let id = snapshot.id();
        let parse = self.full_parse(snapshot);
        ParseComputation::spawn(&self.runtime, id, ParseKind::Full, async move {
            run_blocking(id, parse).await
        })
    }

    fn spawn_incremental(
        &self,
        base: ParseComputation,
        post: &DocumentSnapshot,
        edits: EditSet,
    ) -> ParseComputation {
        let id = post.id();
        let fallback = self.full_parse(post);
        let parser = Arc::clone(&self.parser);
        let counters = Arc::clone(&self.counters);
        let text = Arc::clone(post.text());
        let observer = self.observer.read().clone();

        ParseComputation::spawn(&self.runtime, id, ParseKind::Incremental, async move {
            let prior = match base.result().await {
                Ok(prior) => prior,
                Err(err) => {
                    tracing::warn!(snapshot = %id, %err, "base parse failed, parsing in full");
                    return run_blocking(id, fallback).await;
                }
            };
            run_blocking(id, move || {
                Counters::bump(&counters.incremental_parses);
                let result = parser.reparse(text, &prior, &edits, observer.as_ref());
                tracing::debug!(snapshot = %id, edits = edits.len(), "incremental parse");
                result
            })
            .await
        })
    }

    fn full_parse(&self, snapshot: &DocumentSnapshot) -> impl FnOnce() -> ParseResult + Send + use<P> {
        let id = snapshot.id();
        let parser = Arc::clone(&self.parser);
        let counters = Arc::clone(&self.counters);
        let text = Arc::clone(snapshot.text());
        move || {
            Counters::bump(&counters.full_parses);
            tracing::debug!(snapshot = %id, len = text.len(), "full parse");
            parser.parse(text)
        }
    }
}

impl<P: Parser> std::fmt::Debug for SyntaxTreeManager<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.lock();
        f.debug_struct("SyntaxTreeManager")
            .field("cached", &cache.len())
            .field("capacity", &cache.capacity())
            .field("stats", &self.stats())
            .finish()
    }
}
