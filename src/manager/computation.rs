//! Shared handles to parse tasks.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use smol_str::SmolStr;
use tokio::runtime::Handle;
use tokio::task::JoinError;

use crate::base::SnapshotId;
use crate::error::{Error, Result};
use crate::syntax::ParseResult;

/// Whether a computation parses from scratch or from a prior tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseKind {
    Full,
    Incremental,
}

type SharedParse = Shared<BoxFuture<'static, Result<Arc<ParseResult>>>>;

/// A parse that has been started on the runtime and may still be running.
///
/// Clones share the same task. Every clone awaiting [`result`](Self::result)
/// gets the same `ParseResult`, and dropping a clone (or a future awaiting
/// one) never stops the task.
#[derive(Clone)]
pub struct ParseComputation {
    snapshot: SnapshotId,
    kind: ParseKind,
    shared: SharedParse,
}

impl ParseComputation {
    /// Spawn `work` on `runtime` right away.
    pub(crate) fn spawn<F>(runtime: &Handle, snapshot: SnapshotId, kind: ParseKind, work: F) -> Self
    where
        F: Future<Output = Result<Arc<ParseResult>>> + Send + 'static,
    {
        let task = runtime.spawn(work);
        let joined = async move {
            match task.await {
                Ok(result) => result,
                Err(err) => Err(task_failed(snapshot, &err)),
            }
        };
        Self {
            snapshot,
            kind,
            shared: joined.boxed().shared(),
        }
    }

    /// Wait for the parse to finish.
    pub async fn result(&self) -> Result<Arc<ParseResult>> {
        self.shared.clone().await
    }

    /// The result, if the parse has already finished.
    pub fn peek(&self) -> Option<&Result<Arc<ParseResult>>> {
        self.shared.peek()
    }

    pub fn is_complete(&self) -> bool {
        self.peek().is_some()
    }

    pub fn snapshot(&self) -> SnapshotId {
        self.snapshot
    }

    pub fn kind(&self) -> ParseKind {
        self.kind
    }
}

impl fmt::Debug for ParseComputation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseComputation")
            .field("snapshot", &self.snapshot)
            .field("kind", &self.kind)
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Run a parse on the blocking pool.
pub(crate) async fn run_blocking<F>(snapshot: SnapshotId, parse: F) -> Result<Arc<ParseResult>>
where
    F: FnOnce() -> ParseResult + Send + 'static,
{
    tokio::task::spawn_blocking(parse)
        .await
        .map(Arc::new)
        .map_err(|err| task_failed(snapshot, &err))
}

fn task_failed(snapshot: SnapshotId, err: &JoinError) -> Error {
    let reason = if err.is_panic() {
        SmolStr::new_static("parser panicked")
    } else {
        SmolStr::new_static("task cancelled")
    };
    tracing::warn!(%snapshot, %reason, "parse task failed");
    Error::ParseTaskFailed { snapshot, reason }
}
