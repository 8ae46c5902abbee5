//! Background classification worker.
//!
//! Requests are queued on an `mpsc` channel and handled one at a time. The
//! forward pass runs on the blocking pool so the caller's thread never
//! waits on the engine. Each request carries a [`ViewToken`]; a result is
//! only delivered if its view is still alive when the pass completes.

use crate::error::{Error, Result};
use crate::imaging::Bitmap;
use crate::inference::{Classification, ModelSession};
use crate::pipeline::ViewToken;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct ClassifyRequest {
    bitmap: Bitmap,
    token: ViewToken,
    reply: oneshot::Sender<Result<Classification>>,
}

/// Counters reported when the worker shuts down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// Results handed back to a live view.
    pub delivered: usize,
    /// Requests whose view was gone before delivery.
    pub discarded: usize,
}

/// Sending side of the worker queue. Dropping every handle stops the worker.
#[derive(Debug, Clone)]
pub struct WorkerHandle {
    requests: mpsc::Sender<ClassifyRequest>,
}

impl WorkerHandle {
    /// Queue a bitmap for classification on behalf of the view behind `token`.
    pub async fn submit(&self, bitmap: Bitmap, token: ViewToken) -> Result<PendingClassification> {
        let (reply, receiver) = oneshot::channel();
        self.requests
            .send(ClassifyRequest {
                bitmap,
                token: token.clone(),
                reply,
            })
            .await
            .map_err(|_| Error::WorkerStopped)?;

        Ok(PendingClassification { receiver, token })
    }
}

/// A classification in flight.
#[derive(Debug)]
pub struct PendingClassification {
    receiver: oneshot::Receiver<Result<Classification>>,
    token: ViewToken,
}

impl PendingClassification {
    /// Wait for the result.
    ///
    /// Returns [`Error::Discarded`] if the view died before the result could
    /// be applied.
    pub async fn wait(self) -> Result<Classification> {
        match self.receiver.await {
            Ok(_) if !self.token.is_alive() => Err(Error::Discarded),
            Ok(result) => result,
            Err(_) if !self.token.is_alive() => Err(Error::Discarded),
            Err(_) => Err(Error::WorkerStopped),
        }
    }
}

/// Start the worker on the current tokio runtime.
///
/// The returned join handle resolves once every [`WorkerHandle`] has been
/// dropped and the queue has drained.
pub fn spawn_worker(
    session: Arc<ModelSession>,
    capacity: usize,
) -> (WorkerHandle, JoinHandle<WorkerStats>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let join = tokio::spawn(run_worker(session, rx));
    (WorkerHandle { requests: tx }, join)
}

async fn run_worker(
    session: Arc<ModelSession>,
    mut requests: mpsc::Receiver<ClassifyRequest>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();

    while let Some(request) = requests.recv().await {
        let ClassifyRequest {
            bitmap,
            token,
            reply,
        } = request;

        if !token.is_alive() {
            debug!("Skipping request from a view that is already gone");
            stats.discarded += 1;
            continue;
        }

        let task_session = Arc::clone(&session);
        let result = tokio::task::spawn_blocking(move || task_session.classify(&bitmap))
            .await
            .unwrap_or_else(|e| {
                Err(Error::Internal {
                    message: format!("classification task failed: {e}"),
                })
            });

        if !token.is_alive() {
            debug!("View gone while classifying, discarding result");
            stats.discarded += 1;
            continue;
        }

        if reply.send(result).is_err() {
            warn!("Requester stopped waiting, result dropped");
            stats.discarded += 1;
        } else {
            stats.delivered += 1;
        }
    }

    debug!(
        "Classification worker stopped ({} delivered, {} discarded)",
        stats.delivered, stats.discarded
    );
    stats
}
