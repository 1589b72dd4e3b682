//! Durable task orchestrator.
//!
//! [`Orchestrator::submit`] records the task in `pending` and queues it;
//! a dispatch loop pulls invocations off an mpsc channel and runs each
//! stage body on its own tokio task, bounded by a semaphore. Shutdown
//! cancels the loop only — in-flight stage bodies keep running in the
//! background until they reach a terminal state on their task row.

use std::sync::{Arc, Mutex};

use reelforge_core::error::CoreError;
use reelforge_core::types::DbId;
use reelforge_db::models::task::CreateTask;
use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;

use crate::error::PipelineError;
use crate::request::StageRequest;
use crate::stages::{self, StageContext};

/// Queue capacity between `submit` and the dispatch loop.
const QUEUE_CAPACITY: usize = 64;

/// How long shutdown waits for the dispatch loop to drain.
const SHUTDOWN_GRACE: std::time::Duration = std::time::Duration::from_secs(5);

/// Default number of concurrently running stage bodies.
pub const DEFAULT_CONCURRENCY: usize = 4;

struct Dispatch {
    task_id: DbId,
    request: StageRequest,
}

pub struct Orchestrator {
    ctx: Arc<StageContext>,
    tx: mpsc::Sender<Dispatch>,
    cancel: CancellationToken,
    loop_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl Orchestrator {
    /// Spawn the dispatch loop and return a shared handle.
    pub fn start(ctx: StageContext, concurrency: usize) -> Arc<Self> {
        let ctx = Arc::new(ctx);
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let cancel = CancellationToken::new();

        let loop_ctx = Arc::clone(&ctx);
        let loop_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            dispatch_loop(loop_ctx, rx, loop_cancel, concurrency).await;
        });

        Arc::new(Self {
            ctx,
            tx,
            cancel,
            loop_handle: Mutex::new(Some(handle)),
        })
    }

    /// Record a pending task for the request and queue it for dispatch.
    ///
    /// Returns as soon as the row exists; callers observe progress by
    /// polling the task.
    pub async fn submit(&self, request: StageRequest) -> Result<DbId, PipelineError> {
        let args = serde_json::to_value(&request)
            .map_err(|e| CoreError::Internal(format!("request serialization: {e}")))?;
        let task = self
            .ctx
            .store
            .create_task(CreateTask {
                project_id: request.project_id(),
                task_type: request.task_type().as_str().to_string(),
                args,
            })
            .await?;

        let dispatch = Dispatch {
            task_id: task.id,
            request,
        };
        if self.tx.send(dispatch).await.is_err() {
            // Queue is gone; fail the row so it does not sit pending
            // forever, then tell the submitter.
            if let Err(e) = self
                .ctx
                .store
                .fail_task(task.id, "orchestrator is shut down")
                .await
            {
                tracing::error!(task_id = task.id, error = %e, "failed to record task failure");
            }
            return Err(PipelineError::Shutdown);
        }

        tracing::debug!(task_id = task.id, task_type = %task.task_type, "task queued");
        Ok(task.id)
    }

    /// Stage context shared with the coordinator's synchronous surface.
    pub fn context(&self) -> Arc<StageContext> {
        Arc::clone(&self.ctx)
    }

    /// Stop accepting work and wait briefly for the loop to exit.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.loop_handle.lock().ok().and_then(|mut h| h.take());
        if let Some(handle) = handle {
            let _ = tokio::time::timeout(SHUTDOWN_GRACE, handle).await;
        }
        tracing::info!("orchestrator shut down");
    }
}

async fn dispatch_loop(
    ctx: Arc<StageContext>,
    mut rx: mpsc::Receiver<Dispatch>,
    cancel: CancellationToken,
    concurrency: usize,
) {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

    loop {
        let dispatch = tokio::select! {
            _ = cancel.cancelled() => break,
            msg = rx.recv() => match msg {
                Some(dispatch) => dispatch,
                None => break,
            },
        };

        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let task_ctx = Arc::clone(&ctx);
        tokio::spawn(async move {
            run_task(&task_ctx, dispatch.task_id, dispatch.request).await;
            drop(permit);
        });
    }

    tracing::debug!("dispatch loop exited");
}

/// Execute one task body, moving the row through its lifecycle.
async fn run_task(ctx: &StageContext, task_id: DbId, request: StageRequest) {
    match ctx.store.mark_task_processing(task_id).await {
        Ok(true) => {}
        Ok(false) => {
            // Already dispatched or terminal; re-dispatch is a no-op.
            tracing::warn!(task_id, "task not pending, skipping dispatch");
            return;
        }
        Err(e) => {
            tracing::error!(task_id, error = %e, "failed to mark task processing");
            return;
        }
    }

    match stages::run(ctx, &request).await {
        Ok(summary) => {
            match ctx.store.complete_task(task_id, &summary).await {
                Ok(true) => tracing::info!(task_id, "task completed"),
                Ok(false) => tracing::warn!(task_id, "completion rejected by store"),
                Err(e) => tracing::error!(task_id, error = %e, "failed to record completion"),
            }
        }
        Err(error) => {
            let message = error.to_string();
            if let Err(e) = ctx.store.fail_task(task_id, &message).await {
                tracing::error!(task_id, error = %e, "failed to record task failure");
            }
            tracing::error!(task_id, error = %message, "task failed");
        }
    }
}
