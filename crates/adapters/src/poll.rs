//! Bounded polling for asynchronous vendor jobs.
//!
//! Vendor-side video jobs finish out of band, so the caller polls at a
//! fixed interval under a wall-clock budget. Running out of budget is a
//! distinct outcome from a vendor failure: a timed-out job may still be
//! running on the vendor side.

use std::future::Future;
use std::time::Duration;

use crate::result::{VideoJobHandle, VideoJobStatus};
use crate::traits::VideoAdapter;

/// Default delay between consecutive status probes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default total wall-clock budget for one job.
pub const DEFAULT_POLL_BUDGET: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    /// Delay between consecutive status probes.
    pub interval: Duration,
    /// Total wall-clock budget before giving up.
    pub budget: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            budget: DEFAULT_POLL_BUDGET,
        }
    }
}

/// Terminal outcome of a bounded poll loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed { video_url: String },
    Failed { error: String },
    /// The budget elapsed with the job still pending.
    TimedOut,
}

/// Poll `probe` until the job reaches a terminal state or the budget
/// elapses. The first probe fires immediately; later probes are spaced
/// by the configured interval.
pub async fn poll_until_terminal<F, Fut>(config: PollConfig, mut probe: F) -> PollOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = VideoJobStatus>,
{
    let deadline = tokio::time::Instant::now() + config.budget;
    loop {
        match probe().await {
            VideoJobStatus::Completed { video_url } => {
                return PollOutcome::Completed { video_url };
            }
            VideoJobStatus::Failed { error } => {
                return PollOutcome::Failed { error };
            }
            VideoJobStatus::Pending { progress } => {
                tracing::debug!(progress, "video job still pending");
            }
        }

        if tokio::time::Instant::now() + config.interval > deadline {
            return PollOutcome::TimedOut;
        }
        tokio::time::sleep(config.interval).await;
    }
}

/// Poll a submitted video job on its adapter until it resolves.
pub async fn poll_video_job(
    adapter: &dyn VideoAdapter,
    handle: &VideoJobHandle,
    config: PollConfig,
) -> PollOutcome {
    poll_until_terminal(config, || adapter.poll_status(handle)).await
}
