//! Pipeline error type.

use reelforge_core::error::CoreError;
use thiserror::Error;

use crate::store::StoreError;

/// Errors surfaced by the coordinator, orchestrator and stage bodies.
///
/// Stage failures are recorded on their task row via [`Display`]; the
/// messages are stable and never carry credentials or raw response
/// bodies beyond a status line.
///
/// [`Display`]: std::fmt::Display
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A vendor call resolved to a failure result.
    #[error("generation failed: {0}")]
    Generation(String),

    /// The poll budget for a vendor video job ran out.
    #[error("video generation timed out")]
    TimedOut,

    /// The dispatch channel is closed; the worker is shutting down.
    #[error("orchestrator is shut down")]
    Shutdown,
}
