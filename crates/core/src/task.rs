//! Task lifecycle state machine.
//!
//! A task is the durable record of one asynchronous stage invocation.
//! Statuses map to SMALLINT ids in the `task_statuses` lookup table
//! (1-based, matching seed data order). Transitions are monotonic:
//! `pending -> processing -> {completed | failed}` and nothing ever
//! leaves a terminal state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Progress value recorded when a task is picked up by a worker.
pub const PROGRESS_DISPATCHED: i16 = 10;

/// Progress value recorded on successful completion. Exactly 100 —
/// a completed task is never observable with partial progress.
pub const PROGRESS_COMPLETE: i16 = 100;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Execution status of a background task.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending = 1,
    Processing = 2,
    Completed = 3,
    Failed = 4,
}

impl TaskStatus {
    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Map a database status ID back to the enum.
    pub fn from_id(id: StatusId) -> Option<Self> {
        match id {
            1 => Some(Self::Pending),
            2 => Some(Self::Processing),
            3 => Some(Self::Completed),
            4 => Some(Self::Failed),
            _ => None,
        }
    }

    /// Stable string form used in API payloads and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// `completed` and `failed` are terminal: no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Whether a status transition is allowed by the lifecycle.
///
/// Self-transitions are not allowed; idempotent re-dispatch is handled at
/// the store layer by treating a rejected transition as a no-op.
/// `pending -> failed` covers tasks that could never be enqueued.
pub fn can_transition(from: TaskStatus, to: TaskStatus) -> bool {
    use TaskStatus::*;
    matches!(
        (from, to),
        (Pending, Processing) | (Processing, Completed) | (Processing, Failed) | (Pending, Failed)
    )
}

// ---------------------------------------------------------------------------
// Task type
// ---------------------------------------------------------------------------

/// The pipeline stage a task executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskType {
    Script,
    Storyboard,
    CharacterImage,
    SceneImage,
    VideoSegment,
    Merge,
}

impl TaskType {
    /// Stable string form stored in the `tasks.task_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Storyboard => "storyboard",
            Self::CharacterImage => "character-image",
            Self::SceneImage => "scene-image",
            Self::VideoSegment => "video-segment",
            Self::Merge => "merge",
        }
    }

    /// Parse the stored string form. Unknown values fail closed.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "script" => Ok(Self::Script),
            "storyboard" => Ok(Self::Storyboard),
            "character-image" => Ok(Self::CharacterImage),
            "scene-image" => Ok(Self::SceneImage),
            "video-segment" => Ok(Self::VideoSegment),
            "merge" => Ok(Self::Merge),
            other => Err(CoreError::Validation(format!(
                "Unknown task type '{other}'"
            ))),
        }
    }
}

/// Validate a progress value and enforce that it never decreases.
pub fn validate_progress(current: i16, next: i16) -> Result<(), CoreError> {
    if !(0..=100).contains(&next) {
        return Err(CoreError::Validation(format!(
            "progress must be in 0..=100, got {next}"
        )));
    }
    if next < current {
        return Err(CoreError::Validation(format!(
            "progress may not decrease ({current} -> {next})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
