//! Models for the `tasks` table.

use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A tracked pipeline invocation.
///
/// `status_id` references the `task_statuses` lookup table and maps to
/// `reelforge_core::task::TaskStatus`; `progress` is 0..=100 and never
/// decreases.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub task_type: String,
    pub status_id: i16,
    pub progress: i16,
    pub args: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// DTO for creating a pending task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub project_id: DbId,
    pub task_type: String,
    pub args: serde_json::Value,
}
