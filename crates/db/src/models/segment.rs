//! Models for the `video_segments` table.

use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One generated video clip for a storyboard shot.
///
/// Shares the `task_statuses` lookup table with tasks: pending on
/// creation, processing while the vendor job runs, then completed with
/// a `video_url` or failed with an `error_message`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct VideoSegment {
    pub id: DbId,
    pub project_id: DbId,
    pub shot_id: DbId,
    pub sequence_number: i32,
    pub status_id: i16,
    pub duration_secs: f64,
    pub vendor_job_id: Option<String>,
    pub video_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a pending segment.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoSegment {
    pub project_id: DbId,
    pub shot_id: DbId,
    pub sequence_number: i32,
    pub duration_secs: f64,
}
