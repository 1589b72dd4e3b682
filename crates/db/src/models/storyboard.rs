//! Model for the `storyboard_shots` table.

use reelforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One shot in a script's storyboard.
///
/// Sequence numbers are unique within a script; the whole set is
/// replaced atomically on regeneration.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoryboardShot {
    pub id: DbId,
    pub script_id: DbId,
    pub sequence_number: i32,
    pub content: String,
    pub duration_secs: f64,
    pub created_at: Timestamp,
}
