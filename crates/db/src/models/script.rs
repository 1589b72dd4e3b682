//! Models for the `scripts` table.

use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One generated (or manually entered) script version for a project.
///
/// Versions are 1-based and monotonically increasing per project;
/// regeneration appends a new version rather than overwriting.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Script {
    pub id: DbId,
    pub project_id: DbId,
    pub version: i32,
    pub content: String,
    /// Config that produced this version; `None` for manual entry.
    pub generated_by_config: Option<DbId>,
    pub created_at: Timestamp,
}

/// DTO for appending a script version.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScript {
    pub project_id: DbId,
    pub content: String,
    pub generated_by_config: Option<DbId>,
}
