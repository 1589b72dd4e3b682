//! Models for the `scenes` table.

use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A still-image target describing one visual setting.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scene {
    pub id: DbId,
    pub project_id: DbId,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScene {
    pub project_id: DbId,
    pub description: String,
}
