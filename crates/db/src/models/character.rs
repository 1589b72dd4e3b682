//! Models for the `characters` table.

use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recurring character whose reference image anchors scene prompts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Character {
    pub id: DbId,
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a character.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCharacter {
    pub project_id: DbId,
    pub name: String,
    pub description: Option<String>,
}
