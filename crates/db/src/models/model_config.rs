//! Models for the `model_configs` table.
//!
//! A model config binds a vendor tag to a model name, a sealed
//! credential, and a vendor-specific parameter block. The `vendor` and
//! `params` columns are stored raw and validated against the closed
//! enums in `reelforge_core` when the config is resolved for use.

use reelforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A configured generation backend.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ModelConfig {
    pub id: DbId,
    pub name: String,
    /// Vendor tag, parsed into `reelforge_core::model_config::Vendor`.
    pub vendor: String,
    pub model_name: String,
    /// Credential sealed with the worker key; never serialized out.
    #[serde(skip_serializing)]
    pub credential: Option<Vec<u8>>,
    pub endpoint: Option<String>,
    pub system_prompt: Option<String>,
    /// User prompt template with a `{story_outline}` placeholder.
    pub prompt_template: Option<String>,
    pub params: serde_json::Value,
    pub is_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a model config. The credential arrives already
/// sealed.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateModelConfig {
    pub name: String,
    pub vendor: String,
    pub model_name: String,
    pub credential: Option<Vec<u8>>,
    pub endpoint: Option<String>,
    pub system_prompt: Option<String>,
    pub prompt_template: Option<String>,
    pub params: Option<serde_json::Value>,
}
