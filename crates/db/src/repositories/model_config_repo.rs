//! Repository for the `model_configs` table.

use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::model_config::{CreateModelConfig, ModelConfig};

/// Column list for `model_configs` queries.
const COLUMNS: &str = "\
    id, name, vendor, model_name, credential, endpoint, \
    system_prompt, prompt_template, params, is_enabled, \
    created_at, updated_at";

pub struct ModelConfigRepo;

impl ModelConfigRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateModelConfig,
    ) -> Result<ModelConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO model_configs \
             (name, vendor, model_name, credential, endpoint, system_prompt, prompt_template, params) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, '{{}}'::jsonb)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModelConfig>(&query)
            .bind(&input.name)
            .bind(&input.vendor)
            .bind(&input.model_name)
            .bind(&input.credential)
            .bind(&input.endpoint)
            .bind(&input.system_prompt)
            .bind(&input.prompt_template)
            .bind(&input.params)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ModelConfig>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM model_configs WHERE id = $1");
        sqlx::query_as::<_, ModelConfig>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Enabled configs only, for operator listings.
    pub async fn list_enabled(pool: &PgPool) -> Result<Vec<ModelConfig>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM model_configs WHERE is_enabled ORDER BY name");
        sqlx::query_as::<_, ModelConfig>(&query).fetch_all(pool).await
    }

    pub async fn set_enabled(pool: &PgPool, id: DbId, enabled: bool) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE model_configs SET is_enabled = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(enabled)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
