//! Repository for the `scripts` table.

use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::script::{CreateScript, Script};

/// Column list for `scripts` queries.
const COLUMNS: &str = "id, project_id, version, content, generated_by_config, created_at";

pub struct ScriptRepo;

impl ScriptRepo {
    /// Append a new script version for the project.
    ///
    /// The version is computed inside the insert, so concurrent appends
    /// race on the `(project_id, version)` unique constraint rather
    /// than silently colliding.
    pub async fn create(pool: &PgPool, input: &CreateScript) -> Result<Script, sqlx::Error> {
        let query = format!(
            "INSERT INTO scripts (project_id, version, content, generated_by_config) \
             SELECT $1, COALESCE(MAX(version), 0) + 1, $2, $3 \
             FROM scripts WHERE project_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(input.project_id)
            .bind(&input.content)
            .bind(input.generated_by_config)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE id = $1");
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Project-scoped lookup; a script belonging to a different project
    /// resolves to `None`.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scripts WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// The highest-version script for a project, if any.
    pub async fn latest_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Option<Script>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scripts WHERE project_id = $1 \
             ORDER BY version DESC LIMIT 1"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}
