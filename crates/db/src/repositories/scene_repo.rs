//! Repository for the `scenes` table.

use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::scene::{CreateScene, Scene};

/// Column list for `scenes` queries.
const COLUMNS: &str = "id, project_id, description, image_url, created_at, updated_at";

pub struct SceneRepo;

impl SceneRepo {
    pub async fn create(pool: &PgPool, input: &CreateScene) -> Result<Scene, sqlx::Error> {
        let query = format!(
            "INSERT INTO scenes (project_id, description) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(input.project_id)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Project-scoped lookup.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenes WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Scene>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenes WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, Scene>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_image_url(pool: &PgPool, id: DbId, url: &str) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE scenes SET image_url = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(url)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() == 1)
    }
}
