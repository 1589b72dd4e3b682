//! Repository for the `projects` table.

use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project};

/// Column list for `projects` queries.
const COLUMNS: &str = "id, title, story_outline, created_at, updated_at";

pub struct ProjectRepo;

impl ProjectRepo {
    pub async fn create(pool: &PgPool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (title, story_outline) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.title)
            .bind(&input.story_outline)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn set_story_outline(
        pool: &PgPool,
        id: DbId,
        outline: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE projects SET story_outline = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(outline)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
