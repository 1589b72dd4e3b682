//! Repository for the `characters` table.

use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::character::{Character, CreateCharacter};

/// Column list for `characters` queries.
const COLUMNS: &str = "id, project_id, name, description, image_url, created_at, updated_at";

pub struct CharacterRepo;

impl CharacterRepo {
    pub async fn create(pool: &PgPool, input: &CreateCharacter) -> Result<Character, sqlx::Error> {
        let query = format!(
            "INSERT INTO characters (project_id, name, description) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Character>(&query)
            .bind(input.project_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Project-scoped lookup.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Character>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Character>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM characters WHERE project_id = $1 ORDER BY id");
        sqlx::query_as::<_, Character>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_image_url(pool: &PgPool, id: DbId, url: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE characters SET image_url = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(url)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
