//! Repository for the `storyboard_shots` table.

use reelforge_core::storyboard::StoryboardDraft;
use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::storyboard::StoryboardShot;

/// Column list for `storyboard_shots` queries.
const COLUMNS: &str = "id, script_id, sequence_number, content, duration_secs, created_at";

pub struct StoryboardRepo;

impl StoryboardRepo {
    /// Replace the script's full shot set in one transaction.
    ///
    /// Delete and insert commit together, so a reader never observes a
    /// mix of old and new shots. Concurrent replacements serialize on
    /// the deleted rows; the last commit wins.
    pub async fn replace_for_script(
        pool: &PgPool,
        script_id: DbId,
        drafts: &[StoryboardDraft],
    ) -> Result<Vec<StoryboardShot>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM storyboard_shots WHERE script_id = $1")
            .bind(script_id)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO storyboard_shots (script_id, sequence_number, content, duration_secs) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let mut shots = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let shot = sqlx::query_as::<_, StoryboardShot>(&insert)
                .bind(script_id)
                .bind(draft.sequence_number)
                .bind(&draft.content)
                .bind(draft.duration)
                .fetch_one(&mut *tx)
                .await?;
            shots.push(shot);
        }

        tx.commit().await?;
        Ok(shots)
    }

    pub async fn list_for_script(
        pool: &PgPool,
        script_id: DbId,
    ) -> Result<Vec<StoryboardShot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM storyboard_shots WHERE script_id = $1 \
             ORDER BY sequence_number"
        );
        sqlx::query_as::<_, StoryboardShot>(&query)
            .bind(script_id)
            .fetch_all(pool)
            .await
    }

    /// Project-scoped shot lookup via the owning script.
    pub async fn find_owned(
        pool: &PgPool,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<StoryboardShot>, sqlx::Error> {
        let query =
            "SELECT s.id, s.script_id, s.sequence_number, s.content, s.duration_secs, s.created_at \
             FROM storyboard_shots s \
             JOIN scripts sc ON sc.id = s.script_id \
             WHERE s.id = $1 AND sc.project_id = $2";
        sqlx::query_as::<_, StoryboardShot>(query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }
}
