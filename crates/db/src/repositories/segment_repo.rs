//! Repository for the `video_segments` table.
//!
//! Segments share the guarded-transition pattern of the task repo: the
//! `WHERE` clause encodes legal source states and illegal moves update
//! zero rows.

use reelforge_core::task::TaskStatus;
use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::segment::{CreateVideoSegment, VideoSegment};

/// Column list for `video_segments` queries.
const COLUMNS: &str = "\
    id, project_id, shot_id, sequence_number, status_id, duration_secs, \
    vendor_job_id, video_url, error_message, created_at, updated_at";

pub struct SegmentRepo;

impl SegmentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateVideoSegment,
    ) -> Result<VideoSegment, sqlx::Error> {
        let query = format!(
            "INSERT INTO video_segments \
             (project_id, shot_id, sequence_number, status_id, duration_secs) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, VideoSegment>(&query)
            .bind(input.project_id)
            .bind(input.shot_id)
            .bind(input.sequence_number)
            .bind(TaskStatus::Pending.id())
            .bind(input.duration_secs)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<VideoSegment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM video_segments WHERE id = $1");
        sqlx::query_as::<_, VideoSegment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<VideoSegment>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM video_segments WHERE project_id = $1 \
             ORDER BY sequence_number"
        );
        sqlx::query_as::<_, VideoSegment>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// `pending -> processing`, recording the vendor job id.
    pub async fn mark_processing(
        pool: &PgPool,
        id: DbId,
        vendor_job_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE video_segments \
             SET status_id = $2, vendor_job_id = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(TaskStatus::Processing.id())
        .bind(vendor_job_id)
        .bind(TaskStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// `processing -> completed`, storing the finished asset URL.
    pub async fn complete(pool: &PgPool, id: DbId, video_url: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE video_segments \
             SET status_id = $2, video_url = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(TaskStatus::Completed.id())
        .bind(video_url)
        .bind(TaskStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// `pending|processing -> failed`.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE video_segments \
             SET status_id = $2, error_message = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id IN ($4, $5)",
        )
        .bind(id)
        .bind(TaskStatus::Failed.id())
        .bind(error)
        .bind(TaskStatus::Pending.id())
        .bind(TaskStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
