//! Repository for the `tasks` table.
//!
//! Every status transition is a single guarded `UPDATE`: the `WHERE`
//! clause encodes the legal source states, so an illegal transition
//! (re-dispatching a terminal task, completing a task that was never
//! dispatched) updates zero rows and the caller observes `false`.
//! Status, progress and payload always move in the same statement.

use reelforge_core::task::{TaskStatus, PROGRESS_COMPLETE, PROGRESS_DISPATCHED};
use reelforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::task::{CreateTask, Task};

/// Column list for `tasks` queries.
const COLUMNS: &str = "\
    id, project_id, task_type, status_id, progress, args, result, \
    error_message, created_at, updated_at, started_at, completed_at";

/// Provides lifecycle operations for pipeline tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Create a new task in `pending` with zero progress.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (project_id, task_type, status_id, args) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(input.project_id)
            .bind(&input.task_type)
            .bind(TaskStatus::Pending.id())
            .bind(&input.args)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_project(
        pool: &PgPool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE project_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Guarded transitions
    // -----------------------------------------------------------------------

    /// `pending -> processing`, setting the dispatch progress figure.
    /// Returns `false` when the task was not pending.
    pub async fn mark_processing(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET status_id = $2, progress = $3, started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $4",
        )
        .bind(id)
        .bind(TaskStatus::Processing.id())
        .bind(PROGRESS_DISPATCHED)
        .bind(TaskStatus::Pending.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Raise progress on a processing task. Decreases are ignored, so
    /// out-of-order updates never move the figure backwards.
    pub async fn update_progress(
        pool: &PgPool,
        id: DbId,
        progress: i16,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET progress = $2, updated_at = NOW() \
             WHERE id = $1 AND status_id = $3 AND progress <= $2",
        )
        .bind(id)
        .bind(progress)
        .bind(TaskStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// `processing -> completed`, storing the result payload and setting
    /// progress to 100 in the same statement.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        result_payload: &serde_json::Value,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET status_id = $2, progress = $3, result = $4, \
                 completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status_id = $5",
        )
        .bind(id)
        .bind(TaskStatus::Completed.id())
        .bind(PROGRESS_COMPLETE)
        .bind(result_payload)
        .bind(TaskStatus::Processing.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// `pending|processing -> failed`, recording the error verbatim.
    pub async fn fail(pool: &PgPool, id: DbId, error: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tasks \
             SET status_id = $2, error_message = $3, \
                 completed_at = NOW(), updated_at = NOW() \
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
