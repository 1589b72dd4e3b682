//! Persistence seams for the pipeline.
//!
//! The orchestrator and stage bodies talk to storage through the
//! [`TaskStore`] and [`ContentStore`] traits, so integration tests can
//! run against an in-memory implementation. [`PgStore`] is the
//! production implementation over the `reelforge_db` repositories.
//!
//! All mutating task/segment operations are guarded transitions:
//! `false` means the row was not in a legal source state and nothing
//! changed.

use async_trait::async_trait;
use reelforge_core::storyboard::StoryboardDraft;
use reelforge_core::types::DbId;
use reelforge_db::models::character::Character;
use reelforge_db::models::model_config::ModelConfig;
use reelforge_db::models::project::Project;
use reelforge_db::models::scene::Scene;
use reelforge_db::models::script::{CreateScript, Script};
use reelforge_db::models::segment::{CreateVideoSegment, VideoSegment};
use reelforge_db::models::storyboard::StoryboardShot;
use reelforge_db::models::task::{CreateTask, Task};
use reelforge_db::repositories::{
    CharacterRepo, ModelConfigRepo, ProjectRepo, SceneRepo, ScriptRepo, SegmentRepo,
    StoryboardRepo, TaskRepo,
};
use reelforge_db::DbPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Task lifecycle persistence.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, input: CreateTask) -> Result<Task, StoreError>;
    async fn get_task(&self, id: DbId) -> Result<Option<Task>, StoreError>;
    /// Guarded `pending -> processing`.
    async fn mark_task_processing(&self, id: DbId) -> Result<bool, StoreError>;
    /// Guarded progress raise on a processing task.
    async fn update_task_progress(&self, id: DbId, progress: i16) -> Result<bool, StoreError>;
    /// Guarded `processing -> completed` with result payload.
    async fn complete_task(&self, id: DbId, result: &serde_json::Value)
        -> Result<bool, StoreError>;
    /// Guarded `pending|processing -> failed` with error message.
    async fn fail_task(&self, id: DbId, error: &str) -> Result<bool, StoreError>;
}

/// Artifact persistence: projects, configs, scripts, storyboards,
/// image targets and video segments. Entity lookups taking a
/// `project_id` are owner-scoped and resolve to `None` on mismatch.
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn get_project(&self, id: DbId) -> Result<Option<Project>, StoreError>;
    async fn get_model_config(&self, id: DbId) -> Result<Option<ModelConfig>, StoreError>;

    async fn create_script(&self, input: CreateScript) -> Result<Script, StoreError>;
    async fn get_script_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Script>, StoreError>;

    /// Atomically replace a script's full shot set.
    async fn replace_storyboard(
        &self,
        script_id: DbId,
        drafts: &[StoryboardDraft],
    ) -> Result<Vec<StoryboardShot>, StoreError>;
    async fn list_storyboard(&self, script_id: DbId) -> Result<Vec<StoryboardShot>, StoreError>;
    async fn get_shot_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<StoryboardShot>, StoreError>;

    async fn get_character_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Character>, StoreError>;
    async fn set_character_image(&self, id: DbId, url: &str) -> Result<bool, StoreError>;

    async fn get_scene_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Scene>, StoreError>;
    async fn set_scene_image(&self, id: DbId, url: &str) -> Result<bool, StoreError>;

    async fn create_segment(&self, input: CreateVideoSegment)
        -> Result<VideoSegment, StoreError>;
    async fn list_segments(&self, project_id: DbId) -> Result<Vec<VideoSegment>, StoreError>;
    /// Guarded `pending -> processing`, recording the vendor job id.
    async fn segment_mark_processing(&self, id: DbId, job_id: &str) -> Result<bool, StoreError>;
    /// Guarded `processing -> completed` with the asset URL.
    async fn segment_complete(&self, id: DbId, video_url: &str) -> Result<bool, StoreError>;
    /// Guarded `pending|processing -> failed`.
    async fn segment_fail(&self, id: DbId, error: &str) -> Result<bool, StoreError>;
}

/// Combined store handle the pipeline runs against.
pub trait PipelineStore: TaskStore + ContentStore {}
impl<T: TaskStore + ContentStore> PipelineStore for T {}

// ---------------------------------------------------------------------------
// Postgres implementation
// ---------------------------------------------------------------------------

/// Production store over the `reelforge_db` repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, input: CreateTask) -> Result<Task, StoreError> {
        Ok(TaskRepo::create(&self.pool, &input).await?)
    }

    async fn get_task(&self, id: DbId) -> Result<Option<Task>, StoreError> {
        Ok(TaskRepo::find_by_id(&self.pool, id).await?)
    }

    async fn mark_task_processing(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(TaskRepo::mark_processing(&self.pool, id).await?)
    }

    async fn update_task_progress(&self, id: DbId, progress: i16) -> Result<bool, StoreError> {
        Ok(TaskRepo::update_progress(&self.pool, id, progress).await?)
    }

    async fn complete_task(
        &self,
        id: DbId,
        result: &serde_json::Value,
    ) -> Result<bool, StoreError> {
        Ok(TaskRepo::complete(&self.pool, id, result).await?)
    }

    async fn fail_task(&self, id: DbId, error: &str) -> Result<bool, StoreError> {
        Ok(TaskRepo::fail(&self.pool, id, error).await?)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn get_project(&self, id: DbId) -> Result<Option<Project>, StoreError> {
        Ok(ProjectRepo::find_by_id(&self.pool, id).await?)
    }

    async fn get_model_config(&self, id: DbId) -> Result<Option<ModelConfig>, StoreError> {
        Ok(ModelConfigRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_script(&self, input: CreateScript) -> Result<Script, StoreError> {
        Ok(ScriptRepo::create(&self.pool, &input).await?)
    }

    async fn get_script_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Script>, StoreError> {
        Ok(ScriptRepo::find_owned(&self.pool, id, project_id).await?)
    }

    async fn replace_storyboard(
        &self,
        script_id: DbId,
        drafts: &[StoryboardDraft],
    ) -> Result<Vec<StoryboardShot>, StoreError> {
        Ok(StoryboardRepo::replace_for_script(&self.pool, script_id, drafts).await?)
    }

    async fn list_storyboard(&self, script_id: DbId) -> Result<Vec<StoryboardShot>, StoreError> {
        Ok(StoryboardRepo::list_for_script(&self.pool, script_id).await?)
    }

    async fn get_shot_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<StoryboardShot>, StoreError> {
        Ok(StoryboardRepo::find_owned(&self.pool, id, project_id).await?)
    }

    async fn get_character_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Character>, StoreError> {
        Ok(CharacterRepo::find_owned(&self.pool, id, project_id).await?)
    }

    async fn set_character_image(&self, id: DbId, url: &str) -> Result<bool, StoreError> {
        Ok(CharacterRepo::set_image_url(&self.pool, id, url).await?)
    }

    async fn get_scene_owned(
        &self,
        id: DbId,
        project_id: DbId,
    ) -> Result<Option<Scene>, StoreError> {
        Ok(SceneRepo::find_owned(&self.pool, id, project_id).await?)
    }

    async fn set_scene_image(&self, id: DbId, url: &str) -> Result<bool, StoreError> {
        Ok(SceneRepo::set_image_url(&self.pool, id, url).await?)
    }

    async fn create_segment(
        &self,
        input: CreateVideoSegment,
    ) -> Result<VideoSegment, StoreError> {
        Ok(SegmentRepo::create(&self.pool, &input).await?)
    }

    async fn list_segments(&self, project_id: DbId) -> Result<Vec<VideoSegment>, StoreError> {
        Ok(SegmentRepo::list_for_project(&self.pool, project_id).await?)
    }

    async fn segment_mark_processing(&self, id: DbId, job_id: &str) -> Result<bool, StoreError> {
        Ok(SegmentRepo::mark_processing(&self.pool, id, job_id).await?)
    }

    async fn segment_complete(&self, id: DbId, video_url: &str) -> Result<bool, StoreError> {
        Ok(SegmentRepo::complete(&self.pool, id, video_url).await?)
    }

    async fn segment_fail(&self, id: DbId, error: &str) -> Result<bool, StoreError> {
        Ok(SegmentRepo::fail(&self.pool, id, error).await?)
    }
}
