//! Pipeline coordinator: stage admission and status surface.
//!
//! Every stage is explicitly requested; the coordinator checks the
//! upstream artifact exists (and belongs to the requesting project)
//! before handing the request to the orchestrator, and never advances
//! the pipeline on its own. Regenerating an upstream artifact leaves
//! downstream artifacts in place.

use std::sync::Arc;

use reelforge_adapters::{poll_video_job, PollConfig, PollOutcome, VideoJobHandle};
use reelforge_core::error::CoreError;
use reelforge_core::model_config::Modality;
use reelforge_core::task::TaskStatus;
use reelforge_core::types::DbId;
use reelforge_db::models::task::Task;

use crate::error::PipelineError;
use crate::orchestrator::Orchestrator;
use crate::request::StageRequest;
use crate::stages::storyboard::StoryboardOutcome;
use crate::stages::{self, resolve_config, StageContext};

pub struct Coordinator {
    orchestrator: Arc<Orchestrator>,
    ctx: Arc<StageContext>,
}

impl Coordinator {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        let ctx = orchestrator.context();
        Self { orchestrator, ctx }
    }

    /// Validate stage preconditions and queue the request.
    pub async fn submit(&self, request: StageRequest) -> Result<DbId, PipelineError> {
        self.check_preconditions(&request).await?;
        self.orchestrator.submit(request).await
    }

    /// Current state of a task, for submitters polling on progress.
    pub async fn get_status(&self, task_id: DbId) -> Result<Task, PipelineError> {
        self.ctx
            .store
            .get_task(task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "task",
                id: task_id,
            })
            .map_err(Into::into)
    }

    /// Generate a storyboard synchronously, returning the stored shots
    /// and the token usage of the call.
    pub async fn generate_storyboard(
        &self,
        project_id: DbId,
        script_id: DbId,
        model_config_id: DbId,
    ) -> Result<StoryboardOutcome, PipelineError> {
        self.check_preconditions(&StageRequest::Storyboard {
            project_id,
            script_id,
            model_config_id,
        })
        .await?;
        stages::storyboard::run(&self.ctx, project_id, script_id, model_config_id).await
    }

    /// Poll a vendor video job directly, with an explicit wall-clock
    /// budget.
    pub async fn poll_video_job(
        &self,
        model_config_id: DbId,
        handle: &VideoJobHandle,
        max_wait: std::time::Duration,
    ) -> Result<PollOutcome, PipelineError> {
        let resolved = resolve_config(&self.ctx, model_config_id).await?;
        let adapter = self.ctx.adapters.video_adapter(&resolved.spec)?;
        let config = PollConfig {
            budget: max_wait,
            ..self.ctx.poll
        };
        Ok(poll_video_job(adapter.as_ref(), handle, config).await)
    }

    // -----------------------------------------------------------------------
    // Precondition graph
    // -----------------------------------------------------------------------

    async fn check_preconditions(&self, request: &StageRequest) -> Result<(), PipelineError> {
        let project_id = request.project_id();
        let project = self
            .ctx
            .store
            .get_project(project_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "project",
                id: project_id,
            })?;

        match request {
            StageRequest::Script {
                model_config_id, ..
            } => {
                if project.story_outline.as_deref().map_or(true, str::is_empty) {
                    return Err(CoreError::Validation(
                        "project has no story outline".to_string(),
                    )
                    .into());
                }
                self.check_config(*model_config_id, Modality::Text).await
            }
            StageRequest::Storyboard {
                script_id,
                model_config_id,
                ..
            } => {
                if self
                    .ctx
                    .store
                    .get_script_owned(*script_id, project_id)
                    .await?
                    .is_none()
                {
                    return Err(CoreError::Validation(format!(
                        "script {script_id} does not exist for this project"
                    ))
                    .into());
                }
                self.check_config(*model_config_id, Modality::Text).await
            }
            StageRequest::CharacterImage {
                character_id,
                model_config_id,
                ..
            } => {
                if self
                    .ctx
                    .store
                    .get_character_owned(*character_id, project_id)
                    .await?
                    .is_none()
                {
                    return Err(CoreError::Validation(format!(
                        "character {character_id} does not exist for this project"
                    ))
                    .into());
                }
                self.check_config(*model_config_id, Modality::Image).await
            }
            StageRequest::SceneImage {
                scene_id,
                model_config_id,
                ..
            } => {
                if self
                    .ctx
                    .store
                    .get_scene_owned(*scene_id, project_id)
                    .await?
                    .is_none()
                {
                    return Err(CoreError::Validation(format!(
                        "scene {scene_id} does not exist for this project"
                    ))
                    .into());
                }
                self.check_config(*model_config_id, Modality::Image).await
            }
            StageRequest::VideoSegment {
                shot_id,
                model_config_id,
                ..
            } => {
                if self
                    .ctx
                    .store
                    .get_shot_owned(*shot_id, project_id)
                    .await?
                    .is_none()
                {
                    return Err(CoreError::Validation(format!(
                        "storyboard shot {shot_id} does not exist for this project"
                    ))
                    .into());
                }
                self.check_config(*model_config_id, Modality::Video).await
            }
            StageRequest::Merge { .. } => {
                let segments = self.ctx.store.list_segments(project_id).await?;
                if segments.is_empty() {
                    return Err(CoreError::Validation(
                        "project has no video segments to merge".to_string(),
                    )
                    .into());
                }
                if let Some(segment) = segments
                    .iter()
                    .find(|s| s.status_id != TaskStatus::Completed.id())
                {
                    return Err(CoreError::Validation(format!(
                        "segment {} has not completed",
                        segment.id
                    ))
                    .into());
                }
                Ok(())
            }
        }
    }

    /// The config must resolve cleanly and serve the wanted modality.
    async fn check_config(
        &self,
        model_config_id: DbId,
        wanted: Modality,
    ) -> Result<(), PipelineError> {
        let resolved = resolve_config(&self.ctx, model_config_id).await?;
        if resolved.spec.vendor.modality() != wanted {
            return Err(CoreError::Validation(format!(
                "model config '{}' does not provide {} generation",
                resolved.config.name,
                wanted.as_str()
            ))
            .into());
        }
        Ok(())
    }
}
