//! Video segment stage: storyboard shot -> vendor job -> stored clip.
//!
//! The segment row mirrors the vendor job: pending on creation,
//! processing once the job is accepted, then completed with the asset
//! URL or failed. A poll timeout fails the segment; the vendor job may
//! still finish on its side, but we stop waiting.

use reelforge_adapters::{poll_video_job, GenerationPayload, GenerationResult, PollOutcome};
use reelforge_core::error::CoreError;
use reelforge_core::types::DbId;
use reelforge_db::models::segment::CreateVideoSegment;

use crate::error::PipelineError;
use crate::stages::{resolve_config, StageContext};

pub async fn run(
    ctx: &StageContext,
    project_id: DbId,
    shot_id: DbId,
    model_config_id: DbId,
) -> Result<serde_json::Value, PipelineError> {
    let shot = ctx
        .store
        .get_shot_owned(shot_id, project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "storyboard shot",
            id: shot_id,
        })?;

    let resolved = resolve_config(ctx, model_config_id).await?;
    let adapter = ctx.adapters.video_adapter(&resolved.spec)?;

    let segment = ctx
        .store
        .create_segment(CreateVideoSegment {
            project_id,
            shot_id,
            sequence_number: shot.sequence_number,
            duration_secs: shot.duration_secs,
        })
        .await?;

    let handle = match adapter.start_video(&shot.content).await {
        GenerationResult::Success {
            payload: GenerationPayload::VideoJob(handle),
            ..
        } => handle,
        GenerationResult::Success { .. } => {
            let error = "expected a video job handle".to_string();
            ctx.store.segment_fail(segment.id, &error).await?;
            return Err(PipelineError::Generation(error));
        }
        GenerationResult::Failure { error } => {
            ctx.store.segment_fail(segment.id, &error).await?;
            return Err(PipelineError::Generation(error));
        }
    };

    ctx.store
        .segment_mark_processing(segment.id, &handle.job_id)
        .await?;
    tracing::info!(
        project_id,
        segment_id = segment.id,
        job_id = %handle.job_id,
        "video job submitted"
    );

    match poll_video_job(adapter.as_ref(), &handle, ctx.poll).await {
        PollOutcome::Completed { video_url } => {
            ctx.store.segment_complete(segment.id, &video_url).await?;
            Ok(serde_json::json!({
                "segment_id": segment.id,
                "video_url": video_url,
            }))
        }
        PollOutcome::Failed { error } => {
            ctx.store.segment_fail(segment.id, &error).await?;
            Err(PipelineError::Generation(error))
        }
        PollOutcome::TimedOut => {
            ctx.store
                .segment_fail(segment.id, "video generation timed out")
                .await?;
            Err(PipelineError::TimedOut)
        }
    }
}
