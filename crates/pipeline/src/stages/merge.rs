//! Merge stage: concatenate a project's completed segments.
//!
//! The muxing itself happens behind the [`VideoMerger`] trait; the
//! stage only validates that every segment finished and hands the
//! ordered path list over.

use std::path::Path;

use async_trait::async_trait;
use reelforge_core::error::CoreError;
use reelforge_core::task::TaskStatus;
use reelforge_core::types::DbId;
use thiserror::Error;

use crate::error::PipelineError;
use crate::stages::StageContext;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("ffmpeg binary not found: {0}")]
    NotFound(std::io::Error),

    #[error("ffmpeg execution failed (exit code {exit_code:?}): {stderr}")]
    ExecutionFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Concatenates finished segment files into one output video.
#[async_trait]
pub trait VideoMerger: Send + Sync {
    /// Merge `segment_paths` in order into `output_path`.
    async fn merge(&self, segment_paths: &[String], output_path: &str) -> Result<(), MergeError>;
}

/// [`VideoMerger`] over the ffmpeg concat demuxer (stream copy, no
/// re-encode).
pub struct FfmpegMerger;

#[async_trait]
impl VideoMerger for FfmpegMerger {
    async fn merge(&self, segment_paths: &[String], output_path: &str) -> Result<(), MergeError> {
        // concat demuxer input: one `file '<path>'` line per segment.
        let list: String = segment_paths
            .iter()
            .map(|path| format!("file '{}'\n", path.replace('\'', "'\\''")))
            .collect();
        let list_path = Path::new(output_path).with_extension("segments.txt");
        tokio::fs::write(&list_path, list).await?;

        let output = tokio::process::Command::new("ffmpeg")
            .args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(output_path)
            .output()
            .await
            .map_err(MergeError::NotFound)?;

        let _ = tokio::fs::remove_file(&list_path).await;

        if !output.status.success() {
            return Err(MergeError::ExecutionFailed {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }
        Ok(())
    }
}

pub async fn run(
    ctx: &StageContext,
    project_id: DbId,
    output_path: &str,
) -> Result<serde_json::Value, PipelineError> {
    let segments = ctx.store.list_segments(project_id).await?;
    if segments.is_empty() {
        return Err(CoreError::Validation(
            "project has no video segments to merge".to_string(),
        )
        .into());
    }

    let mut paths = Vec::with_capacity(segments.len());
    for segment in &segments {
        if segment.status_id != TaskStatus::Completed.id() {
            return Err(CoreError::Validation(format!(
                "segment {} has not completed",
                segment.id
            ))
            .into());
        }
        match &segment.video_url {
            Some(url) => paths.push(url.clone()),
            None => {
                return Err(CoreError::Validation(format!(
                    "segment {} has no stored video",
                    segment.id
                ))
                .into())
            }
        }
    }

    ctx.merger
        .merge(&paths, output_path)
        .await
        .map_err(|e| PipelineError::Generation(e.to_string()))?;

    tracing::info!(
        project_id,
        segment_count = paths.len(),
        output_path,
        "segments merged"
    );

    Ok(serde_json::json!({
        "output_path": output_path,
        "segment_count": paths.len(),
    }))
}
