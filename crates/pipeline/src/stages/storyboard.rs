//! Storyboard stage: script + text model -> parsed shot set.
//!
//! The model output runs through the two-tier parser and the surviving
//! entries replace the script's previous set atomically. Also exposed
//! synchronously through the coordinator, so the outcome carries the
//! stored shots alongside the usage metrics.

use reelforge_adapters::TokenUsage;
use reelforge_core::error::CoreError;
use reelforge_core::generation::{
    GenerationRequest, DEFAULT_STORYBOARD_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use reelforge_core::prompts::{build_storyboard_prompt, DEFAULT_STORYBOARD_SYSTEM_PROMPT};
use reelforge_core::storyboard::parse_storyboard;
use reelforge_core::types::DbId;
use reelforge_db::models::storyboard::StoryboardShot;

use crate::error::PipelineError;
use crate::stages::{resolve_config, StageContext};

/// Stored shots plus the token usage of the generating call.
#[derive(Debug)]
pub struct StoryboardOutcome {
    pub shots: Vec<StoryboardShot>,
    pub usage: TokenUsage,
}

impl StoryboardOutcome {
    pub fn into_json(self) -> serde_json::Value {
        serde_json::json!({
            "shot_count": self.shots.len(),
            "usage": self.usage,
        })
    }
}

pub async fn run(
    ctx: &StageContext,
    project_id: DbId,
    script_id: DbId,
    model_config_id: DbId,
) -> Result<StoryboardOutcome, PipelineError> {
    let script = ctx
        .store
        .get_script_owned(script_id, project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "script",
            id: script_id,
        })?;

    let resolved = resolve_config(ctx, model_config_id).await?;
    let adapter = ctx.adapters.text_adapter(&resolved.spec)?;

    let system_prompt = resolved
        .config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_STORYBOARD_SYSTEM_PROMPT);
    let request = GenerationRequest {
        target_id: script_id,
        prompt: build_storyboard_prompt(&script.content),
        model_config_id,
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: DEFAULT_STORYBOARD_MAX_TOKENS,
    };
    request.validate()?;

    let result = adapter
        .generate_text(
            &request.prompt,
            Some(system_prompt),
            request.temperature,
            request.max_tokens,
        )
        .await;

    let (payload, usage) = result.into_parts().map_err(PipelineError::Generation)?;
    let text = match payload {
        reelforge_adapters::GenerationPayload::Text(text) => text,
        _ => return Err(PipelineError::Generation("expected text output".to_string())),
    };

    let drafts = parse_storyboard(&text)?;
    let shots = ctx.store.replace_storyboard(script_id, &drafts).await?;

    tracing::info!(
        project_id,
        script_id,
        shot_count = shots.len(),
        "storyboard replaced"
    );

    Ok(StoryboardOutcome { shots, usage })
}
