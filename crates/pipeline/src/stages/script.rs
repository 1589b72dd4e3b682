//! Script stage: story outline + text model -> new script version.

use reelforge_core::error::CoreError;
use reelforge_core::generation::{GenerationRequest, DEFAULT_SCRIPT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use reelforge_core::prompts::{build_script_prompt, DEFAULT_SCRIPT_SYSTEM_PROMPT};
use reelforge_core::types::DbId;
use reelforge_db::models::script::CreateScript;

use crate::error::PipelineError;
use crate::stages::{resolve_config, StageContext};

pub async fn run(
    ctx: &StageContext,
    project_id: DbId,
    model_config_id: DbId,
) -> Result<serde_json::Value, PipelineError> {
    let project = ctx
        .store
        .get_project(project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "project",
            id: project_id,
        })?;
    let outline = project.story_outline.as_deref().ok_or_else(|| {
        CoreError::Validation("project has no story outline".to_string())
    })?;

    let resolved = resolve_config(ctx, model_config_id).await?;
    let adapter = ctx.adapters.text_adapter(&resolved.spec)?;

    let system_prompt = resolved
        .config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SCRIPT_SYSTEM_PROMPT);
    let request = GenerationRequest {
        target_id: project_id,
        prompt: build_script_prompt(outline, resolved.config.prompt_template.as_deref()),
        model_config_id,
        temperature: DEFAULT_TEMPERATURE,
        max_tokens: DEFAULT_SCRIPT_MAX_TOKENS,
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

    let script = ctx
        .store
        .create_script(CreateScript {
            project_id,
            content: text,
            generated_by_config: Some(model_config_id),
        })
        .await?;

    tracing::info!(
        project_id,
        script_id = script.id,
        version = script.version,
        "script generated"
    );

    Ok(serde_json::json!({
        "script_id": script.id,
        "version": script.version,
        "usage": usage,
    }))
}
