//! Image stages: character and scene reference stills.
//!
//! Both run the same shape: owner-scoped entity lookup, image adapter
//! call, then the first usable reference is stored on the entity. A
//! vendor returning only inline base64 is rejected here; persisting
//! blobs is the storage layer's job, not the task row's.

use reelforge_adapters::{GenerationPayload, GenerationResult, ImageRef};
use reelforge_core::error::CoreError;
use reelforge_core::types::DbId;

use crate::error::PipelineError;
use crate::stages::{resolve_config, StageContext};

pub async fn run_character(
    ctx: &StageContext,
    project_id: DbId,
    character_id: DbId,
    model_config_id: DbId,
) -> Result<serde_json::Value, PipelineError> {
    let character = ctx
        .store
        .get_character_owned(character_id, project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "character",
            id: character_id,
        })?;
    let description = character.description.as_deref().ok_or_else(|| {
        CoreError::Validation("character has no description to prompt from".to_string())
    })?;

    let prompt = format!("Character reference: {}. {description}", character.name);
    let images = generate(ctx, model_config_id, &prompt).await?;
    let url = primary_url(&images)?;
    ctx.store.set_character_image(character_id, url).await?;

    tracing::info!(project_id, character_id, "character image stored");
    Ok(summary(character_id, &images))
}

pub async fn run_scene(
    ctx: &StageContext,
    project_id: DbId,
    scene_id: DbId,
    model_config_id: DbId,
) -> Result<serde_json::Value, PipelineError> {
    let scene = ctx
        .store
        .get_scene_owned(scene_id, project_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "scene",
            id: scene_id,
        })?;

    let images = generate(ctx, model_config_id, &scene.description).await?;
    let url = primary_url(&images)?;
    ctx.store.set_scene_image(scene_id, url).await?;

    tracing::info!(project_id, scene_id, "scene image stored");
    Ok(summary(scene_id, &images))
}

async fn generate(
    ctx: &StageContext,
    model_config_id: DbId,
    prompt: &str,
) -> Result<Vec<ImageRef>, PipelineError> {
    let resolved = resolve_config(ctx, model_config_id).await?;
    let adapter = ctx.adapters.image_adapter(&resolved.spec)?;

    match adapter.generate_images(prompt).await {
        GenerationResult::Success {
            payload: GenerationPayload::Images(images),
            ..
        } => Ok(images),
        GenerationResult::Success { .. } => {
            Err(PipelineError::Generation("expected image output".to_string()))
        }
        GenerationResult::Failure { error } => Err(PipelineError::Generation(error)),
    }
}

fn primary_url(images: &[ImageRef]) -> Result<&str, PipelineError> {
    images
        .iter()
        .find_map(|image| image.url.as_deref())
        .ok_or_else(|| {
            PipelineError::Generation("vendor returned no image URL".to_string())
        })
}

fn summary(target_id: DbId, images: &[ImageRef]) -> serde_json::Value {
    let urls: Vec<&str> = images.iter().filter_map(|i| i.url.as_deref()).collect();
    serde_json::json!({
        "target_id": target_id,
        "image_count": images.len(),
        "urls": urls,
    })
}
