//! Stage bodies: stateless operations from (input entity, model config)
//! to a stored output artifact.
//!
//! Each stage resolves its model config into an adapter, performs the
//! vendor call, persists the result and returns a small JSON summary
//! that lands in the task's `result` column.

use std::sync::Arc;

use reelforge_adapters::{
    AdapterRegistry, AdapterSpec, ImageAdapter, PollConfig, TextAdapter, VideoAdapter,
};
use reelforge_core::credentials::CredentialKey;
use reelforge_core::error::CoreError;
use reelforge_core::model_config::{parse_params, Vendor};
use reelforge_core::types::DbId;
use reelforge_db::models::model_config::ModelConfig;

use crate::error::PipelineError;
use crate::request::StageRequest;
use crate::store::PipelineStore;

pub mod image;
pub mod merge;
pub mod script;
pub mod storyboard;
pub mod video;

pub use merge::{FfmpegMerger, VideoMerger};

/// Hands out vendor adapters for a resolved spec. Implemented by the
/// production [`AdapterRegistry`]; tests substitute scripted adapters.
pub trait AdapterProvider: Send + Sync {
    fn text_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn TextAdapter>, CoreError>;
    fn image_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn ImageAdapter>, CoreError>;
    fn video_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn VideoAdapter>, CoreError>;
}

impl AdapterProvider for AdapterRegistry {
    fn text_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn TextAdapter>, CoreError> {
        AdapterRegistry::text_adapter(self, spec)
    }

    fn image_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn ImageAdapter>, CoreError> {
        AdapterRegistry::image_adapter(self, spec)
    }

    fn video_adapter(&self, spec: &AdapterSpec) -> Result<Box<dyn VideoAdapter>, CoreError> {
        AdapterRegistry::video_adapter(self, spec)
    }
}

/// Shared dependencies handed to every stage body.
pub struct StageContext {
    pub store: Arc<dyn PipelineStore>,
    pub adapters: Arc<dyn AdapterProvider>,
    pub key: CredentialKey,
    pub poll: PollConfig,
    pub merger: Arc<dyn VideoMerger>,
}

/// A model config resolved into an adapter spec, with the row kept for
/// its prompt fields.
pub(crate) struct ResolvedConfig {
    pub config: ModelConfig,
    pub spec: AdapterSpec,
}

/// Load a model config and turn it into an [`AdapterSpec`].
///
/// Unknown vendor tags, malformed parameter blocks, disabled configs
/// and credentials sealed under a different key all fail closed here.
pub(crate) async fn resolve_config(
    ctx: &StageContext,
    model_config_id: DbId,
) -> Result<ResolvedConfig, PipelineError> {
    let config = ctx
        .store
        .get_model_config(model_config_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "model config",
            id: model_config_id,
        })?;

    if !config.is_enabled {
        return Err(CoreError::Validation(format!(
            "model config '{}' is disabled",
            config.name
        ))
        .into());
    }

    let vendor = Vendor::parse(&config.vendor)?;
    let params = parse_params(vendor, &config.params)?;

    let api_key = match &config.credential {
        Some(sealed) => Some(ctx.key.open(sealed).map_err(|_| {
            CoreError::Config(format!(
                "credential for model config '{}' could not be unsealed",
                config.name
            ))
        })?),
        None => None,
    };

    let spec = AdapterSpec {
        vendor,
        model_name: config.model_name.clone(),
        api_key,
        endpoint: config.endpoint.clone(),
        params,
    };
    Ok(ResolvedConfig { config, spec })
}

/// Execute the stage a request names. The returned JSON summary is the
/// task result payload.
pub async fn run(
    ctx: &StageContext,
    request: &StageRequest,
) -> Result<serde_json::Value, PipelineError> {
    match request {
        StageRequest::Script {
            project_id,
            model_config_id,
        } => script::run(ctx, *project_id, *model_config_id).await,
        StageRequest::Storyboard {
            project_id,
            script_id,
            model_config_id,
        } => storyboard::run(ctx, *project_id, *script_id, *model_config_id)
            .await
            .map(|outcome| outcome.into_json()),
        StageRequest::CharacterImage {
            project_id,
            character_id,
            model_config_id,
        } => image::run_character(ctx, *project_id, *character_id, *model_config_id).await,
        StageRequest::SceneImage {
            project_id,
            scene_id,
            model_config_id,
        } => image::run_scene(ctx, *project_id, *scene_id, *model_config_id).await,
        StageRequest::VideoSegment {
            project_id,
            shot_id,
            model_config_id,
        } => video::run(ctx, *project_id, *shot_id, *model_config_id).await,
        StageRequest::Merge {
            project_id,
            output_path,
        } => merge::run(ctx, *project_id, output_path).await,
    }
}
