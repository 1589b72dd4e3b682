//! Stable Diffusion image binding (self-hosted HTTP service).
//!
//! Unlike the hosted text vendors there is no default endpoint: the
//! service URL always comes from the model configuration, and the API
//! key is optional (self-hosted deployments often run without auth).

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reelforge_core::model_config::ImageParams;
use serde::Deserialize;

use crate::http::{is_success, parse_json, transport_error, IMAGE_TIMEOUT, STATUS_TIMEOUT};
use crate::result::{GenerationResult, ImageRef};
use crate::traits::ImageAdapter;

#[derive(Debug)]
pub struct StableDiffusionAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    params: ImageParams,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    images: Vec<GeneratedImage>,
}

#[derive(Debug, Deserialize)]
struct GeneratedImage {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    b64: Option<String>,
}

impl StableDiffusionAdapter {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        endpoint: String,
        params: ImageParams,
    ) -> Self {
        Self {
            client,
            api_key,
            endpoint,
            params,
        }
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    async fn call(&self, path: &str, body: serde_json::Value) -> Result<Vec<ImageRef>, String> {
        let response = self
            .authed(self.client.post(format!("{}{path}", self.endpoint)))
            .timeout(IMAGE_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: GenerationResponse = parse_json(response).await?;
        if parsed.images.is_empty() {
            return Err("response contained no images".to_string());
        }

        Ok(parsed
            .images
            .into_iter()
            .map(|img| ImageRef {
                url: img.url,
                b64: img.b64,
            })
            .collect())
    }
}

#[async_trait]
impl ImageAdapter for StableDiffusionAdapter {
    async fn validate_credentials(&self) -> bool {
        let probe = self
            .authed(self.client.get(format!("{}/health", self.endpoint)))
            .timeout(STATUS_TIMEOUT)
            .send()
            .await;
        match probe {
            Ok(response) => is_success(&response),
            Err(_) => false,
        }
    }

    async fn generate_images(&self, prompt: &str) -> GenerationResult {
        let body = serde_json::json!({
            "prompt": prompt,
            "width": self.params.width,
            "height": self.params.height,
            "num_images": self.params.num_images,
            "steps": self.params.steps,
            "guidance_scale": self.params.guidance_scale,
            "seed": self.params.seed,
        });

        match self.call("/v1/generation", body).await {
            Ok(images) => GenerationResult::images(images),
            Err(error) => {
                tracing::warn!(error = %error, "Stable Diffusion generation failed");
                GenerationResult::failure(error)
            }
        }
    }

    async fn image_to_image(&self, image: &[u8], prompt: &str, strength: f64) -> GenerationResult {
        let body = serde_json::json!({
            "prompt": prompt,
            "init_image": BASE64.encode(image),
            "strength": strength,
            "width": self.params.width,
            "height": self.params.height,
            "num_images": self.params.num_images,
            "steps": self.params.steps,
            "guidance_scale": self.params.guidance_scale,
            "seed": self.params.seed,
        });

        match self.call("/v1/img2img", body).await {
            Ok(images) => GenerationResult::images(images),
            Err(error) => {
                tracing::warn!(error = %error, "Stable Diffusion img2img failed");
                GenerationResult::failure(error)
            }
        }
    }
}
