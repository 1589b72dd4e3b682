//! Capability traits implemented by every vendor binding.
//!
//! One trait per generation modality. All methods are infallible at the
//! type level in the sense that transport problems come back inside the
//! [`GenerationResult`] / [`VideoJobStatus`] values, never as `Err` —
//! the orchestrator treats a failed result and a vendor error uniformly.

use async_trait::async_trait;

use crate::result::{GenerationResult, VideoJobHandle, VideoJobStatus};

/// Text (chat-completion style) generation backend.
#[async_trait]
pub trait TextAdapter: Send + Sync + std::fmt::Debug {
    /// Probe the credential with a minimal request. Never errors: any
    /// network or auth failure resolves to `false`.
    async fn validate_credentials(&self) -> bool;

    /// Generate text for a prompt. `system_prompt` is prepended as a
    /// system message when present.
    async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f64,
        max_tokens: i32,
    ) -> GenerationResult;
}

/// Image generation backend.
#[async_trait]
pub trait ImageAdapter: Send + Sync + std::fmt::Debug {
    /// Probe the credential/endpoint. Never errors.
    async fn validate_credentials(&self) -> bool;

    /// Generate a set of images from a prompt, using the parameters the
    /// adapter was configured with.
    async fn generate_images(&self, prompt: &str) -> GenerationResult;

    /// Generate variations of an existing image. Vendors without
    /// image-to-image support return a failure result.
    async fn image_to_image(&self, image: &[u8], prompt: &str, strength: f64) -> GenerationResult {
        let _ = (image, prompt, strength);
        GenerationResult::failure("image-to-image is not supported by this vendor")
    }
}

/// Asynchronous video generation backend.
#[async_trait]
pub trait VideoAdapter: Send + Sync {
    /// Probe the credential/endpoint. Never errors.
    async fn validate_credentials(&self) -> bool;

    /// Submit a generation job. A success carries the vendor job handle
    /// with the job still pending on the vendor side.
    async fn start_video(&self, prompt: &str) -> GenerationResult;

    /// Check the state of a previously submitted job. Transport failures
    /// surface as [`VideoJobStatus::Failed`].
    async fn poll_status(&self, handle: &VideoJobHandle) -> VideoJobStatus;
}
