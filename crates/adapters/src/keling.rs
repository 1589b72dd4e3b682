//! Keling video binding.
//!
//! Video generation is asynchronous on the vendor side: submission
//! returns a job id and the finished asset is retrieved by polling the
//! status endpoint until the job reaches a terminal state.

use async_trait::async_trait;
use reelforge_core::model_config::VideoParams;
use serde::Deserialize;

use crate::http::{is_success, parse_json, transport_error, STATUS_TIMEOUT, SUBMIT_TIMEOUT};
use crate::result::{GenerationResult, VideoJobHandle, VideoJobStatus};
use crate::traits::VideoAdapter;

pub struct KelingAdapter {
    client: reqwest::Client,
    api_key: String,
    model_name: String,
    endpoint: String,
    params: VideoParams,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
    #[serde(default)]
    progress: Option<i16>,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl KelingAdapter {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model_name: String,
        endpoint: String,
        params: VideoParams,
    ) -> Self {
        Self {
            client,
            api_key,
            model_name,
            endpoint,
            params,
        }
    }

    async fn submit(&self, prompt: &str) -> Result<String, String> {
        let body = serde_json::json!({
            "model": self.model_name,
            "prompt": prompt,
            "duration": self.params.duration,
            "fps": self.params.fps,
            "width": self.params.width,
            "height": self.params.height,
            "mode": self.params.mode,
            "seed": self.params.seed,
        });

        let response = self
            .client
            .post(format!("{}/api/v1/videos/generate", self.endpoint))
            .bearer_auth(&self.api_key)
            .timeout(SUBMIT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: SubmitResponse = parse_json(response).await?;
        Ok(parsed.task_id)
    }

    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse, String> {
        let response = self
            .client
            .get(format!("{}/api/v1/videos/status/{job_id}", self.endpoint))
            .bearer_auth(&self.api_key)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await
            .map_err(transport_error)?;

        parse_json(response).await
    }
}

#[async_trait]
impl VideoAdapter for KelingAdapter {
    async fn validate_credentials(&self) -> bool {
        let probe = self
            .client
            .get(format!("{}/api/v1/status", self.endpoint))
            .bearer_auth(&self.api_key)
            .timeout(STATUS_TIMEOUT)
            .send()
            .await;
        match probe {
            Ok(response) => is_success(&response),
            Err(_) => false,
        }
    }

    async fn start_video(&self, prompt: &str) -> GenerationResult {
        match self.submit(prompt).await {
            Ok(job_id) => GenerationResult::video_job(job_id),
            Err(error) => {
                tracing::warn!(model = %self.model_name, error = %error, "Keling submission failed");
                GenerationResult::failure(error)
            }
        }
    }

    async fn poll_status(&self, handle: &VideoJobHandle) -> VideoJobStatus {
        let response = match self.fetch_status(&handle.job_id).await {
            Ok(response) => response,
            Err(error) => return VideoJobStatus::Failed { error },
        };

        match response.status.as_str() {
            "completed" => match response.video_url {
                Some(video_url) => VideoJobStatus::Completed { video_url },
                None => VideoJobStatus::Failed {
                    error: "job completed without a video URL".to_string(),
                },
            },
            "failed" => VideoJobStatus::Failed {
                error: response
                    .error
                    .unwrap_or_else(|| "vendor reported failure".to_string()),
            },
            // "pending", "processing" and anything unrecognized keep the
            // poll loop going until its budget runs out.
            _ => VideoJobStatus::Pending {
                progress: response.progress.unwrap_or(0).clamp(0, 100),
            },
        }
    }
}
