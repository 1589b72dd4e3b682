//! Generation result types shared by all adapters.
//!
//! Every adapter call resolves to a [`GenerationResult`]: either a payload
//! with usage metrics, or a failure with a human-readable message.
//! Transport problems (timeouts, non-2xx responses, malformed payloads)
//! are always folded into the failure variant — callers never see a raw
//! HTTP error.

use serde::{Deserialize, Serialize};

/// Token accounting reported by text vendors. Zero for image/video calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
    pub total_tokens: i64,
}

/// A reference to one generated image. Vendors return a URL, inline
/// base64 data, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub b64: Option<String>,
}

/// Handle to an asynchronous vendor-side video job.
///
/// Video generation completes out of band: the submit call returns this
/// handle and the finished asset is retrieved by polling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoJobHandle {
    pub job_id: String,
}

/// The successful output of a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPayload {
    Text(String),
    Images(Vec<ImageRef>),
    /// An accepted-but-pending vendor job, not the finished asset.
    VideoJob(VideoJobHandle),
}

/// Outcome of one adapter call. Exactly one of payload or error exists.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Success {
        payload: GenerationPayload,
        usage: TokenUsage,
    },
    Failure {
        error: String,
    },
}

impl GenerationResult {
    /// Build a success carrying text output and its token usage.
    pub fn text(text: String, usage: TokenUsage) -> Self {
        Self::Success {
            payload: GenerationPayload::Text(text),
            usage,
        }
    }

    /// Build a success carrying a set of image references.
    pub fn images(images: Vec<ImageRef>) -> Self {
        Self::Success {
            payload: GenerationPayload::Images(images),
            usage: TokenUsage::default(),
        }
    }

    /// Build a success carrying a pending video job handle.
    pub fn video_job(job_id: String) -> Self {
        Self::Success {
            payload: GenerationPayload::VideoJob(VideoJobHandle { job_id }),
            usage: TokenUsage::default(),
        }
    }

    /// Build a failure with a human-readable message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure message, if any.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failure { error } => Some(error),
            Self::Success { .. } => None,
        }
    }

    /// Split into payload and usage, or the failure message.
    pub fn into_parts(self) -> Result<(GenerationPayload, TokenUsage), String> {
        match self {
            Self::Success { payload, usage } => Ok((payload, usage)),
            Self::Failure { error } => Err(error),
        }
    }
}

/// Vendor-reported state of an asynchronous video job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VideoJobStatus {
    Pending {
        /// Vendor progress estimate in 0..=100.
        progress: i16,
    },
    Completed {
        video_url: String,
    },
    Failed {
        error: String,
    },
}
