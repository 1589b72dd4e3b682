//! Tongyi (DashScope) text binding.
//!
//! DashScope wraps the chat shape differently from the OpenAI style:
//! messages go under `input`, tuning knobs under `parameters`, and the
//! usage block reports `input_tokens`/`output_tokens`.

use async_trait::async_trait;
use reelforge_core::model_config::ChatParams;
use serde::Deserialize;

use crate::chat::build_messages;
use crate::http::{parse_json, transport_error, TEXT_TIMEOUT};
use crate::result::{GenerationResult, TokenUsage};
use crate::traits::TextAdapter;

/// Default API base when the model config has no endpoint override.
pub const DEFAULT_ENDPOINT: &str = "https://dashscope.aliyuncs.com/api/v1";

#[derive(Debug)]
pub struct TongyiAdapter {
    client: reqwest::Client,
    api_key: String,
    model_name: String,
    base_url: String,
    params: ChatParams,
}

#[derive(Debug, Deserialize)]
struct DashScopeResponse {
    output: DashScopeOutput,
    #[serde(default)]
    usage: Option<DashScopeUsage>,
}

#[derive(Debug, Deserialize)]
struct DashScopeOutput {
    choices: Vec<DashScopeChoice>,
}

#[derive(Debug, Deserialize)]
struct DashScopeChoice {
    message: DashScopeMessage,
}

#[derive(Debug, Deserialize)]
struct DashScopeMessage {
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct DashScopeUsage {
    #[serde(default)]
    input_tokens: i64,
    #[serde(default)]
    output_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
}

impl TongyiAdapter {
    pub fn new(
        client: reqwest::Client,
        api_key: String,
        model_name: String,
        endpoint: Option<String>,
        params: ChatParams,
    ) -> Self {
        Self {
            client,
            api_key,
            model_name,
            base_url: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            params,
        }
    }

    async fn chat(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f64,
        max_tokens: i32,
    ) -> Result<(String, TokenUsage), String> {
        let mut parameters = serde_json::json!({
            "result_format": "message",
            "temperature": temperature,
            "max_tokens": max_tokens,
        });
        if let Some(top_p) = self.params.top_p {
            parameters["top_p"] = top_p.into();
        }

        let body = serde_json::json!({
            "model": self.model_name,
            "input": { "messages": build_messages(prompt, system_prompt) },
            "parameters": parameters,
        });

        let response = self
            .client
            .post(format!(
                "{}/services/aigc/text-generation/generation",
                self.base_url
            ))
            .bearer_auth(&self.api_key)
            .timeout(TEXT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: DashScopeResponse = parse_json(response).await?;
        let choice = parsed
            .output
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_string())?;

        let usage = parsed.usage.unwrap_or_default();
        Ok((
            choice.message.content,
            TokenUsage {
                prompt_tokens: usage.input_tokens,
                completion_tokens: usage.output_tokens,
                total_tokens: usage.total_tokens,
            },
        ))
    }
}

#[async_trait]
impl TextAdapter for TongyiAdapter {
    async fn validate_credentials(&self) -> bool {
        self.chat("ping", None, 0.7, 1).await.is_ok()
    }

    async fn generate_text(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f64,
        max_tokens: i32,
    ) -> GenerationResult {
        match self.chat(prompt, system_prompt, temperature, max_tokens).await {
            Ok((text, usage)) => GenerationResult::text(text, usage),
            Err(error) => {
                tracing::warn!(model = %self.model_name, error = %error, "Tongyi generation failed");
                GenerationResult::failure(error)
            }
        }
    }
}
