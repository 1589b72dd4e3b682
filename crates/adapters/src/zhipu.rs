//! Zhipu GLM text binding (OpenAI-compatible chat completion API).

use async_trait::async_trait;
use reelforge_core::model_config::ChatParams;

use crate::chat::{build_messages, ChatCompletionResponse};
use crate::http::{parse_json, transport_error, TEXT_TIMEOUT};
use crate::result::{GenerationResult, TokenUsage};
use crate::traits::TextAdapter;

/// Default API base when the model config has no endpoint override.
pub const DEFAULT_ENDPOINT: &str = "https://open.bigmodel.cn/api/paas/v4";

#[derive(Debug)]
pub struct ZhipuAdapter {
    client: reqwest::Client,
    api_key: String,
    model_name: String,
    base_url: String,
    params: ChatParams,
}

impl ZhipuAdapter {
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
        let mut body = serde_json::json!({
            "model": self.model_name,
            "messages": build_messages(prompt, system_prompt),
            "temperature": temperature,
            "max_tokens": max_tokens,
        });
        if let Some(top_p) = self.params.top_p {
            body["top_p"] = top_p.into();
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(TEXT_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: ChatCompletionResponse = parse_json(response).await?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| "response contained no choices".to_string())?;

        Ok((
            choice.message.content,
            parsed.usage.unwrap_or_default().into(),
        ))
    }
}

#[async_trait]
impl TextAdapter for ZhipuAdapter {
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
                tracing::warn!(model = %self.model_name, error = %error, "Zhipu generation failed");
                GenerationResult::failure(error)
            }
        }
    }
}
