//! Baidu ERNIE text binding.
//!
//! ERNIE authenticates with an api-key/secret-key pair exchanged for a
//! short-lived OAuth access token; the credential is stored as a single
//! `api_key:secret_key` string. The chat endpoint also differs from the
//! OpenAI shape: the system prompt is a top-level field and vendor errors
//! come back with a 200 status and an `error_code` body.

use async_trait::async_trait;
use reelforge_core::model_config::ChatParams;
use serde::Deserialize;

use crate::chat::build_messages;
use crate::http::{parse_json, transport_error, STATUS_TIMEOUT, TEXT_TIMEOUT};
use crate::result::{GenerationResult, TokenUsage};
use crate::traits::TextAdapter;

/// OAuth token exchange endpoint.
pub const TOKEN_ENDPOINT: &str = "https://aip.baidubce.com/oauth/2.0/token";

/// Default chat API base when the model config has no endpoint override.
pub const DEFAULT_ENDPOINT: &str = "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop";

#[derive(Debug)]
pub struct BaiduAdapter {
    client: reqwest::Client,
    api_key: String,
    secret_key: String,
    model_name: String,
    base_url: String,
    params: ChatParams,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct ErnieResponse {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    usage: Option<ErnieUsage>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    error_msg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErnieUsage {
    #[serde(default)]
    prompt_tokens: i64,
    #[serde(default)]
    completion_tokens: i64,
    #[serde(default)]
    total_tokens: i64,
}

impl BaiduAdapter {
    /// Split a stored `api_key:secret_key` credential.
    ///
    /// Returns `None` when the separator is missing — the registry turns
    /// that into a configuration error before any request is made.
    pub fn split_credential(credential: &str) -> Option<(String, String)> {
        let (api_key, secret_key) = credential.split_once(':')?;
        if api_key.is_empty() || secret_key.is_empty() {
            return None;
        }
        Some((api_key.to_string(), secret_key.to_string()))
    }

    pub fn new(
        client: reqwest::Client,
        api_key: String,
        secret_key: String,
        model_name: String,
        endpoint: Option<String>,
        params: ChatParams,
    ) -> Self {
        Self {
            client,
            api_key,
            secret_key,
            model_name,
            base_url: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            params,
        }
    }

    async fn fetch_access_token(&self) -> Result<String, String> {
        let response = self
            .client
            .post(TOKEN_ENDPOINT)
            .timeout(STATUS_TIMEOUT)
            .query(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.api_key.as_str()),
                ("client_secret", self.secret_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let token: TokenResponse = parse_json(response).await?;
        Ok(token.access_token)
    }

    async fn chat(
        &self,
        prompt: &str,
        system_prompt: Option<&str>,
        temperature: f64,
        max_tokens: i32,
    ) -> Result<(String, TokenUsage), String> {
        let access_token = self.fetch_access_token().await?;

        // ERNIE takes the system prompt as a top-level field, not a message.
        let mut body = serde_json::json!({
            "messages": build_messages(prompt, None),
            "temperature": temperature,
            "max_output_tokens": max_tokens,
        });
        if let Some(system) = system_prompt {
            body["system"] = system.into();
        }
        if let Some(top_p) = self.params.top_p {
            body["top_p"] = top_p.into();
        }

        let response = self
            .client
            .post(format!("{}/chat/{}", self.base_url, self.model_name))
            .timeout(TEXT_TIMEOUT)
            .query(&[("access_token", access_token.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let parsed: ErnieResponse = parse_json(response).await?;
        if let Some(code) = parsed.error_code {
            return Err(format!(
                "vendor error {code}: {}",
                parsed.error_msg.unwrap_or_else(|| "unknown".to_string())
            ));
        }

        let text = parsed
            .result
            .ok_or_else(|| "response contained no result".to_string())?;
        let usage = parsed.usage.unwrap_or_default();

        Ok((
            text,
            TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            },
        ))
    }
}

#[async_trait]
impl TextAdapter for BaiduAdapter {
    async fn validate_credentials(&self) -> bool {
        // Token exchange alone exercises the key pair.
        self.fetch_access_token().await.is_ok()
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
                tracing::warn!(model = %self.model_name, error = %error, "Baidu generation failed");
                GenerationResult::failure(error)
            }
        }
    }
}
