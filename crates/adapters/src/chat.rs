//! Chat message and response shapes shared by the text vendors.

use serde::Deserialize;

use crate::result::TokenUsage;

/// Role/content message pair in the common chat-completion shape.
#[derive(Debug, Clone, serde::Serialize)]
pub(crate) struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Assemble the message list: optional system message, then the user prompt.
pub(crate) fn build_messages(prompt: &str, system_prompt: Option<&str>) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = system_prompt {
        messages.push(ChatMessage {
            role: "system",
            content: system.to_string(),
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: prompt.to_string(),
    });
    messages
}

/// OpenAI-style chat completion response (used verbatim by Zhipu).
#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    pub content: String,
}

/// Token usage block in the OpenAI shape.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
    #[serde(default)]
    pub total_tokens: i64,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_message_comes_first() {
        let messages = build_messages("hi", Some("be brief"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "hi");
    }

    #[test]
    fn no_system_message_when_absent() {
        let messages = build_messages("hi", None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }
}
