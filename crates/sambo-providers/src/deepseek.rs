//! DeepSeek chat-completion generator.
//!
//! OpenAI-compatible API; a single bounded request per report. Any
//! failure here is recovered by the deterministic fallback template.

use async_trait::async_trait;
use sambo_core::{config::DeepSeekConfig, error::SamboError, traits::Generator};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const SYSTEM_PROMPT: &str = "You are a supportive habit-tracking coach. \
     Write a short, encouraging weekly summary based only on the numbers \
     given. Mention notable improvements and declines. Keep it under 150 \
     words, plain text.";

/// DeepSeek (OpenAI-compatible) provider.
pub struct DeepSeekGenerator {
    client: reqwest::Client,
    config: DeepSeekConfig,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

impl DeepSeekGenerator {
    /// Create from config values.
    pub fn new(config: DeepSeekConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Generator for DeepSeekGenerator {
    fn name(&self) -> &str {
        "deepseek"
    }

    fn is_configured(&self) -> bool {
        self.config.enabled && !self.config.api_key.is_empty()
    }

    async fn generate(&self, prompt: &str) -> Result<String, SamboError> {
        if !self.is_configured() {
            return Err(SamboError::Config("deepseek: no API key configured".into()));
        }

        let body = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        debug!("deepseek: POST {url} model={}", self.config.model);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&body)
            .send()
            .await
            .map_err(|e| SamboError::Provider(format!("deepseek request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(SamboError::Provider(format!(
                "deepseek returned {status}: {text}"
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| SamboError::Provider(format!("deepseek: failed to parse response: {e}")))?;

        let text = parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            warn!("deepseek: empty completion");
            return Err(SamboError::Provider("deepseek: empty completion".into()));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_without_key() {
        let g = DeepSeekGenerator::new(DeepSeekConfig {
            enabled: true,
            ..Default::default()
        });
        assert!(!g.is_configured());

        let g = DeepSeekGenerator::new(DeepSeekConfig {
            enabled: false,
            api_key: "sk-test".into(),
            ..Default::default()
        });
        assert!(!g.is_configured());

        let g = DeepSeekGenerator::new(DeepSeekConfig {
            enabled: true,
            api_key: "sk-test".into(),
            ..Default::default()
        });
        assert!(g.is_configured());
        assert_eq!(g.name(), "deepseek");
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"Nice week!"},"finish_reason":"stop"}],"model":"deepseek-chat"}"#;
        let resp: ChatCompletionResponse = serde_json::from_str(json).unwrap();
        let text = resp
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .map(|m| m.content.clone());
        assert_eq!(text, Some("Nice week!".into()));
    }

    #[test]
    fn test_request_serialization() {
        let req = ChatCompletionRequest {
            model: "deepseek-chat".into(),
            messages: vec![ChatMessage {
                role: "user".into(),
                content: "stats".into(),
            }],
            temperature: 0.7,
            max_tokens: 600,
        };
        let v: serde_json::Value = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "deepseek-chat");
        assert_eq!(v["max_tokens"], 600);
        assert_eq!(v["messages"][0]["role"], "user");
    }
}
