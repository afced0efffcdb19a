//! Local Ollama backend. Non-streaming `/api/chat` calls with the shared system prompt.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm_client::prompts::RESUME_EXPERT_SYSTEM;
use crate::llm_client::LlmError;
use crate::tailoring::scorer::RelevanceOracle;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
pub const DEFAULT_MODEL: &str = "qwen2.5:3b-instruct";

#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    pub async fn chat(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let req = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            stream: false,
        };

        let resp = self
            .client
            .post(self.endpoint("/api/chat"))
            .json(&req)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Err(LlmError::Unavailable(format!(
                "model '{}' is not installed on {}",
                self.model, self.base_url
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        debug!("Ollama reply: {} chars", parsed.message.content.len());
        Ok(parsed.message.content)
    }

    /// Whether the configured model is installed. Used as a startup probe.
    pub async fn is_model_available(&self) -> Result<bool, LlmError> {
        let resp = self.client.get(self.endpoint("/api/tags")).send().await?;
        if !resp.status().is_success() {
            return Err(LlmError::Api {
                status: resp.status().as_u16(),
                message: "could not list local models".to_string(),
            });
        }
        let tags: TagsResponse = resp.json().await?;
        Ok(tags.has_model(&self.model))
    }
}

#[async_trait]
impl RelevanceOracle for OllamaClient {
    async fn prompt(&self, text: &str) -> Result<String, LlmError> {
        self.chat(RESUME_EXPERT_SYSTEM, text).await
    }

    fn backend(&self) -> &'static str {
        "ollama"
    }
}

#[derive(Debug, Clone, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
struct ModelTag {
    name: String,
}

impl TagsResponse {
    /// `qwen2.5` matches an installed `qwen2.5:latest`.
    fn has_model(&self, model: &str) -> bool {
        self.models.iter().any(|tag| {
            tag.name == model || (!model.contains(':') && tag.name == format!("{model}:latest"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", DEFAULT_MODEL, Duration::from_secs(1));
        assert_eq!(client.endpoint("/api/chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_chat_request_is_non_streaming() {
        let req = ChatRequest {
            model: DEFAULT_MODEL,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["stream"], false);
        assert_eq!(json["model"], DEFAULT_MODEL);
    }

    #[test]
    fn test_chat_response_parses_message_content() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"model":"qwen2.5:3b-instruct","message":{"role":"assistant","content":"0.7"},"done":true}"#,
        )
        .unwrap();
        assert_eq!(parsed.message.content, "0.7");
    }

    #[test]
    fn test_has_model_matches_latest_tag() {
        let tags: TagsResponse = serde_json::from_str(
            r#"{"models":[{"name":"qwen2.5:3b-instruct"},{"name":"llama3:latest"}]}"#,
        )
        .unwrap();
        assert!(tags.has_model("qwen2.5:3b-instruct"));
        assert!(tags.has_model("llama3"));
        assert!(!tags.has_model("mistral"));
        assert!(!tags.has_model("llama3:8b"));
    }
}
