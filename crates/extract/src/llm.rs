use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Transport or provider failure while asking the model.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Model returned no text")]
    EmptyResponse,
}

/// "Ask the model a question, get a text answer."
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for std::sync::Arc<T> {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        (**self).complete(system, prompt).await
    }

    fn model(&self) -> &str {
        (**self).model()
    }
}

/// Sampling settings shared by both providers.
#[derive(Debug, Clone)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            max_tokens: 4000,
            temperature: 0.0,
        }
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Connection(e.to_string()))
}

// ---------------------------------------------------------------------------
// Anthropic Messages API
// ---------------------------------------------------------------------------

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Clone)]
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    model: String,
    sampling: Sampling,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

impl AnthropicClient {
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
        sampling: Sampling,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
            sampling,
            client: http_client(timeout)?,
        })
    }

    /// Same connection, different model.
    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn with_sampling(&self, sampling: Sampling) -> Self {
        Self {
            sampling,
            ..self.clone()
        }
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.sampling.max_tokens,
            temperature: self.sampling.temperature,
            system,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        parsed
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text)
            .ok_or(LlmError::EmptyResponse)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Ollama
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    model: String,
    sampling: Sampling,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        sampling: Sampling,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            sampling,
            client: http_client(timeout)?,
        })
    }

    pub fn with_model(&self, model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..self.clone()
        }
    }

    pub fn with_sampling(&self, sampling: Sampling) -> Self {
        Self {
            sampling,
            ..self.clone()
        }
    }
}

#[async_trait]
impl CompletionClient for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            options: OllamaOptions {
                temperature: self.sampling.temperature,
                num_predict: self.sampling.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let ollama_response: OllamaResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        Ok(ollama_response.response)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ---------------------------------------------------------------------------
// Model resolution
// ---------------------------------------------------------------------------

/// Pick the first candidate model that answers a tiny test request.
///
/// `probe` builds a client for a candidate. When no candidate answers, the
/// last one is returned so the batch still runs and surfaces the provider's
/// error per document.
pub async fn resolve_model<C, F>(candidates: &[String], probe: F) -> Option<String>
where
    C: CompletionClient,
    F: Fn(&str) -> C,
{
    for candidate in candidates {
        let client = probe(candidate);
        match client.complete("", "test").await {
            Ok(_) => {
                info!(model = %candidate, "Resolved model");
                return Some(candidate.clone());
            }
            Err(e) => {
                debug!(model = %candidate, error = %e, "Model probe failed");
            }
        }
    }

    let fallback = candidates.last().cloned();
    if let Some(model) = &fallback {
        warn!(model = %model, "No candidate model answered, using last candidate");
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedClient;

    #[tokio::test]
    async fn test_resolve_model_takes_first_that_answers() {
        let candidates = vec!["newest".to_string(), "older".to_string(), "oldest".to_string()];

        let resolved = resolve_model(&candidates, |model| {
            if model == "newest" {
                ScriptedClient::failing_on(&[1])
            } else {
                ScriptedClient::constant("ok")
            }
        })
        .await;

        assert_eq!(resolved.as_deref(), Some("older"));
    }

    #[tokio::test]
    async fn test_resolve_model_falls_back_to_last() {
        let candidates = vec!["a".to_string(), "b".to_string()];
        let resolved = resolve_model(&candidates, |_| ScriptedClient::failing_on(&[1])).await;
        assert_eq!(resolved.as_deref(), Some("b"));

        let none = resolve_model(&[], |_| ScriptedClient::constant("ok")).await;
        assert_eq!(none, None);
    }

    #[test]
    fn test_messages_request_shape() {
        let request = MessagesRequest {
            model: "m",
            max_tokens: 4000,
            temperature: 0.0,
            system: "sys",
            messages: vec![Message {
                role: "user",
                content: "hi",
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["system"], "sys");
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["temperature"], 0.0);
    }

    #[test]
    fn test_messages_response_takes_text_block() {
        let body = r#"{"content":[{"type":"text","text":"\"Quote\" (Page 2)"}]}"#;
        let parsed: MessagesResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.content[0].kind, "text");
        assert_eq!(parsed.content[0].text, "\"Quote\" (Page 2)");
    }
}
