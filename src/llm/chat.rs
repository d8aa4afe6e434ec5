//! OpenAI-compatible chat completions client

use super::LanguageModel;
use crate::config::LlmConfig;
use crate::error::{Result, SummarizeError};
use crate::metrics::METRICS;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for the chat model client
#[derive(Debug, Clone)]
pub struct ChatModelConfig {
    pub endpoint: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl From<&LlmConfig> for ChatModelConfig {
    fn from(config: &LlmConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout: config.timeout(),
        }
    }
}

/// Language model reached over an OpenAI-compatible HTTP API
pub struct ChatCompletionModel {
    client: Client,
    config: ChatModelConfig,
}

impl ChatCompletionModel {
    pub fn new(config: ChatModelConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SummarizeError::Internal(e.to_string()))?;

        if config.api_key.is_none() {
            warn!("No API key configured for the language model");
        }

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionModel {
    async fn invoke(&self, prompt: &str) -> Result<String> {
        let start = Instant::now();
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "Invoking model");

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
        };

        let mut req = self.client.post(&self.config.endpoint).json(&request);
        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key.expose_secret());
        }

        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                SummarizeError::Model(format!("Timeout: {}", e))
            } else {
                SummarizeError::Model(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Model(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Model(format!("Failed to parse response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SummarizeError::Model("No choices in response".to_string()))?;

        METRICS
            .model_call_duration
            .observe(start.elapsed().as_secs_f64());
        debug!(response_chars = content.len(), "Model responded");

        Ok(content)
    }
}

// OpenAI-compatible API types
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn config_for(server: &mockito::ServerGuard) -> ChatModelConfig {
        ChatModelConfig {
            endpoint: format!("{}/v1/chat/completions", server.url()),
            api_key: Some(SecretString::new("test-key".to_string())),
            model: "test-model".to_string(),
            temperature: 0.0,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_invoke_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(json!({
                "model": "test-model",
                "messages": [{"role": "user", "content": "Summarize me"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"choices": [{"message": {"role": "assistant", "content": "Short."}}]}).to_string())
            .create_async()
            .await;

        let model = ChatCompletionModel::new(config_for(&server)).unwrap();
        let result = model.invoke("Summarize me").await.unwrap();

        assert_eq!(result, "Short.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_is_model_error() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_body("quota exceeded")
            .expect(1)
            .create_async()
            .await;

        let model = ChatCompletionModel::new(config_for(&server)).unwrap();
        let err = model.invoke("hello").await.unwrap_err();

        assert!(matches!(err, SummarizeError::Model(ref msg) if msg.contains("429")));
        // failures are not retried
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_choices_is_model_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(json!({"choices": []}).to_string())
            .create_async()
            .await;

        let model = ChatCompletionModel::new(config_for(&server)).unwrap();
        let err = model.invoke("hello").await.unwrap_err();

        assert!(matches!(err, SummarizeError::Model(_)));
    }

    #[test]
    fn test_config_from_llm_config() {
        let config = ChatModelConfig::from(&LlmConfig::default());
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.timeout, Duration::from_secs(60));
    }
}
