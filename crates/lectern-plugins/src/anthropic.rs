//! Anthropic Messages API text generator

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::generation::TextGenerator;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicGenerator {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Debug for AnthropicGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("AnthropicGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<MessageParam<'a>>,
}

#[derive(Debug, Serialize)]
struct MessageParam<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlockResponse>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlockResponse {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl AnthropicGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for Anthropic")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            temperature,
            messages: vec![MessageParam {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Anthropic API")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Anthropic API request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .context("Failed to parse Anthropic API response")?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                model = %self.model,
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Anthropic completion finished"
            );
        }

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlockResponse::Text { text } => Some(text),
                ContentBlockResponse::Other => None,
            })
            .collect();

        if text.is_empty() {
            anyhow::bail!("Anthropic API returned no text content");
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn generator(server: &mockito::Server) -> AnthropicGenerator {
        AnthropicGenerator::with_base_url(
            "test-key",
            "claude-sonnet-4-20250514",
            server.url(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_text_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/messages")
            .match_header("x-api-key", "test-key")
            .match_header("anthropic-version", API_VERSION)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 512,
                "messages": [{"role": "user", "content": "Summarize"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"content":[{"type":"text","text":"{\"title\":"},{"type":"text","text":"\"T\"}"}],
                    "usage":{"input_tokens":10,"output_tokens":5}}"#,
            )
            .create_async()
            .await;

        let text = generator(&server).complete("Summarize", 512, 0.3).await.unwrap();
        assert_eq!(text, r#"{"title":"T"}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages")
            .with_status(529)
            .with_body(r#"{"type":"error","error":{"type":"overloaded_error"}}"#)
            .create_async()
            .await;

        let err = generator(&server).complete("Summarize", 512, 0.3).await.unwrap_err();
        assert!(err.to_string().contains("529"));
        assert!(err.to_string().contains("overloaded_error"));
    }

    #[tokio::test]
    async fn test_empty_content_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/messages")
            .with_status(200)
            .with_body(r#"{"content":[]}"#)
            .create_async()
            .await;

        assert!(generator(&server).complete("Summarize", 512, 0.3).await.is_err());
    }
}
