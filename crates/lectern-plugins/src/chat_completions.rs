//! OpenAI-compatible chat completions generator (OpenAI, Groq and similar hosts)

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::time::Duration;

use crate::generation::TextGenerator;

pub struct ChatCompletionsGenerator {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl Debug for ChatCompletionsGenerator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ChatCompletionsGenerator")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletionsGenerator {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client for chat completions")?;

        Ok(Self {
            http_client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TextGenerator for ChatCompletionsGenerator {
    fn name(&self) -> &str {
        "chat_completions"
    }

    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send chat completions request")?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(anyhow::anyhow!(
                "Chat completions request failed: {} - {}",
                status,
                error_text
            ));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat completions response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .context("Chat completions response contained no message content")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn generator(server: &mockito::Server) -> ChatCompletionsGenerator {
        ChatCompletionsGenerator::new(
            "gsk-test",
            "llama-3.3-70b-versatile",
            format!("{}/", server.url()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer gsk-test")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama-3.3-70b-versatile",
                "messages": [{"role": "user", "content": "Clean this"}]
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"cleaned"}}]}"#)
            .create_async()
            .await;

        let text = generator(&server).complete("Clean this", 256, 0.3).await.unwrap();
        assert_eq!(text, "cleaned");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = generator(&server).complete("x", 16, 0.0).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }

    #[tokio::test]
    async fn test_missing_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        assert!(generator(&server).complete("x", 16, 0.0).await.is_err());
    }
}
