//! Text-generation contract
//!
//! A generator turns one prompt into one completion. Prompt construction and
//! response parsing live with the caller; adapters only speak the vendor wire format.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Single-turn completion of `prompt`
    async fn complete(&self, prompt: &str, max_tokens: u32, temperature: f32) -> Result<String>;
}

/// Round-trip a trivial prompt to confirm credentials and model name are usable
pub async fn probe(generator: &dyn TextGenerator) -> Result<String> {
    let reply = generator
        .complete("Reply with the single word: ready", 16, 0.0)
        .await?;
    tracing::info!(generator = %generator.name(), "Text generator probe succeeded");
    Ok(reply.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl TextGenerator for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, _prompt: &str, max_tokens: u32, _temperature: f32) -> Result<String> {
            assert_eq!(max_tokens, 16);
            Ok("  ready\n".to_string())
        }
    }

    struct Broken;

    #[async_trait]
    impl TextGenerator for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        async fn complete(&self, _prompt: &str, _max_tokens: u32, _temperature: f32) -> Result<String> {
            Err(anyhow::anyhow!("401 Unauthorized"))
        }
    }

    #[tokio::test]
    async fn test_probe_trims_reply() {
        assert_eq!(probe(&Echo).await.unwrap(), "ready");
    }

    #[tokio::test]
    async fn test_probe_propagates_errors() {
        let err = probe(&Broken).await.unwrap_err();
        assert!(err.to_string().contains("401"));
    }
}
