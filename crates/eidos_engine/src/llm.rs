//! The chat-completion seam.
//!
//! The engine never talks to a language-model provider directly; it goes
//! through `ChatCompletion`. Real providers live with the embedding
//! application; the deterministic mock here keeps the engine testable and
//! usable offline.

use anyhow::Result;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: &str) -> Self {
        Self {
            role: Role::User,
            content: content.to_string(),
        }
    }

    pub fn assistant(content: &str) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionParams {
    pub max_tokens: u32,
    /// Sampling temperature (0.0 - 2.0)
    pub temperature: f32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Send a system prompt and message list, receive a single text
    /// completion. Transport errors surface as-is for the caller to wrap.
    async fn complete(
        &self,
        system: &str,
        messages: &[ChatMessage],
        params: CompletionParams,
    ) -> Result<String>;
}

/// Deterministic completion for tests and offline runs.
#[derive(Debug, Clone)]
pub struct MockCompletion {
    reply: String,
}

impl MockCompletion {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
        }
    }
}

impl Default for MockCompletion {
    fn default() -> Self {
        Self::new("I hear you. Tell me more about that.")
    }
}

#[async_trait]
impl ChatCompletion for MockCompletion {
    async fn complete(
        &self,
        _system: &str,
        _messages: &[ChatMessage],
        _params: CompletionParams,
    ) -> Result<String> {
        Ok(self.reply.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_fixed_reply() {
        let mock = MockCompletion::new("canned answer");
        let reply = mock
            .complete("system", &[ChatMessage::user("hi")], CompletionParams::default())
            .await
            .unwrap();
        assert_eq!(reply, "canned answer");
    }
}
