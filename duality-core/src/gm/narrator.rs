//! The seam to the external text generator.

use super::context::{HistoryEntry, Speaker};
use crate::config::NarratorConfig;
use async_trait::async_trait;
use chat::{ChatClient, Message, Request};
use thiserror::Error;

/// Errors from a narrator. These never leave the game master; they turn into
/// fallback lines.
#[derive(Debug, Error)]
pub enum NarratorError {
    #[error("Chat API error: {0}")]
    Chat(#[from] chat::Error),

    #[error("Narrator returned an empty reply")]
    Empty,

    #[error("Narrator timed out")]
    Timeout,

    #[error("Narrator unavailable: {0}")]
    Unavailable(String),
}

/// Everything the narrator sees for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationRequest {
    pub system: String,
    /// Situation message sent before the history.
    pub context: Option<String>,
    pub history: Vec<HistoryEntry>,
    /// The final user line, usually `"Name: action"`.
    pub prompt: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl NarrationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            context: None,
            history: Vec::new(),
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_history(mut self, history: &[HistoryEntry]) -> Self {
        self.history = history.to_vec();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Conversation in send order: context, history, prompt.
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        if let Some(context) = &self.context {
            messages.push(Message::user(context.as_str()));
        }
        messages.extend(self.history.iter().map(|entry| match entry.speaker {
            Speaker::Player => Message::user(entry.content.as_str()),
            Speaker::Narrator => Message::assistant(entry.content.as_str()),
        }));
        messages.push(Message::user(self.prompt.as_str()));
        messages
    }
}

/// Produces narration for the table.
#[async_trait]
pub trait Narrator: Send + Sync {
    async fn narrate(&self, request: NarrationRequest) -> Result<String, NarratorError>;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// Narrator backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatNarrator {
    client: ChatClient,
    config: NarratorConfig,
}

impl ChatNarrator {
    pub fn new(client: ChatClient, config: NarratorConfig) -> Self {
        let client = client
            .with_model(config.model.clone())
            .with_base_url(config.base_url.clone());
        Self { client, config }
    }

    /// Build from `DEEPSEEK_API_KEY`.
    pub fn from_env(config: NarratorConfig) -> Result<Self, NarratorError> {
        Ok(Self::new(ChatClient::from_env()?, config))
    }

    pub fn config(&self) -> &NarratorConfig {
        &self.config
    }
}

impl std::fmt::Debug for ChatNarrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatNarrator")
            .field("model", &self.client.model())
            .field("base_url", &self.client.base_url())
            .finish()
    }
}

#[async_trait]
impl Narrator for ChatNarrator {
    async fn narrate(&self, request: NarrationRequest) -> Result<String, NarratorError> {
        let chat_request = Request::new(request.messages())
            .with_system(request.system.as_str())
            .with_model(self.config.model.as_str())
            .with_max_tokens(request.max_tokens.unwrap_or(self.config.max_tokens))
            .with_temperature(request.temperature.unwrap_or(self.config.temperature));

        let response = self.client.complete(chat_request).await?;
        tracing::debug!(
            model = %response.model,
            finish = ?response.finish_reason,
            "Narrator replied"
        );

        let text = response.text.trim();
        if text.is_empty() {
            return Err(NarratorError::Empty);
        }
        Ok(text.to_string())
    }

    fn name(&self) -> &str {
        "chat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat::Role;

    #[test]
    fn test_message_order() {
        let history = vec![
            HistoryEntry {
                speaker: Speaker::Player,
                content: "Aria: I knock".to_string(),
            },
            HistoryEntry {
                speaker: Speaker::Narrator,
                content: "The door creaks open.".to_string(),
            },
        ];
        let request = NarrationRequest::new("system", "Aria: I step inside")
            .with_context("CURRENT SITUATION")
            .with_history(&history);

        let messages = request.messages();
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::User, Role::User, Role::Assistant, Role::User]
        );
        assert_eq!(messages[0].content, "CURRENT SITUATION");
        assert_eq!(messages[3].content, "Aria: I step inside");
    }

    #[test]
    fn test_prompt_only() {
        let messages = NarrationRequest::new("system", "Describe a forest").messages();
        assert_eq!(messages, vec![Message::user("Describe a forest")]);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_an_error() {
        let narrator = ChatNarrator::new(
            ChatClient::new("test-key"),
            NarratorConfig::default().with_base_url("http://127.0.0.1:1"),
        );
        let result = narrator
            .narrate(NarrationRequest::new("system", "hello"))
            .await;
        assert!(matches!(result, Err(NarratorError::Chat(_))));
    }
}
