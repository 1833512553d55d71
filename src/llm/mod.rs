//! Chat-completion gateway.
//!
//! The rest of the crate talks to the model through [`ChatModel`]; the
//! OpenAI/Azure binding lives in [`OpenAIChatModel`].

mod openai;

pub use openai::OpenAIChatModel;

use crate::config::{LlmProvider, LlmSettings};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A chat-completion service.
///
/// Implementations make exactly one request per call and never retry.
/// Every failure, including an empty reply, is a `PrepError::Gateway`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String>;
}

/// Build the chat model for the configured provider.
pub fn create_chat_model(settings: &LlmSettings) -> Result<Arc<dyn ChatModel>> {
    let model: Arc<dyn ChatModel> = match settings.provider {
        LlmProvider::Azure => Arc::new(OpenAIChatModel::new(
            crate::openai::azure_client(settings, &settings.deployment)?,
            &settings.deployment,
        )),
        LlmProvider::OpenAI => Arc::new(OpenAIChatModel::new(
            crate::openai::openai_client(settings)?,
            &settings.deployment,
        )),
    };
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").content, "a");
    }

    #[test]
    fn test_create_chat_model_for_each_provider() {
        let mut settings = LlmSettings::default();
        assert!(create_chat_model(&settings).is_ok());

        settings.provider = LlmProvider::OpenAI;
        assert!(create_chat_model(&settings).is_ok());
    }
}
