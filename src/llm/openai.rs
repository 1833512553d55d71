//! OpenAI / Azure OpenAI chat completions.

use super::{ChatMessage, ChatModel, Role};
use crate::error::{PrepError, Result};
use async_openai::config::Config;
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Chat model backed by the chat completions endpoint.
pub struct OpenAIChatModel<C: Config> {
    client: Client<C>,
    model: String,
}

impl<C: Config> OpenAIChatModel<C> {
    /// Create a chat model. For Azure, `model` is the deployment name.
    pub fn new(client: Client<C>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message.role {
        Role::System => ChatCompletionRequestSystemMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| PrepError::Gateway(e.to_string()))?
            .into(),
        Role::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| PrepError::Gateway(e.to_string()))?
            .into(),
        Role::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.content.clone())
            .build()
            .map_err(|e| PrepError::Gateway(e.to_string()))?
            .into(),
    };
    Ok(built)
}

#[async_trait]
impl<C> ChatModel for OpenAIChatModel<C>
where
    C: Config + Send + Sync + 'static,
{
    #[instrument(skip(self, messages), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], temperature: f32) -> Result<String> {
        let messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(|e| PrepError::Gateway(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| PrepError::Gateway(format!("Failed to generate response: {}", e)))?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| PrepError::Gateway("Empty response from model".to_string()))?
            .clone();

        debug!("Received {} chars from model", answer.len());
        Ok(answer)
    }
}
