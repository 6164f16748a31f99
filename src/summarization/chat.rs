//! Chat-completion backed summarization service.

use super::CompletionService;
use crate::config::SummarizationSettings;
use crate::error::{FrontlineError, Result};
use crate::openai::create_client;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Completion service talking to an OpenAI-compatible chat endpoint (Groq by default).
pub struct ChatCompletionService {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl ChatCompletionService {
    /// Create a service from settings and a resolved API key.
    pub fn with_config(settings: &SummarizationSettings, api_key: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(settings, api_key)?,
            model: settings.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl CompletionService for ChatCompletionService {
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt.to_string())
            .build()
            .map_err(|e| FrontlineError::CompletionApi(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![message.into()])
            .build()
            .map_err(|e| FrontlineError::CompletionApi(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            FrontlineError::CompletionApi(format!("Failed to generate report: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| FrontlineError::CompletionApi("Empty response from LLM".to_string()))?
            .clone();

        debug!("Received {} characters", content.len());
        Ok(content)
    }
}
