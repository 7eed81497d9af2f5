//! Transcript summarization.

use crate::config::SummaryPrompts;
use crate::error::{KvissError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use tracing::{debug, instrument};

/// Summarizes transcripts with a single chat-completion call.
pub struct Summarizer {
    client: Client<OpenAIConfig>,
    model: String,
    prompts: SummaryPrompts,
}

impl Summarizer {
    /// Create a new summarizer with the given client and model.
    pub fn new(client: Client<OpenAIConfig>, model: &str, prompts: SummaryPrompts) -> Self {
        Self {
            client,
            model: model.to_string(),
            prompts,
        }
    }

    /// Summarize a transcript.
    ///
    /// An empty or whitespace-only transcript returns an empty summary
    /// without issuing an API call. No retries, no input chunking; a
    /// transcript over the model's input limit surfaces the API error.
    #[instrument(skip_all)]
    pub async fn summarize(&self, transcript: &str) -> Result<String> {
        if transcript.trim().is_empty() {
            debug!("Transcript is empty, returning empty summary");
            return Ok(String::new());
        }

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system.clone())
                .build()
                .map_err(|e| KvissError::Summarization(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(transcript.to_string())
                .build()
                .map_err(|e| KvissError::Summarization(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| KvissError::Summarization(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| KvissError::Summarization(format!("Chat completion failed: {}", e)))?;

        let summary = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| KvissError::Summarization("Empty response from model".to_string()))?
            .trim()
            .to_string();

        debug!("Generated summary ({} chars)", summary.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::create_client;

    #[tokio::test]
    async fn test_empty_transcript_returns_empty_summary() {
        // The early return fires before any request is made, so no API key
        // or network access is needed.
        let summarizer = Summarizer::new(create_client(), "gpt-4o", SummaryPrompts::default());
        let summary = summarizer.summarize("   \n\t ").await.unwrap();
        assert!(summary.is_empty());
    }
}
