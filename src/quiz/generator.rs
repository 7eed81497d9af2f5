//! Quiz generation via chat completion.

use super::models::QuizQuestion;
use super::parser::FreeTextParser;
use crate::config::{QuizOutputMode, QuizPrompts, QuizSettings};
use crate::error::{KvissError, Result};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

/// Envelope the structured prompt asks the model to emit.
#[derive(Debug, Deserialize)]
struct StructuredQuiz {
    questions: Vec<QuizQuestion>,
}

/// Generates multiple-choice quizzes from summaries.
pub struct QuizGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    mode: QuizOutputMode,
    prompts: QuizPrompts,
    parser: FreeTextParser,
}

impl QuizGenerator {
    /// Create a new quiz generator with the given client and settings.
    pub fn new(client: Client<OpenAIConfig>, settings: &QuizSettings, prompts: QuizPrompts) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            mode: settings.mode,
            prompts,
            parser: FreeTextParser::new(),
        }
    }

    /// Generate `count` multiple-choice questions from a summary.
    ///
    /// The summary is read-only; question order matches the order in the
    /// model's response. An empty summary yields an empty quiz without a
    /// call.
    #[instrument(skip_all, fields(mode = %self.mode, count))]
    pub async fn generate(&self, summary: &str, count: usize) -> Result<Vec<QuizQuestion>> {
        if summary.trim().is_empty() {
            debug!("Summary is empty, skipping quiz generation");
            return Ok(Vec::new());
        }

        let template = match self.mode {
            QuizOutputMode::Structured => &self.prompts.structured_user,
            QuizOutputMode::Freetext => &self.prompts.freetext_user,
        };

        let mut vars = HashMap::new();
        vars.insert("count".to_string(), count.to_string());
        vars.insert("summary".to_string(), summary.to_string());
        let user_prompt = crate::config::Prompts::render(template, &vars);

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.system.clone())
                .build()
                .map_err(|e| KvissError::QuizGeneration(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| KvissError::QuizGeneration(e.to_string()))?
                .into(),
        ];

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder.model(&self.model).messages(messages);

        if self.mode == QuizOutputMode::Structured {
            request_builder.response_format(ResponseFormat::JsonObject);
        }

        let request = request_builder
            .build()
            .map_err(|e| KvissError::QuizGeneration(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| KvissError::QuizGeneration(format!("Chat completion failed: {}", e)))?;

        let raw = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| KvissError::QuizGeneration("Empty response from model".to_string()))?
            .trim()
            .to_string();

        let questions = match self.mode {
            QuizOutputMode::Structured => parse_structured(&raw)?,
            QuizOutputMode::Freetext => {
                let parsed = self.parser.parse(&raw);
                for skip in &parsed.skipped {
                    warn!("Skipped quiz block {}: {}", skip.index, skip.reason);
                }
                parsed.questions
            }
        };

        debug!("Generated {} questions", questions.len());
        Ok(questions)
    }
}

/// Parse and validate a structured-mode JSON response.
///
/// Labels and the correct-answer value are normalized to uppercase. A
/// correct answer that matches no option falls back to the first option's
/// label with a logged warning rather than failing the batch.
fn parse_structured(raw: &str) -> Result<Vec<QuizQuestion>> {
    let envelope: StructuredQuiz = serde_json::from_str(raw).map_err(|e| {
        KvissError::QuizGeneration(format!("Response is not valid quiz JSON: {}", e))
    })?;

    let mut questions = envelope.questions;
    for (idx, q) in questions.iter_mut().enumerate() {
        for option in &mut q.options {
            option.label = option.label.trim().to_uppercase();
        }
        q.correct_answer = q.correct_answer.trim().to_uppercase();

        if q.correct_option().is_none() {
            let fallback = q
                .options
                .first()
                .map(|o| o.label.clone())
                .unwrap_or_else(|| "A".to_string());
            warn!(
                "Question {} has correct answer '{}' matching no option, using '{}'",
                idx, q.correct_answer, fallback
            );
            q.correct_answer = fallback;
        }
    }

    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_structured_valid() {
        let raw = r#"{
            "questions": [
                {
                    "question": "What powers evaporation?",
                    "options": [
                        {"label": "A", "text": "The sun"},
                        {"label": "B", "text": "The wind"},
                        {"label": "C", "text": "Gravity"},
                        {"label": "D", "text": "Pressure"}
                    ],
                    "correct_answer": "a",
                    "explanation": "Solar energy heats surface water."
                }
            ]
        }"#;

        let questions = parse_structured(raw).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].correct_answer, "A");
        assert_eq!(questions[0].correct_option().unwrap().text, "The sun");
    }

    #[test]
    fn test_parse_structured_bad_answer_falls_back() {
        let raw = r#"{
            "questions": [
                {
                    "question": "Pick one",
                    "options": [
                        {"label": "A", "text": "one"},
                        {"label": "B", "text": "two"},
                        {"label": "C", "text": "three"},
                        {"label": "D", "text": "four"}
                    ],
                    "correct_answer": "E",
                    "explanation": ""
                }
            ]
        }"#;

        let questions = parse_structured(raw).unwrap();
        assert_eq!(questions[0].correct_answer, "A");
    }

    #[test]
    fn test_parse_structured_missing_explanation() {
        let raw = r#"{
            "questions": [
                {
                    "question": "Pick one",
                    "options": [
                        {"label": "A", "text": "one"},
                        {"label": "B", "text": "two"},
                        {"label": "C", "text": "three"},
                        {"label": "D", "text": "four"}
                    ],
                    "correct_answer": "B"
                }
            ]
        }"#;

        let questions = parse_structured(raw).unwrap();
        assert!(questions[0].explanation.is_empty());
    }

    #[test]
    fn test_parse_structured_rejects_invalid_json() {
        let err = parse_structured("Here are your questions!").unwrap_err();
        assert!(matches!(err, KvissError::QuizGeneration(_)));
    }

    #[test]
    fn test_parse_structured_preserves_order() {
        let raw = r#"{
            "questions": [
                {"question": "first", "options": [{"label": "A", "text": "x"}], "correct_answer": "A"},
                {"question": "second", "options": [{"label": "A", "text": "y"}], "correct_answer": "A"},
                {"question": "third", "options": [{"label": "A", "text": "z"}], "correct_answer": "A"}
            ]
        }"#;

        let questions = parse_structured(raw).unwrap();
        let order: Vec<&str> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(order, vec!["first", "second", "third"]);
    }
}
