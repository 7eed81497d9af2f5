//! Prompt templates for Kviss.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub quiz: QuizPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for transcript summarization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryPrompts {
    pub system: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: "Summarize the following transcript clearly and concisely.".to_string(),
        }
    }
}

/// Prompts for quiz generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizPrompts {
    pub system: String,
    /// User prompt for structured (JSON) output mode.
    pub structured_user: String,
    /// User prompt for free-text output mode.
    pub freetext_user: String,
}

impl Default for QuizPrompts {
    fn default() -> Self {
        Self {
            system: "You are a helpful quiz generator.".to_string(),

            structured_user: r#"Create {{count}} multiple-choice questions from the following summary.

Respond with a JSON object of this exact shape:
{
  "questions": [
    {
      "question": "The question text",
      "options": [
        {"label": "A", "text": "First option"},
        {"label": "B", "text": "Second option"},
        {"label": "C", "text": "Third option"},
        {"label": "D", "text": "Fourth option"}
      ],
      "correct_answer": "A",
      "explanation": "A short explanation of why the answer is correct"
    }
  ]
}

Each question must have exactly 4 options labeled A through D, and
"correct_answer" must be one of those labels.

Summary:
{{summary}}"#
                .to_string(),

            freetext_user: r#"Create {{count}} multiple-choice questions from the following summary.
For each question, provide 4 options (labeled A, B, C, D), indicate the correct one, and give a short explanation.

Separate questions with a blank line. Format each question exactly as:
The question text
A. First option
B. Second option
C. Third option
D. Fourth option
Correct Answer: <letter>
Explanation: <one sentence>

Summary:
{{summary}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load summary prompts if file exists
            let summary_path = custom_path.join("summary.toml");
            if summary_path.exists() {
                let content = std::fs::read_to_string(&summary_path)?;
                prompts.summary = toml::from_str(&content)?;
            }

            // Load quiz prompts if file exists
            let quiz_path = custom_path.join("quiz.toml");
            if quiz_path.exists() {
                let content = std::fs::read_to_string(&quiz_path)?;
                prompts.quiz = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.summary.system.is_empty());
        assert!(prompts.quiz.structured_user.contains("{{summary}}"));
        assert!(prompts.quiz.freetext_user.contains("Correct Answer:"));
    }

    #[test]
    fn test_render_template() {
        let template = "Create {{count}} questions from: {{summary}}";
        let mut vars = std::collections::HashMap::new();
        vars.insert("count".to_string(), "5".to_string());
        vars.insert("summary".to_string(), "The water cycle.".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Create 5 questions from: The water cycle.");
    }

    #[test]
    fn test_render_leaves_summary_untouched() {
        let summary = "Photosynthesis converts light into energy.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("summary".to_string(), summary.to_string());
        vars.insert("count".to_string(), "5".to_string());

        let prompts = Prompts::default();
        let _ = prompts.render_with_custom(&prompts.quiz.structured_user, &vars);
        assert_eq!(vars["summary"], summary);
    }
}
