//! Data models for quizzes.

use serde::{Deserialize, Serialize};

/// A single answer option within a question.
///
/// Options are kept as an ordered sequence rather than a map so that their
/// order always matches the order in the generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOption {
    /// Answer label (A-D).
    pub label: String,
    /// Option text.
    pub text: String,
}

impl QuizOption {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// A single multiple-choice question.
///
/// Invariant: `correct_answer` is the label of one of `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    /// The question text.
    pub question: String,
    /// Answer options in presentation order.
    pub options: Vec<QuizOption>,
    /// Label of the correct option.
    pub correct_answer: String,
    /// Explanation of the correct answer (may be empty).
    #[serde(default)]
    pub explanation: String,
}

impl QuizQuestion {
    /// Look up an option's text by label.
    pub fn option_text(&self, label: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.text.as_str())
    }

    /// The option marked as correct, if the invariant holds.
    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.label == self.correct_answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_question() -> QuizQuestion {
        QuizQuestion {
            question: "What drives the water cycle?".to_string(),
            options: vec![
                QuizOption::new("A", "The sun"),
                QuizOption::new("B", "The wind"),
                QuizOption::new("C", "The tides"),
                QuizOption::new("D", "The moon"),
            ],
            correct_answer: "A".to_string(),
            explanation: "Solar energy drives evaporation.".to_string(),
        }
    }

    #[test]
    fn test_option_lookup() {
        let q = sample_question();
        assert_eq!(q.option_text("B"), Some("The wind"));
        assert_eq!(q.option_text("E"), None);
    }

    #[test]
    fn test_correct_option() {
        let q = sample_question();
        assert_eq!(q.correct_option().unwrap().text, "The sun");
    }

    #[test]
    fn test_option_order_survives_serialization() {
        let q = sample_question();
        let json = serde_json::to_string(&q).unwrap();
        let back: QuizQuestion = serde_json::from_str(&json).unwrap();
        let labels: Vec<&str> = back.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", "C", "D"]);
    }
}
