//! Free-text quiz parser.
//!
//! Parses the block layout the free-text prompt requests:
//!
//! ```text
//! The question text
//! A. First option
//! B. Second option
//! C. Third option
//! D. Fourth option
//! Correct Answer: B
//! Explanation: one sentence
//! ```
//!
//! Blocks are separated by blank lines. Blocks that don't fit the grammar
//! are skipped and reported, not silently dropped.

use super::models::{QuizOption, QuizQuestion};
use regex::Regex;
use tracing::warn;

/// Answer labels, in the order option lines appear in a block.
const OPTION_LABELS: [&str; 4] = ["A", "B", "C", "D"];

/// A block's minimum line count: question, 4 options, answer line.
const MIN_BLOCK_LINES: usize = 6;

/// Why a block was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSkipReason {
    /// The block had fewer lines than the grammar requires.
    TooFewLines(usize),
}

impl std::fmt::Display for BlockSkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlockSkipReason::TooFewLines(n) => {
                write!(f, "{} lines, expected at least {}", n, MIN_BLOCK_LINES)
            }
        }
    }
}

/// A block that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedBlock {
    /// Zero-based block index in the raw response.
    pub index: usize,
    pub reason: BlockSkipReason,
}

/// Parse result: questions in block order plus a report of skipped blocks.
#[derive(Debug, Clone)]
pub struct ParsedQuiz {
    pub questions: Vec<QuizQuestion>,
    pub skipped: Vec<SkippedBlock>,
}

/// Parser for the free-text quiz block layout.
pub struct FreeTextParser {
    answer_regex: Regex,
    explanation_regex: Regex,
}

impl FreeTextParser {
    pub fn new() -> Self {
        Self {
            answer_regex: Regex::new(r"Correct Answer:\s*([A-D])").expect("Invalid regex"),
            explanation_regex: Regex::new(r"Explanation:\s*(.+)").expect("Invalid regex"),
        }
    }

    /// Parse a raw model response into questions.
    ///
    /// Question order matches block order. A block with fewer than six lines
    /// is skipped and reported. A missing `Correct Answer:` line falls back
    /// to label "A" with a logged warning; the fallback fabricates an answer
    /// rather than signaling the parse failure, so structured mode is the
    /// safer default.
    pub fn parse(&self, text: &str) -> ParsedQuiz {
        let mut questions = Vec::new();
        let mut skipped = Vec::new();

        for (index, block) in text.split("\n\n").enumerate() {
            let block = block.trim();
            if block.is_empty() {
                continue;
            }

            let lines: Vec<&str> = block.lines().map(str::trim).collect();
            if lines.len() < MIN_BLOCK_LINES {
                skipped.push(SkippedBlock {
                    index,
                    reason: BlockSkipReason::TooFewLines(lines.len()),
                });
                continue;
            }

            let question = lines[0].to_string();

            let options = OPTION_LABELS
                .iter()
                .zip(&lines[1..5])
                .map(|(label, &line)| {
                    let text = line
                        .strip_prefix(&format!("{}.", label))
                        .map(str::trim)
                        .unwrap_or(line);
                    QuizOption::new(*label, text)
                })
                .collect();

            let correct_answer = match self.answer_regex.captures(block) {
                Some(caps) => caps[1].to_string(),
                None => {
                    warn!("Block {} has no 'Correct Answer:' line, defaulting to A", index);
                    "A".to_string()
                }
            };

            let explanation = self
                .explanation_regex
                .captures(block)
                .map(|caps| caps[1].trim().to_string())
                .unwrap_or_default();

            questions.push(QuizQuestion {
                question,
                options,
                correct_answer,
                explanation,
            });
        }

        ParsedQuiz { questions, skipped }
    }
}

impl Default for FreeTextParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(n: usize, letter: &str) -> String {
        format!(
            "Question number {n}?\n\
             A. Option one\n\
             B. Option two\n\
             C. Option three\n\
             D. Option four\n\
             Correct Answer: {letter}\n\
             Explanation: Because option {letter} is right."
        )
    }

    #[test]
    fn test_parses_well_formed_response() {
        let text = [
            block(1, "A"),
            block(2, "B"),
            block(3, "C"),
            block(4, "D"),
            block(5, "B"),
        ]
        .join("\n\n");

        let parsed = FreeTextParser::new().parse(&text);

        assert_eq!(parsed.questions.len(), 5);
        assert!(parsed.skipped.is_empty());

        let letters: Vec<&str> = parsed
            .questions
            .iter()
            .map(|q| q.correct_answer.as_str())
            .collect();
        assert_eq!(letters, vec!["A", "B", "C", "D", "B"]);

        for q in &parsed.questions {
            assert_eq!(q.options.len(), 4);
            assert!(q.options.iter().all(|o| !o.text.is_empty()));
            assert!(q.correct_option().is_some());
            assert!(!q.explanation.is_empty());
        }
    }

    #[test]
    fn test_strips_option_prefixes() {
        let parsed = FreeTextParser::new().parse(&block(1, "C"));
        let q = &parsed.questions[0];
        assert_eq!(q.option_text("A"), Some("Option one"));
        assert_eq!(q.option_text("D"), Some("Option four"));
    }

    #[test]
    fn test_keeps_raw_line_without_prefix() {
        let text = "A question?\n\
                    first option unlabeled\n\
                    B. second\n\
                    C. third\n\
                    D. fourth\n\
                    Correct Answer: A\n\
                    Explanation: text";
        let parsed = FreeTextParser::new().parse(text);
        assert_eq!(
            parsed.questions[0].option_text("A"),
            Some("first option unlabeled")
        );
    }

    #[test]
    fn test_missing_answer_defaults_to_a() {
        let text = "A question?\n\
                    A. one\n\
                    B. two\n\
                    C. three\n\
                    D. four\n\
                    Explanation: no answer line here";
        let parsed = FreeTextParser::new().parse(text);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].correct_answer, "A");
    }

    #[test]
    fn test_missing_explanation_defaults_to_empty() {
        let text = "A question?\n\
                    A. one\n\
                    B. two\n\
                    C. three\n\
                    D. four\n\
                    Correct Answer: D";
        let parsed = FreeTextParser::new().parse(text);
        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].correct_answer, "D");
        assert!(parsed.questions[0].explanation.is_empty());
    }

    #[test]
    fn test_short_block_skipped_and_reported() {
        let text = format!("Too short\nA. only\nB. two lines\n\n{}", block(2, "B"));
        let parsed = FreeTextParser::new().parse(&text);

        assert_eq!(parsed.questions.len(), 1);
        assert_eq!(parsed.questions[0].correct_answer, "B");
        assert_eq!(
            parsed.skipped,
            vec![SkippedBlock {
                index: 0,
                reason: BlockSkipReason::TooFewLines(3),
            }]
        );
    }

    #[test]
    fn test_question_order_matches_block_order() {
        let text = [block(1, "D"), block(2, "A"), block(3, "C")].join("\n\n");
        let parsed = FreeTextParser::new().parse(&text);
        let questions: Vec<&str> = parsed
            .questions
            .iter()
            .map(|q| q.question.as_str())
            .collect();
        assert_eq!(
            questions,
            vec![
                "Question number 1?",
                "Question number 2?",
                "Question number 3?"
            ]
        );
    }
}
