//! CLI output formatting utilities.

use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a quiz question with its options, answer, and explanation.
    pub fn quiz_question(number: usize, question: &crate::quiz::QuizQuestion) {
        println!(
            "\n{} {}",
            style(format!("Q{}:", number)).bold(),
            style(&question.question).bold()
        );
        for option in &question.options {
            println!("  {}. {}", style(&option.label).cyan(), option.text);
        }
        println!(
            "  {} {}",
            style("Answer:").green().bold(),
            question
                .correct_option()
                .map(|o| format!("{}. {}", o.label, o.text))
                .unwrap_or_else(|| question.correct_answer.clone())
        );
        if !question.explanation.is_empty() {
            println!("  {} {}", style("Why:").dim(), style(&question.explanation).dim());
        }
    }
}
