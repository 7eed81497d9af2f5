//! Quiz generation and parsing.
//!
//! A quiz is generated from a summary with a single chat-completion call.
//! The default mode requests a JSON object and deserializes it directly;
//! the free-text mode requests labeled text blocks and parses them with an
//! explicit block parser.

mod generator;
mod models;
mod parser;

pub use generator::QuizGenerator;
pub use models::{QuizOption, QuizQuestion};
pub use parser::{BlockSkipReason, FreeTextParser, ParsedQuiz, SkippedBlock};
