//! Kviss - Video Summarizer and Quiz Generator
//!
//! A CLI tool and HTTP service that turns videos into summaries and
//! multiple-choice quizzes.
//!
//! The name "Kviss" comes from the Norwegian spelling of "quiz."
//!
//! # Overview
//!
//! Kviss allows you to:
//! - Process YouTube videos and local video files
//! - Extract and transcribe the audio track with Whisper
//! - Summarize the transcript with a language model
//! - Generate a multiple-choice quiz from the summary
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `source` - Video source abstraction (YouTube, local files)
//! - `media` - Video download and audio extraction
//! - `transcription` - Speech-to-text transcription
//! - `summary` - Transcript summarization
//! - `quiz` - Quiz generation and parsing
//! - `pipeline` - Stage coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use kviss::config::Settings;
//! use kviss::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let result = pipeline.process_input("dQw4w9WgXcQ", 5).await?;
//!     println!("{}", result.summary);
//!     println!("{} questions generated", result.quiz.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod openai;
pub mod pipeline;
pub mod quiz;
pub mod source;
pub mod summary;
pub mod transcription;

pub use error::{KvissError, Result};
