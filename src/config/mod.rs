//! Configuration module for Kviss.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QuizPrompts, SummaryPrompts};
pub use settings::{
    DownloadSettings, GeneralSettings, PromptSettings, QuizOutputMode, QuizSettings, Settings,
    SummarySettings, TranscriptionSettings,
};
