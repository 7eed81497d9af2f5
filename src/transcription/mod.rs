//! Transcription module for Kviss.
//!
//! Handles audio transcription using OpenAI Whisper. Long files are split
//! into fixed-duration segments and reassembled in temporal order.

mod whisper;

pub use whisper::WhisperTranscriber;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file and return its plain-text transcript.
    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}
