//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::config::TranscriptionSettings;
use crate::error::{KvissError, Result};
use crate::media::split_audio;
use async_openai::config::OpenAIConfig;
use async_openai::types::{AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tracing::{debug, info, instrument};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    client: Client<OpenAIConfig>,
    model: String,
    chunk_duration_seconds: u32,
    single_request_max_bytes: u64,
    max_concurrent_chunks: usize,
}

impl WhisperTranscriber {
    /// Create a new Whisper transcriber with the given client and settings.
    pub fn new(client: Client<OpenAIConfig>, settings: &TranscriptionSettings) -> Self {
        Self {
            client,
            model: settings.model.clone(),
            chunk_duration_seconds: settings.chunk_duration_seconds,
            single_request_max_bytes: settings.single_request_max_bytes,
            max_concurrent_chunks: settings.max_concurrent_chunks.max(1),
        }
    }

    /// Transcribe a single audio file (no splitting).
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_single(&self, audio_path: &Path) -> Result<String> {
        debug!("Transcribing audio file");

        let file_bytes = tokio::fs::read(audio_path).await?;

        let request = CreateTranscriptionRequestArgs::default()
            .file(async_openai::types::AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json)
            .build()
            .map_err(|e| KvissError::Transcription(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| KvissError::Transcription(format!("Whisper API error: {}", e)))?;

        Ok(response.text.trim().to_string())
    }

    /// Transcribe an audio file, splitting if necessary.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_with_splitting(&self, audio_path: &Path) -> Result<String> {
        let file_size = tokio::fs::metadata(audio_path).await?.len();

        if !needs_chunking(file_size, self.single_request_max_bytes) {
            return self.transcribe_single(audio_path).await;
        }

        info!(
            "Audio file is {} bytes, splitting into {}s segments",
            file_size, self.chunk_duration_seconds
        );

        // Segment files land in the tempdir; the guard removes anything still
        // present when we return early on failure.
        let temp_dir = tempfile::tempdir()?;
        let chunks = split_audio(audio_path, temp_dir.path(), self.chunk_duration_seconds).await?;

        if chunks.len() == 1 {
            return self.transcribe_single(audio_path).await;
        }

        let chunk_count = chunks.len();
        info!("Transcribing {} audio segments with {}", chunk_count, self.model);

        let pb = ProgressBar::new(chunk_count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} Whisper   [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap()
                .progress_chars("█▓░"),
        );

        // Transcribe segments with bounded concurrency; fail fast on error.
        // Each segment file is removed as soon as its request finishes.
        let mut fragments: Vec<(usize, String)> = Vec::with_capacity(chunk_count);

        let mut stream = stream::iter(chunks.into_iter().enumerate())
            .map(|(idx, (chunk_path, time_offset))| async move {
                let result = self.transcribe_single(&chunk_path).await;
                if chunk_path != audio_path {
                    let _ = tokio::fs::remove_file(&chunk_path).await;
                }
                (idx, time_offset, result)
            })
            .buffer_unordered(self.max_concurrent_chunks);

        while let Some((idx, time_offset, result)) = stream.next().await {
            pb.inc(1);
            match result {
                Ok(text) => fragments.push((idx, text)),
                Err(e) => {
                    // Discard accumulated partial text
                    pb.finish_and_clear();
                    drop(temp_dir);
                    return Err(KvissError::Transcription(format!(
                        "Segment {} at {:.0}s failed: {}",
                        idx, time_offset, e
                    )));
                }
            }
        }

        pb.finish_and_clear();
        drop(temp_dir);

        Ok(assemble_transcript(fragments))
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        self.transcribe_with_splitting(audio_path).await
    }
}

/// Whether an audio file must be split before transcription.
pub fn needs_chunking(file_size: u64, max_bytes: u64) -> bool {
    file_size > max_bytes
}

/// Join per-segment texts into one transcript, in segment order.
///
/// Segments may arrive in any completion order; the output is always the
/// space-joined concatenation by segment index.
pub fn assemble_transcript(mut fragments: Vec<(usize, String)>) -> String {
    fragments.sort_by_key(|(idx, _)| *idx);
    fragments
        .into_iter()
        .map(|(_, text)| text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: u64 = 24 * 1024 * 1024;

    #[test]
    fn test_needs_chunking_at_threshold() {
        assert!(!needs_chunking(MAX, MAX));
        assert!(!needs_chunking(1024, MAX));
        assert!(needs_chunking(MAX + 1, MAX));
    }

    #[test]
    fn test_assemble_transcript_in_order() {
        let fragments = vec![
            (0, "first part".to_string()),
            (1, "second part".to_string()),
            (2, "third part".to_string()),
        ];
        assert_eq!(
            assemble_transcript(fragments),
            "first part second part third part"
        );
    }

    #[test]
    fn test_assemble_transcript_out_of_completion_order() {
        // Completion order differs from segment order; output must not.
        let fragments = vec![
            (2, "third".to_string()),
            (0, "first".to_string()),
            (1, "second".to_string()),
        ];
        assert_eq!(assemble_transcript(fragments), "first second third");
    }

    #[test]
    fn test_assemble_transcript_empty() {
        assert_eq!(assemble_transcript(Vec::new()), "");
    }
}
