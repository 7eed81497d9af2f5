//! Pipeline coordination for Kviss.
//!
//! Runs the stages in sequence: resolve source, download (if remote),
//! extract audio, transcribe, summarize, generate quiz. Each stage fails
//! fast and aborts the remainder.

use crate::config::{Prompts, Settings};
use crate::error::{KvissError, Result};
use crate::media::{derive_audio_path, download_video, extract_audio};
use crate::quiz::{QuizGenerator, QuizQuestion};
use crate::source::{parse_input, LocalSource, MediaMetadata, SourceType};
use crate::summary::Summarizer;
use crate::transcription::{Transcriber, WhisperTranscriber};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// The main pipeline for turning a video into a summary and quiz.
pub struct Pipeline {
    settings: Settings,
    transcriber: Arc<dyn Transcriber>,
    summarizer: Summarizer,
    quiz_generator: QuizGenerator,
    temp_dir: PathBuf,
}

impl Pipeline {
    /// Create a new pipeline with default components.
    ///
    /// The OpenAI client is constructed once here and handed to each stage.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let client = crate::openai::create_client();

        let transcriber: Arc<dyn Transcriber> = Arc::new(WhisperTranscriber::new(
            client.clone(),
            &settings.transcription,
        ));

        let summarizer = Summarizer::new(
            client.clone(),
            &settings.summary.model,
            prompts.summary.clone(),
        );

        let quiz_generator = QuizGenerator::new(client, &settings.quiz, prompts.quiz.clone());

        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            settings,
            transcriber,
            summarizer,
            quiz_generator,
            temp_dir,
        })
    }

    /// Create a pipeline with custom components (for test substitution).
    pub fn with_components(
        settings: Settings,
        transcriber: Arc<dyn Transcriber>,
        summarizer: Summarizer,
        quiz_generator: QuizGenerator,
    ) -> Result<Self> {
        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            settings,
            transcriber,
            summarizer,
            quiz_generator,
            temp_dir,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run the full pipeline on a URL or local video path.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn process_input(&self, input: &str, question_count: usize) -> Result<PipelineResult> {
        let metadata = self.resolve(input).await?;

        let work_dir = self.create_work_dir()?;
        let outcome = self.process_resolved(&metadata, &work_dir, question_count).await;
        Self::cleanup_work_dir(&work_dir);
        outcome
    }

    /// Run the full pipeline on an uploaded video file.
    ///
    /// The caller owns the uploaded file; only files the pipeline itself
    /// creates (the extracted audio, chunk segments) are cleaned up here.
    #[instrument(skip(self), fields(video = %video_path.display()))]
    pub async fn process_video_file(
        &self,
        video_path: &Path,
        question_count: usize,
    ) -> Result<PipelineResult> {
        if !video_path.exists() {
            return Err(KvissError::VideoNotFound(format!(
                "File not found: {}",
                video_path.display()
            )));
        }

        let title = video_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Uploaded video")
            .to_string();

        let work_dir = self.create_work_dir()?;
        let outcome = self
            .run_stages(video_path, &work_dir, question_count)
            .await
            .map(|(transcript, summary, quiz)| PipelineResult {
                media_id: format!("upload_{}", title.replace(' ', "_")),
                title,
                transcript,
                summary,
                quiz,
            });
        Self::cleanup_work_dir(&work_dir);
        outcome
    }

    /// Stop after transcription: resolve, download if needed, extract, transcribe.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn transcribe_input(&self, input: &str) -> Result<TranscriptResult> {
        let metadata = self.resolve(input).await?;

        let work_dir = self.create_work_dir()?;
        let outcome = async {
            let video_path = self.obtain_video(&metadata, &work_dir).await?;
            let transcript = self.extract_and_transcribe(&video_path, &work_dir).await?;
            Ok(TranscriptResult {
                media_id: metadata.id.clone(),
                title: metadata.title.clone(),
                transcript,
            })
        }
        .await;
        Self::cleanup_work_dir(&work_dir);
        outcome
    }

    /// Resolve input to media metadata and check the duration limit.
    async fn resolve(&self, input: &str) -> Result<MediaMetadata> {
        let (source, media_id) = parse_input(input).ok_or_else(|| {
            KvissError::InvalidInput(format!("Could not parse input: {}", input))
        })?;

        info!("Fetching metadata for {}", media_id);
        eprintln!("  Fetching metadata...");
        let metadata = source.fetch_media(&media_id).await?;
        eprintln!("  Title: {}", metadata.title);

        if let Some(duration) = metadata.duration_seconds {
            let mins = duration / 60;
            let secs = duration % 60;
            eprintln!("  Duration: {}:{:02}", mins, secs);
            if duration > self.settings.download.max_duration_seconds {
                return Err(KvissError::InvalidInput(format!(
                    "Media duration ({} seconds) exceeds maximum ({} seconds)",
                    duration, self.settings.download.max_duration_seconds
                )));
            }
        }

        Ok(metadata)
    }

    /// Download a remote video into the work directory, or use the local path.
    async fn obtain_video(&self, metadata: &MediaMetadata, work_dir: &Path) -> Result<PathBuf> {
        match metadata.source_type {
            SourceType::YouTube => {
                info!("Downloading video: {}", metadata.title);
                eprintln!("  Downloading video...");
                download_video(
                    &metadata.source_url,
                    &metadata.id,
                    &self.settings.download.format,
                    work_dir,
                )
                .await
            }
            SourceType::Local => Ok(PathBuf::from(&metadata.source_url)),
        }
    }

    async fn process_resolved(
        &self,
        metadata: &MediaMetadata,
        work_dir: &Path,
        question_count: usize,
    ) -> Result<PipelineResult> {
        let video_path = self.obtain_video(metadata, work_dir).await?;
        let (transcript, summary, quiz) = self
            .run_stages(&video_path, work_dir, question_count)
            .await?;

        Ok(PipelineResult {
            media_id: metadata.id.clone(),
            title: metadata.title.clone(),
            transcript,
            summary,
            quiz,
        })
    }

    /// Extract audio into the work directory and transcribe it.
    async fn extract_and_transcribe(&self, video_path: &Path, work_dir: &Path) -> Result<String> {
        let file_name = video_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("video.mp4");
        let audio_path = derive_audio_path(&work_dir.join(file_name));

        info!("Extracting audio track");
        eprintln!("  Extracting audio...");
        extract_audio(video_path, &audio_path).await?;

        info!("Transcribing audio");
        eprintln!("  Transcribing...");
        let transcript = self.transcriber.transcribe(&audio_path).await?;
        eprintln!("  Transcription complete ({} chars)", transcript.len());

        Ok(transcript)
    }

    /// Extract, transcribe, summarize, and generate the quiz.
    async fn run_stages(
        &self,
        video_path: &Path,
        work_dir: &Path,
        question_count: usize,
    ) -> Result<(String, String, Vec<QuizQuestion>)> {
        let transcript = self.extract_and_transcribe(video_path, work_dir).await?;

        info!("Summarizing transcript");
        eprintln!("  Summarizing...");
        let summary = self.summarizer.summarize(&transcript).await?;

        info!("Generating quiz");
        eprintln!("  Generating quiz...");
        let quiz = self.quiz_generator.generate(&summary, question_count).await?;
        eprintln!("  Generated {} questions", quiz.len());

        Ok((transcript, summary, quiz))
    }

    /// Create a per-invocation scratch directory.
    fn create_work_dir(&self) -> Result<PathBuf> {
        let work_dir = self.temp_dir.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&work_dir)?;
        Ok(work_dir)
    }

    /// Remove a per-invocation scratch directory; runs on every exit path.
    fn cleanup_work_dir(work_dir: &Path) {
        if let Err(e) = std::fs::remove_dir_all(work_dir) {
            warn!("Failed to clean up work directory {:?}: {}", work_dir, e);
        }
    }
}

/// Result of a full pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    /// Media ID.
    pub media_id: String,
    /// Title.
    pub title: String,
    /// Full transcript text.
    pub transcript: String,
    /// Generated summary.
    pub summary: String,
    /// Generated quiz questions, in generation order.
    pub quiz: Vec<QuizQuestion>,
}

/// Result of a transcription-only run.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptResult {
    /// Media ID.
    pub media_id: String,
    /// Title.
    pub title: String,
    /// Full transcript text.
    pub transcript: String,
}

/// Check whether an uploaded file name looks like a supported video.
pub fn is_supported_upload(file_name: &str) -> bool {
    LocalSource::is_video_file(Path::new(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_supported_upload() {
        assert!(is_supported_upload("lecture.mp4"));
        assert!(is_supported_upload("talk.MOV"));
        assert!(!is_supported_upload("notes.txt"));
        assert!(!is_supported_upload("audio.mp3"));
    }
}
