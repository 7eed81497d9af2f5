//! Configuration settings for Kviss.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub download: DownloadSettings,
    pub transcription: TranscriptionSettings,
    pub summary: SummarySettings,
    pub quiz: QuizSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for temporary files (downloads, extracted audio, uploads).
    pub temp_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            temp_dir: "/tmp/kviss".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Video download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// yt-dlp format selector. The default is itag 18 (360p MP4), a low
    /// resolution single-file format that downloads reliably.
    pub format: String,
    /// Maximum media duration to process (in seconds).
    pub max_duration_seconds: u32,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            format: "18".to_string(),
            max_duration_seconds: 7200, // 2 hours
        }
    }
}

/// Transcription service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Whisper model to use.
    pub model: String,
    /// Duration in seconds for splitting long audio files.
    pub chunk_duration_seconds: u32,
    /// Audio files at or below this size are sent in a single request.
    pub single_request_max_bytes: u64,
    /// Maximum concurrent chunk transcriptions.
    pub max_concurrent_chunks: usize,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            chunk_duration_seconds: 600, // 10 minutes
            single_request_max_bytes: 24 * 1024 * 1024,
            max_concurrent_chunks: 2,
        }
    }
}

/// Summarization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    /// Chat model used for summarization.
    pub model: String,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
        }
    }
}

/// Quiz output mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuizOutputMode {
    /// Request a JSON object conforming to a fixed schema (default).
    #[default]
    Structured,
    /// Request labeled text blocks and parse them with the block parser.
    Freetext,
}

impl std::str::FromStr for QuizOutputMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "structured" | "json" => Ok(QuizOutputMode::Structured),
            "freetext" | "text" => Ok(QuizOutputMode::Freetext),
            _ => Err(format!("Unknown quiz output mode: {}", s)),
        }
    }
}

impl std::fmt::Display for QuizOutputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizOutputMode::Structured => write!(f, "structured"),
            QuizOutputMode::Freetext => write!(f, "freetext"),
        }
    }
}

/// Quiz generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizSettings {
    /// Chat model used for quiz generation.
    pub model: String,
    /// Number of questions to request per quiz.
    pub questions: usize,
    /// Output mode (structured, freetext).
    pub mode: QuizOutputMode,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            questions: 5,
            mode: QuizOutputMode::Structured,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::KvissError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kviss")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.transcription.chunk_duration_seconds, 600);
        assert_eq!(settings.transcription.single_request_max_bytes, 24 * 1024 * 1024);
        assert_eq!(settings.quiz.questions, 5);
        assert_eq!(settings.quiz.mode, QuizOutputMode::Structured);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = PathBuf::from("/nonexistent/kviss/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.summary.model, "gpt-4o");
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let toml_str = r#"
            [quiz]
            questions = 3
        "#;
        let settings: Settings = toml::from_str(toml_str).unwrap();
        assert_eq!(settings.quiz.questions, 3);
        assert_eq!(settings.quiz.model, "gpt-4o");
        assert_eq!(settings.transcription.model, "whisper-1");
    }

    #[test]
    fn test_quiz_mode_parse() {
        assert_eq!("structured".parse::<QuizOutputMode>().unwrap(), QuizOutputMode::Structured);
        assert_eq!("freetext".parse::<QuizOutputMode>().unwrap(), QuizOutputMode::Freetext);
        assert!("yaml".parse::<QuizOutputMode>().is_err());
    }
}
