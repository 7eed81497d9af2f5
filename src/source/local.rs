//! Local video file source implementation.

use super::{MediaMetadata, SourceType, VideoSource};
use crate::error::{KvissError, Result};
use async_trait::async_trait;
use std::path::Path;

/// Supported video file extensions.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "flv", "wmv", "m4v", "mpeg", "mpg", "3gp",
];

/// Local file source for video files.
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }

    /// Check if path is a supported video file.
    pub fn is_video_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Get video metadata using ffprobe.
    async fn get_metadata_ffprobe(path: &Path) -> Result<(Option<u32>, Option<String>)> {
        let output = tokio::process::Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                path.to_str().unwrap_or(""),
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KvissError::ToolNotFound("ffprobe".to_string())
                } else {
                    KvissError::VideoSource(format!("Failed to run ffprobe: {}", e))
                }
            })?;

        if !output.status.success() {
            // ffprobe failed, but we can still proceed without metadata
            return Ok((None, None));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        let json: serde_json::Value = serde_json::from_str(&json_str).unwrap_or_default();

        let duration = json["format"]["duration"]
            .as_str()
            .and_then(|d| d.parse::<f64>().ok())
            .map(|d| d as u32);

        let title = json["format"]["tags"]["title"]
            .as_str()
            .map(|s| s.to_string());

        Ok((duration, title))
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VideoSource for LocalSource {
    fn source_type(&self) -> SourceType {
        SourceType::Local
    }

    async fn fetch_media(&self, id: &str) -> Result<MediaMetadata> {
        let path = Path::new(id);

        if !path.exists() {
            return Err(KvissError::VideoNotFound(format!("File not found: {}", id)));
        }

        if !Self::is_video_file(path) {
            return Err(KvissError::InvalidInput(format!(
                "Not a recognized video file: {}",
                id
            )));
        }

        let (duration, metadata_title) = Self::get_metadata_ffprobe(path).await?;

        let title = metadata_title.unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Unknown")
                .to_string()
        });

        // Generate a stable ID from the file path
        let media_id = format!(
            "local_{}",
            path.canonicalize()
                .unwrap_or_else(|_| path.to_path_buf())
                .to_string_lossy()
                .replace(['/', '\\', ' '], "_")
        );

        Ok(MediaMetadata {
            id: media_id,
            title,
            duration_seconds: duration,
            source_type: SourceType::Local,
            source_url: path
                .canonicalize()
                .unwrap_or_else(|_| path.to_path_buf())
                .to_string_lossy()
                .to_string(),
            published_at: None,
            channel: None,
        })
    }

    fn can_handle(&self, input: &str) -> bool {
        let path = Path::new(input);
        path.exists() && Self::is_video_file(path)
    }

    fn extract_id(&self, input: &str) -> Option<String> {
        let path = Path::new(input);
        if path.exists() && Self::is_video_file(path) {
            Some(input.to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_video_file() {
        assert!(LocalSource::is_video_file(Path::new("video.mp4")));
        assert!(LocalSource::is_video_file(Path::new("video.MKV")));
        assert!(LocalSource::is_video_file(Path::new("/path/to/clip.mov")));
        assert!(!LocalSource::is_video_file(Path::new("audio.mp3")));
        assert!(!LocalSource::is_video_file(Path::new("document.pdf")));
        assert!(!LocalSource::is_video_file(Path::new("noextension")));
    }
}
