//! Video download via yt-dlp.

use crate::error::{KvissError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

/// Downloads a video from a URL and saves it as MP4.
///
/// Uses yt-dlp with a bounded format selector (360p MP4 by default) so
/// downloads stay small and reliable. If the file already exists, it will be
/// returned without re-downloading.
#[instrument(skip(output_dir), fields(video_id = %video_id))]
pub async fn download_video(
    url: &str,
    video_id: &str,
    format: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp4", video_id));

    if target_path.exists() {
        info!("Using cached video file");
        return Ok(target_path);
    }

    info!("Downloading video from {}", url);

    let result = Command::new("yt-dlp")
        .arg("--format").arg(format)
        .arg("--merge-output-format").arg("mp4")
        .arg("--output").arg(target_path.to_str().unwrap_or_default())
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(KvissError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(KvissError::Download(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        // Leave no partial file behind
        let _ = std::fs::remove_file(&target_path);
        return Err(KvissError::Download(format!("yt-dlp failed: {stderr}")));
    }

    if !target_path.exists() {
        return Err(KvissError::Download(
            "Video file not found after download".into(),
        ));
    }

    Ok(target_path)
}
