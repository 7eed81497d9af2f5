//! Audio extraction and segmentation via ffmpeg.

use crate::error::{KvissError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Derive the audio output path for a video file: same stem, `.mp3` extension.
pub fn derive_audio_path(video_path: &Path) -> PathBuf {
    video_path.with_extension("mp3")
}

/// Extracts the audio track of a video file and encodes it to MP3.
///
/// The source video is left untouched. On failure no usable output file
/// remains at `audio_path`.
#[instrument(skip_all, fields(video = %video_path.display()))]
pub async fn extract_audio(video_path: &Path, audio_path: &Path) -> Result<()> {
    debug!("Extracting audio to {:?}", audio_path);

    let result = Command::new("ffmpeg")
        .arg("-i").arg(video_path)
        .arg("-vn")
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(audio_path)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            // Leave no partial file behind
            let _ = std::fs::remove_file(audio_path);
            Err(KvissError::Extraction(format!(
                "ffmpeg could not extract audio: {err}"
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(KvissError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(KvissError::Extraction(format!("ffmpeg error: {e}"))),
    }
}

/// Compute the start offset of each fixed-duration segment.
///
/// Yields `ceil(total_duration / chunk_len)` offsets. Boundaries fall at
/// wall-clock positions, not silence or sentence boundaries.
pub fn segment_offsets(total_duration: f64, chunk_len: f64) -> Vec<f64> {
    let mut offsets = Vec::new();
    let mut offset = 0.0;
    while offset < total_duration {
        offsets.push(offset);
        offset += chunk_len;
    }
    offsets
}

/// Segments a long audio file into smaller chunks for processing.
///
/// Each chunk will be approximately `chunk_seconds` long. Returns tuples of
/// (chunk_path, offset_seconds) for each segment, in temporal order.
#[instrument(skip_all)]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<(PathBuf, f64)>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds as f64;

    // Short audio doesn't need splitting
    if total_duration <= chunk_len {
        return Ok(vec![(source.to_path_buf(), 0.0)]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut segments = Vec::new();

    for (idx, offset) in segment_offsets(total_duration, chunk_len).into_iter().enumerate() {
        let segment_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));
        let segment_len = chunk_len.min(total_duration - offset);

        extract_segment(source, &segment_path, offset, segment_len).await?;

        debug!("Created segment {} at offset {:.1}s", idx, offset);
        segments.push((segment_path, offset));
    }

    info!("Created {} audio segments", segments.len());
    Ok(segments)
}

/// Extracts a time segment from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    // First attempt: stream copy (fast, no quality loss)
    let copy_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-c").arg("copy")
        .arg("-y")
        .arg("-loglevel").arg("warning")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;

    if let Ok(status) = copy_result {
        if status.success() && dest.exists() {
            return Ok(());
        }
    }

    // Fallback: re-encode to MP3
    warn!("Stream copy failed, re-encoding segment");

    let encode_result = Command::new("ffmpeg")
        .arg("-ss").arg(format!("{:.3}", start))
        .arg("-i").arg(source)
        .arg("-t").arg(format!("{:.3}", length))
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match encode_result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(KvissError::Extraction(format!(
                "Segment extraction failed: {err}"
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(KvissError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(KvissError::Extraction(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(KvissError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(KvissError::Extraction(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(KvissError::Extraction("ffprobe returned error".into()));
    }

    // Parse JSON output to extract duration
    let json_str = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&json_str)
        .map_err(|_| KvissError::Extraction("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| KvissError::Extraction("Could not determine audio duration".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_audio_path() {
        assert_eq!(
            derive_audio_path(Path::new("/tmp/lecture.mp4")),
            PathBuf::from("/tmp/lecture.mp3")
        );
        assert_eq!(
            derive_audio_path(Path::new("clip.mkv")),
            PathBuf::from("clip.mp3")
        );
    }

    #[test]
    fn test_segment_offsets_exact_multiple() {
        let offsets = segment_offsets(1200.0, 600.0);
        assert_eq!(offsets, vec![0.0, 600.0]);
    }

    #[test]
    fn test_segment_offsets_with_remainder() {
        // 25 minutes of audio in 10-minute chunks: ceil(1500/600) = 3
        let offsets = segment_offsets(1500.0, 600.0);
        assert_eq!(offsets, vec![0.0, 600.0, 1200.0]);
    }

    #[test]
    fn test_segment_offsets_short_audio() {
        let offsets = segment_offsets(90.0, 600.0);
        assert_eq!(offsets, vec![0.0]);
    }
}
