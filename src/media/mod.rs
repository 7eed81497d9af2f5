//! Video download and audio processing.
//!
//! External tool plumbing: yt-dlp for video downloads, ffmpeg/ffprobe for
//! audio extraction and segmentation.

mod downloader;
mod extractor;

pub use downloader::download_video;
pub use extractor::{
    derive_audio_path, extract_audio, probe_duration, segment_offsets, split_audio,
};
