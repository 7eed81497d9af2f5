//! CLI module for Kviss.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Kviss - Video Summarizer and Quiz Generator
///
/// Turn YouTube videos and local video files into summaries and
/// multiple-choice quizzes. The name "Kviss" comes from the Norwegian
/// spelling of "quiz."
#[derive(Parser, Debug)]
#[command(name = "kviss")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: summarize a video and generate a quiz
    Run {
        /// YouTube URL/ID, or local video file path
        input: String,

        /// Number of quiz questions to generate
        #[arg(short, long)]
        questions: Option<usize>,

        /// Print the result as JSON instead of formatted text
        #[arg(long)]
        json: bool,

        /// Include the full transcript in the output
        #[arg(long)]
        transcript: bool,
    },

    /// Transcribe a video and stop (no summary, no quiz)
    Transcribe {
        /// YouTube URL/ID, or local video file path
        input: String,

        /// Output transcript to file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start the HTTP server (upload form + JSON API)
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
