//! Transcribe command - transcript only, no summary or quiz.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;

/// Transcribe a video and print or save the transcript.
pub async fn run_transcribe(
    input: &str,
    output: Option<String>,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Process)?;

    let pipeline = Pipeline::new(settings)?;
    let result = pipeline.transcribe_input(input).await?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, &result.transcript).await?;
            Output::success(&format!("Transcript written to {}", path));
        }
        None => {
            println!("{}", result.transcript);
        }
    }

    Ok(())
}
