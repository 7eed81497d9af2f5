//! Run command - full pipeline from video to quiz.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;

/// Run the full pipeline and print the result.
pub async fn run_pipeline(
    input: &str,
    questions: Option<usize>,
    json: bool,
    include_transcript: bool,
    settings: Settings,
) -> anyhow::Result<()> {
    preflight::check(Operation::Process)?;

    let question_count = questions.unwrap_or(settings.quiz.questions);
    let pipeline = Pipeline::new(settings)?;

    let result = pipeline.process_input(input, question_count).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    Output::header(&result.title);

    if include_transcript {
        Output::header("Transcript");
        println!("{}", result.transcript);
    }

    Output::header("Summary");
    println!("{}", result.summary);

    Output::header("Quiz");
    if result.quiz.is_empty() {
        Output::warning("No questions generated (the video may have no speech).");
    }
    for (idx, question) in result.quiz.iter().enumerate() {
        Output::quiz_question(idx + 1, question);
    }

    Ok(())
}
