//! HTTP server: minimal upload form and JSON API.
//!
//! `GET /` serves an upload form, `POST /process` accepts a multipart video
//! upload and renders the summary and quiz as HTML, `POST /api/quiz` runs
//! the pipeline on a URL or local path and returns JSON.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::KvissError;
use crate::pipeline::{is_supported_upload, Pipeline, PipelineResult};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;
use uuid::Uuid;

/// Maximum accepted upload size (512 MiB).
const MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;

/// Shared application state.
struct AppState {
    pipeline: Pipeline,
}

/// Run the HTTP server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    preflight::check(Operation::Serve)?;

    let pipeline = Pipeline::new(settings)?;
    let state = Arc::new(AppState { pipeline });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/process", post(process_upload))
        .route("/api/quiz", post(api_quiz))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Kviss Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Upload form", "GET  /");
    Output::kv("Process upload", "POST /process");
    Output::kv("Quiz (JSON)", "POST /api/quiz");
    Output::kv("Health", "GET  /health");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct QuizRequest {
    /// YouTube URL/ID or local video file path
    input: String,
    /// Number of questions to generate (config default if omitted)
    #[serde(default)]
    questions: Option<usize>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn index() -> Html<&'static str> {
    Html(
        r#"<!doctype html>
<html>
<head><title>Kviss - Video Quiz</title></head>
<body>
    <h1>Upload a Video File</h1>
    <form method="POST" action="/process" enctype="multipart/form-data">
        <input type="file" name="video"><br><br>
        <input type="submit" value="Summarize and Generate Quiz">
    </form>
</body>
</html>"#,
    )
}

async fn process_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    // Pull the uploaded video out of the form
    let mut upload: Option<(String, axum::body::Bytes)> = None;

    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some("video") {
                    continue;
                }
                let file_name = field
                    .file_name()
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "upload.mp4".to_string());
                match field.bytes().await {
                    Ok(bytes) => {
                        upload = Some((file_name, bytes));
                        break;
                    }
                    Err(e) => {
                        return error_page(StatusCode::BAD_REQUEST, &format!("Upload failed: {}", e))
                            .into_response();
                    }
                }
            }
            Ok(None) => break,
            Err(e) => {
                return error_page(StatusCode::BAD_REQUEST, &format!("Invalid form data: {}", e))
                    .into_response();
            }
        }
    }

    let Some((file_name, bytes)) = upload else {
        return error_page(StatusCode::BAD_REQUEST, "No video file provided").into_response();
    };

    if !is_supported_upload(&file_name) {
        return error_page(
            StatusCode::BAD_REQUEST,
            &format!("Not a recognized video file: {}", file_name),
        )
        .into_response();
    }

    // Write the upload to a per-request directory; removed below whatever
    // the pipeline outcome
    let upload_dir = state
        .pipeline
        .settings()
        .temp_dir()
        .join("uploads")
        .join(Uuid::new_v4().to_string());

    let video_path = match save_upload(&upload_dir, &file_name, &bytes).await {
        Ok(path) => path,
        Err(e) => {
            return error_page(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Could not store upload: {}", e),
            )
            .into_response();
        }
    };

    let question_count = state.pipeline.settings().quiz.questions;
    let outcome = state
        .pipeline
        .process_video_file(&video_path, question_count)
        .await;

    if let Err(e) = tokio::fs::remove_dir_all(&upload_dir).await {
        warn!("Failed to clean up upload directory {:?}: {}", upload_dir, e);
    }

    match outcome {
        Ok(result) => Html(render_result_page(&result)).into_response(),
        Err(e) => error_page(status_for(&e), &e.to_string()).into_response(),
    }
}

async fn api_quiz(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QuizRequest>,
) -> impl IntoResponse {
    // Reject URLs from hosts we can't download from with a clear message
    // instead of a generic parse failure
    if let Ok(parsed) = url::Url::parse(&req.input) {
        let host = parsed.host_str().unwrap_or("");
        let supported =
            host == "youtube.com" || host.ends_with(".youtube.com") || host == "youtu.be";
        if !supported {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Unsupported video host: {}", host),
                }),
            )
                .into_response();
        }
    }

    let question_count = req
        .questions
        .unwrap_or(state.pipeline.settings().quiz.questions);

    match state.pipeline.process_input(&req.input, question_count).await {
        Ok(result) => Json(result).into_response(),
        Err(e) => (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

// === Helpers ===

/// Write the uploaded bytes under the per-request directory.
async fn save_upload(
    upload_dir: &PathBuf,
    file_name: &str,
    bytes: &[u8],
) -> std::io::Result<PathBuf> {
    tokio::fs::create_dir_all(upload_dir).await?;
    // Keep only the base name so a crafted filename can't escape the directory
    let base_name = std::path::Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.mp4");
    let video_path = upload_dir.join(base_name);
    tokio::fs::write(&video_path, bytes).await?;
    Ok(video_path)
}

/// Map a pipeline error to an HTTP status.
fn status_for(error: &KvissError) -> StatusCode {
    match error {
        KvissError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        KvissError::VideoNotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_page(status: StatusCode, message: &str) -> (StatusCode, Html<String>) {
    (
        status,
        Html(format!(
            "<h1>Error</h1><p>{}</p><p><a href=\"/\">Try again</a></p>",
            escape_html(message)
        )),
    )
}

/// Render the summary and quiz as a simple HTML page.
fn render_result_page(result: &PipelineResult) -> String {
    let mut page = String::new();
    page.push_str("<!doctype html>\n<html>\n<head><title>Kviss Result</title></head>\n<body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", escape_html(&result.title)));
    page.push_str("<h2>Summary</h2>\n");
    page.push_str(&format!("<p>{}</p>\n", escape_html(&result.summary)));
    page.push_str("<h2>Quiz</h2>\n");

    if result.quiz.is_empty() {
        page.push_str("<p>No questions generated.</p>\n");
    }

    for (idx, question) in result.quiz.iter().enumerate() {
        page.push_str(&format!(
            "<h3>Q{}: {}</h3>\n<ol type=\"A\">\n",
            idx + 1,
            escape_html(&question.question)
        ));
        for option in &question.options {
            page.push_str(&format!("<li>{}</li>\n", escape_html(&option.text)));
        }
        page.push_str("</ol>\n");
        page.push_str(&format!(
            "<p><b>Answer:</b> {}</p>\n",
            escape_html(&question.correct_answer)
        ));
        if !question.explanation.is_empty() {
            page.push_str(&format!(
                "<p><i>{}</i></p>\n",
                escape_html(&question.explanation)
            ));
        }
    }

    page.push_str("<p><a href=\"/\">Process another video</a></p>\n</body>\n</html>\n");
    page
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{QuizOption, QuizQuestion};

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_render_result_page() {
        let result = PipelineResult {
            media_id: "abc".to_string(),
            title: "Test <video>".to_string(),
            transcript: "hello".to_string(),
            summary: "A summary.".to_string(),
            quiz: vec![QuizQuestion {
                question: "One?".to_string(),
                options: vec![
                    QuizOption::new("A", "yes"),
                    QuizOption::new("B", "no"),
                    QuizOption::new("C", "maybe"),
                    QuizOption::new("D", "never"),
                ],
                correct_answer: "A".to_string(),
                explanation: String::new(),
            }],
        };

        let page = render_result_page(&result);
        assert!(page.contains("Test &lt;video&gt;"));
        assert!(page.contains("A summary."));
        assert!(page.contains("<li>maybe</li>"));
        assert!(!page.contains("<video>"));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&KvissError::InvalidInput("x".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&KvissError::Transcription("x".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
