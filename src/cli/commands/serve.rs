//! HTTP API server for integration with other systems.
//!
//! Provides multipart upload endpoints for the full pipeline and for
//! extraction alone.

use crate::artifact::UploadedArtifact;
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, PipelineOutcome};
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    /// One pipeline run at a time.
    run_lock: Mutex<()>,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;
    let app = router(orchestrator);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Frontline API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Narrate", "POST /narrate  (multipart: file, language)");
    Output::kv("Extract", "POST /extract  (multipart: file, language)");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(orchestrator: Orchestrator) -> Router {
    let state = Arc::new(AppState {
        orchestrator,
        run_lock: Mutex::new(()),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/narrate", post(narrate))
        .route("/extract", post(extract))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

struct UploadForm {
    artifact: UploadedArtifact,
    language: Option<String>,
}

#[derive(Serialize)]
struct NarrateResponse {
    #[serde(flatten)]
    outcome: PipelineOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    audio_base64: Option<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn bad_request(error: impl Into<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// Read the `file` and `language` parts of an upload.
async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, Response> {
    let mut artifact = None;
    let mut language = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return Err(bad_request(format!("Invalid multipart body: {}", e))),
        };

        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Could not read file: {}", e)))?;
                artifact = Some(UploadedArtifact::from_bytes(bytes.to_vec(), filename));
            }
            "language" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Could not read language: {}", e)))?;
                let value = value.trim().to_string();
                if !value.is_empty() {
                    language = Some(value);
                }
            }
            _ => {}
        }
    }

    match artifact {
        Some(artifact) => Ok(UploadForm { artifact, language }),
        None => Err(bad_request("Missing 'file' part")),
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn narrate(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match read_upload(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let language = form
        .language
        .unwrap_or_else(|| state.orchestrator.default_language().to_string());

    let outcome = {
        let _guard = state.run_lock.lock().await;
        state.orchestrator.run(&form.artifact, &language).await
    };

    if let Some(stage) = outcome.stage_failed {
        warn!(request_id = %outcome.request_id, "Partial outcome, stopped at {}", stage);
    }

    let audio_base64 = outcome.audio().map(|audio| STANDARD.encode(audio));
    Json(NarrateResponse {
        outcome,
        audio_base64,
    })
    .into_response()
}

async fn extract(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    let form = match read_upload(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let language = form
        .language
        .unwrap_or_else(|| state.orchestrator.default_language().to_string());

    match state
        .orchestrator
        .extractor()
        .extract(&form.artifact, &language)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::Extractor;
    use crate::narration::{NarrationConfig, Narrator};
    use crate::summarization::Summarizer;
    use crate::testing::{
        RecordingCloner, RecordingCompletion, RecordingSpeaker, StaticDocx, StaticOcr, StaticPdf,
    };
    use reqwest::multipart::{Form, Part};
    use std::io::Write;

    async fn spawn_server(speaker: RecordingSpeaker) -> (String, tempfile::NamedTempFile) {
        let mut sample = tempfile::NamedTempFile::new().unwrap();
        sample.write_all(b"RIFF").unwrap();

        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Extractor::with_engines(
                Arc::new(StaticOcr::new("ocr text")),
                Arc::new(StaticPdf::new(&["Hello war."])),
                Arc::new(StaticDocx::new(&["Hello"])),
            ),
            Summarizer::new(Arc::new(RecordingCompletion::replying("Report."))),
            Narrator::with_components(
                Arc::new(RecordingCloner::failing()),
                Arc::new(speaker),
                NarrationConfig {
                    reference_speaker: Some(sample.path().to_path_buf()),
                    ..NarrationConfig::default()
                },
            ),
        );

        (serve_in_background(orchestrator).await, sample)
    }

    async fn serve_in_background(orchestrator: Orchestrator) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(orchestrator)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn upload(name: &str) -> Form {
        Form::new()
            .part("file", Part::bytes(b"%PDF".to_vec()).file_name(name.to_string()))
            .text("language", "eng")
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _sample) = spawn_server(RecordingSpeaker::succeeding()).await;
        let body: serde_json::Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_narrate_returns_outcome_and_audio() {
        let (base, _sample) = spawn_server(RecordingSpeaker::succeeding()).await;
        let response = reqwest::Client::new()
            .post(format!("{}/narrate", base))
            .multipart(upload("dispatch.pdf"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["extraction"]["text"], "Hello war.\n");
        assert_eq!(body["summary"]["report_text"], "Report.");
        assert_eq!(body["narration"]["model_tier"], "fallback");
        assert!(body["stage_failed"].is_null());
        assert_eq!(body["audio_base64"], STANDARD.encode(b"RIFF-fallback"));
    }

    #[tokio::test]
    async fn test_partial_outcome_is_ok_without_audio() {
        let (base, _sample) = spawn_server(RecordingSpeaker::failing()).await;
        let response = reqwest::Client::new()
            .post(format!("{}/narrate", base))
            .multipart(upload("dispatch.pdf"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["stage_failed"], "narration");
        assert_eq!(body["summary"]["report_text"], "Report.");
        assert!(body.get("audio_base64").is_none());
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let (base, _sample) = spawn_server(RecordingSpeaker::succeeding()).await;
        let response = reqwest::Client::new()
            .post(format!("{}/narrate", base))
            .multipart(Form::new().text("language", "eng"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_extract_unsupported() {
        let (base, _sample) = spawn_server(RecordingSpeaker::succeeding()).await;
        let body: serde_json::Value = reqwest::Client::new()
            .post(format!("{}/extract", base))
            .multipart(upload("notes.txt"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["kind"], "unsupported");
        assert_eq!(body["warnings"][0], "Unsupported file format: .txt");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_pipeline_runs_one_at_a_time() {
        use crate::testing::{InFlightGauge, SlowCompletion};
        use std::time::Duration;

        let gauge = Arc::new(InFlightGauge::default());
        let orchestrator = Orchestrator::with_components(
            Settings::default(),
            Extractor::with_engines(
                Arc::new(StaticOcr::new("")),
                Arc::new(StaticPdf::new(&["Hello war."])),
                Arc::new(StaticDocx::new(&[])),
            ),
            Summarizer::new(Arc::new(SlowCompletion::new(
                gauge.clone(),
                Duration::from_millis(150),
            ))),
            Narrator::with_components(
                Arc::new(RecordingCloner::failing()),
                Arc::new(RecordingSpeaker::succeeding()),
                NarrationConfig::default(),
            ),
        );
        let base = serve_in_background(orchestrator).await;

        let client = reqwest::Client::new();
        let send = |name: &'static str| {
            client
                .post(format!("{}/narrate", base))
                .multipart(upload(name))
                .send()
        };
        let (first, second) = tokio::join!(send("one.pdf"), send("two.pdf"));

        assert_eq!(first.unwrap().status(), reqwest::StatusCode::OK);
        assert_eq!(second.unwrap().status(), reqwest::StatusCode::OK);
        assert_eq!(gauge.max(), 1);
    }
}
