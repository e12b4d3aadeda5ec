// Paper HTTP routes
//
// Design Decision: Handlers are thin; PaperService owns generation and the
// published output directory. Every failure is reported as ErrorResponse.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::ErrorResponse;
use crate::services::{PaperFormat, PaperService};

/// App state for paper routes
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PaperService>,
}

impl AppState {
    pub fn new(service: Arc<PaperService>) -> Self {
        Self { service }
    }
}

/// Which artifacts a generation produced
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedFiles {
    pub tex: bool,
    pub pdf: bool,
    pub bundle: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateResponse {
    #[schema(example = "success")]
    pub status: String,
    /// Timestamp of the benchmark record the paper was rendered from.
    pub generated_at: DateTime<Utc>,
    pub files: GeneratedFiles,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub tex_available: bool,
    pub pdf_available: bool,
    pub bundle_available: bool,
    /// Timestamp of the current benchmark record.
    pub last_updated: DateTime<Utc>,
}

/// Create paper routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/api/paper/generate", get(generate_paper))
        .route("/api/paper/download/:format", get(download_paper))
        .route("/api/paper/status", get(paper_status))
        .with_state(state)
}

fn internal_error(err: awardbench_core::AssemblyError) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!(error = %err, "Paper generation failed");
    ErrorResponse::new(err.to_string()).into_response(StatusCode::INTERNAL_SERVER_ERROR)
}

/// GET /api/paper/generate - Generate the paper and publish its artifacts
#[utoipa::path(
    get,
    path = "/api/paper/generate",
    responses(
        (status = 200, description = "Paper generated", body = GenerateResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
    ),
    tag = "paper"
)]
pub async fn generate_paper(
    State(state): State<AppState>,
) -> Result<Json<GenerateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let summary = state.service.generate().await.map_err(internal_error)?;

    Ok(Json(GenerateResponse {
        status: "success".to_string(),
        generated_at: summary.generated_at,
        files: GeneratedFiles {
            tex: summary.tex,
            pdf: summary.pdf,
            bundle: summary.bundle,
        },
    }))
}

/// GET /api/paper/download/{format} - Download a paper artifact
#[utoipa::path(
    get,
    path = "/api/paper/download/{format}",
    params(
        ("format" = String, Path, description = "One of tex, pdf, bundle")
    ),
    responses(
        (status = 200, description = "Artifact contents as an attachment"),
        (status = 400, description = "Invalid format", body = ErrorResponse),
        (status = 500, description = "File generation failed", body = ErrorResponse),
    ),
    tag = "paper"
)]
pub async fn download_paper(
    State(state): State<AppState>,
    Path(format): Path<String>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let format: PaperFormat = format
        .parse()
        .map_err(|message: String| ErrorResponse::new(message).into_response(StatusCode::BAD_REQUEST))?;

    let path = state
        .service
        .published_file(format)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            tracing::warn!(format = ?format, "Artifact still missing after generation");
            ErrorResponse::new("File generation failed")
                .into_response(StatusCode::INTERNAL_SERVER_ERROR)
        })?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Failed to read artifact");
        ErrorResponse::new(format!("Failed to read {}", format.download_name()))
            .into_response(StatusCode::INTERNAL_SERVER_ERROR)
    })?;

    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", format.download_name()),
        ),
    ];
    Ok((headers, bytes).into_response())
}

/// GET /api/paper/status - Report which artifacts are published
#[utoipa::path(
    get,
    path = "/api/paper/status",
    responses(
        (status = 200, description = "Published artifacts", body = StatusResponse),
        (status = 500, description = "Benchmark record unavailable", body = ErrorResponse),
    ),
    tag = "paper"
)]
pub async fn paper_status(
    State(state): State<AppState>,
) -> Result<Json<StatusResponse>, (StatusCode, Json<ErrorResponse>)> {
    let status = state.service.status().map_err(internal_error)?;

    Ok(Json(StatusResponse {
        tex_available: status.tex,
        pdf_available: status.pdf,
        bundle_available: status.bundle,
        last_updated: status.last_updated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use awardbench_core::{
        AssemblerConfig, CommandOutput, CommandRunner, CompileStep, Invocation, ToolchainError,
    };
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    /// Succeeds every step and writes a PDF on the final pass
    struct FakeTypesetter;

    #[async_trait]
    impl CommandRunner for FakeTypesetter {
        async fn run(
            &self,
            invocation: &Invocation,
            _limit: Duration,
        ) -> Result<CommandOutput, ToolchainError> {
            if invocation.step == CompileStep::FinalPass {
                std::fs::write(invocation.working_dir.join("awardbench_paper.pdf"), b"%PDF-1.5")
                    .unwrap();
            }
            Ok(CommandOutput {
                exit_code: Some(0),
                diagnostics: String::new(),
            })
        }
    }

    struct MissingTypesetter;

    #[async_trait]
    impl CommandRunner for MissingTypesetter {
        async fn run(
            &self,
            invocation: &Invocation,
            _limit: Duration,
        ) -> Result<CommandOutput, ToolchainError> {
            Err(ToolchainError::NotFound {
                program: invocation.program.clone(),
            })
        }
    }

    fn app(output: &std::path::Path, runner: Arc<dyn CommandRunner>) -> Router {
        let config = AssemblerConfig::default().with_output_dir(output);
        let service = PaperService::with_runner(&config, runner).unwrap();
        routes(AppState::new(Arc::new(service)))
    }

    async fn send_get(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_generate_publishes_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FakeTypesetter));

        let response = send_get(&app, "/api/paper/generate").await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["generated_at"], "2025-01-20T12:00:00Z");
        assert_eq!(body["files"]["tex"], true);
        assert_eq!(body["files"]["pdf"], true);
        assert_eq!(body["files"]["bundle"], true);
        assert!(dir.path().join("awardbench_paper.tex").is_file());
        assert!(dir.path().join("references.bib").is_file());
        assert!(dir.path().join("awardbench_paper.pdf").is_file());
        assert!(dir.path().join("awardbench_paper.zip").is_file());
    }

    #[tokio::test]
    async fn test_generate_without_toolchain() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("awardbench_paper.pdf"), b"stale").unwrap();
        let app = app(dir.path(), Arc::new(MissingTypesetter));

        let body = json_body(send_get(&app, "/api/paper/generate").await).await;

        assert_eq!(body["files"]["pdf"], false);
        assert_eq!(body["files"]["bundle"], true);
        assert!(!dir.path().join("awardbench_paper.pdf").exists());
    }

    #[tokio::test]
    async fn test_generate_without_bundle_removes_stale_archive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("awardbench_paper.zip"), b"stale").unwrap();
        let config = AssemblerConfig::default()
            .with_output_dir(dir.path())
            .with_bundle(false);
        let service = PaperService::with_runner(&config, Arc::new(MissingTypesetter)).unwrap();
        let app = routes(AppState::new(Arc::new(service)));

        let body = json_body(send_get(&app, "/api/paper/generate").await).await;

        assert_eq!(body["files"]["bundle"], false);
        assert!(!dir.path().join("awardbench_paper.zip").exists());
        let status = json_body(send_get(&app, "/api/paper/status").await).await;
        assert_eq!(status["bundle_available"], false);
    }

    #[tokio::test]
    async fn test_generate_leaves_only_published_files() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(MissingTypesetter));

        send_get(&app, "/api/paper/generate").await;

        let mut names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec!["awardbench_paper.tex", "awardbench_paper.zip", "references.bib"]
        );
    }

    #[tokio::test]
    async fn test_download_generates_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(MissingTypesetter));

        let response = send_get(&app, "/api/paper/download/tex").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"awardbench_paper.tex\""
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("\\documentclass"));
    }

    #[tokio::test]
    async fn test_download_bundle_name() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(MissingTypesetter));

        let response = send_get(&app, "/api/paper/download/bundle").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"awardbench_paper_bundle.zip\""
        );
    }

    #[tokio::test]
    async fn test_download_pdf_without_toolchain_fails() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(MissingTypesetter));

        let response = send_get(&app, "/api/paper/download/pdf").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "File generation failed");
    }

    #[tokio::test]
    async fn test_download_invalid_format() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(MissingTypesetter));

        let response = send_get(&app, "/api/paper/download/docx").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert!(!dir.path().join("awardbench_paper.tex").exists());
    }

    #[tokio::test]
    async fn test_status_before_and_after_generate() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path(), Arc::new(FakeTypesetter));

        let before = json_body(send_get(&app, "/api/paper/status").await).await;
        assert_eq!(before["tex_available"], false);
        assert_eq!(before["pdf_available"], false);
        assert_eq!(before["bundle_available"], false);
        assert_eq!(before["last_updated"], "2025-01-20T12:00:00Z");

        send_get(&app, "/api/paper/generate").await;

        let after = json_body(send_get(&app, "/api/paper/status").await).await;
        assert_eq!(after["tex_available"], true);
        assert_eq!(after["pdf_available"], true);
        assert_eq!(after["bundle_available"], true);
    }

    #[tokio::test]
    async fn test_invalid_record_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("record.json");
        std::fs::write(&data, r#"{"timestamp": "2025-01-20T12:00:00Z", "leaderboard": [], "metrics": {}}"#)
            .unwrap();
        let config = AssemblerConfig::default()
            .with_output_dir(dir.path().join("out"))
            .with_data_file(&data);
        let service = PaperService::with_runner(&config, Arc::new(MissingTypesetter)).unwrap();
        let app = routes(AppState::new(Arc::new(service)));

        let response = send_get(&app, "/api/paper/generate").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["status"], "error");
        assert!(body["message"].as_str().unwrap().contains("leaderboard is empty"));
    }
}
