// AwardBench Paper API server
// Decision: Same routes as the leaderboard site expects (/api/paper/*), optional API_PREFIX
// Decision: Missing TeX toolchain is not an error; the PDF is simply reported as unavailable

mod common;
mod config;
mod paper;
mod services;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Json, Router};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::ApiConfig;
use crate::services::PaperService;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        paper::generate_paper,
        paper::download_paper,
        paper::paper_status,
    ),
    components(
        schemas(
            paper::GenerateResponse,
            paper::GeneratedFiles,
            paper::StatusResponse,
            common::ErrorResponse,
        )
    ),
    tags(
        (name = "paper", description = "AwardBench paper generation and downloads")
    ),
    info(
        title = "AwardBench Paper API",
        version = "0.2.0",
        description = "API for generating and downloading the AwardBench LaTeX paper",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "awardbench_api=debug,awardbench_core=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("awardbench-api starting...");

    let config = ApiConfig::from_env();
    tracing::info!(
        output_dir = %config.assembler.output_dir.display(),
        data_file = ?config.assembler.data_file,
        compile = config.assembler.compile,
        typesetter = %config.assembler.compiler.typesetter,
        "Paper generation configured"
    );

    let service = PaperService::new(&config.assembler).context("Failed to initialize paper service")?;

    if !config.api_prefix.is_empty() {
        tracing::info!(prefix = %config.api_prefix, "API prefix configured");
    }
    if config.cors_origins.is_empty() {
        tracing::info!("CORS not configured (same-origin requests only)");
    } else {
        tracing::info!(origins = ?config.cors_origins, "CORS origins configured");
    }

    let app = build_app(Arc::new(service), &config);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("Failed to bind to address")?;
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Assemble the full router: health, prefixed paper routes, Swagger UI, CORS and tracing
fn build_app(service: Arc<PaperService>, config: &ApiConfig) -> Router {
    let api_routes = paper::routes(paper::AppState::new(service));

    let app = Router::new()
        .route("/health", get(health))
        .merge(build_router_with_prefix(api_routes, &config.api_prefix))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()));

    // Add CORS layer only if origins are configured
    let app = if !config.cors_origins.is_empty() {
        app.layer(cors_layer(config.cors_origins.clone()))
    } else {
        app
    };

    app.layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([header::CONTENT_DISPOSITION])
}

/// Build router with optional API prefix (extracted for testing)
fn build_router_with_prefix<S: Clone + Send + Sync + 'static>(
    api_routes: Router<S>,
    api_prefix: &str,
) -> Router<S> {
    if api_prefix.is_empty() {
        api_routes
    } else {
        Router::new().nest(api_prefix, api_routes)
    }
}
