// Steprouter API server
//
// Sequences a fixed list of multi-agent steps: accepts a full step plan
// once, hands out one step at a time, and reports a final summary when all
// steps are done. State lives in memory for the process lifetime; the
// journal files exist for downstream tailing only.

mod config;
mod error;
mod protocol;
mod router;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

use steprouter_core::{
    ExecutionLogEntry, FileManifest, StepSpec, WorkflowStatus, WorkflowSummary,
};
use steprouter_storage::{Journal, WorkflowStore};

use config::Config;
use router::StepRouter;
use routes::AppState;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        routes::route_request,
        routes::workflow_status,
        routes::health_check,
    ),
    components(
        schemas(
            protocol::InitializeRequest,
            protocol::StepCompletionRequest,
            protocol::InitializedResponse,
            protocol::ContinueResponse,
            protocol::CompleteResponse,
            protocol::StatusResponse,
            protocol::HealthResponse,
            StepSpec,
            ExecutionLogEntry,
            FileManifest,
            WorkflowStatus,
            WorkflowSummary,
        )
    ),
    tags(
        (name = "routing", description = "Plan submission and step completion"),
        (name = "workflows", description = "Read-only workflow progress"),
        (name = "health", description = "Process liveness")
    ),
    info(
        title = "Steprouter API",
        description = "Workflow-state router: one step at a time, strict order",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    )
)]
struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steprouter_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("steprouter-api starting...");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        log_dir = %config.log_dir.display(),
        max_steps = config.max_steps,
        require_rule_ack = config.require_rule_ack,
        "Configuration loaded"
    );

    let journal = Journal::new(&config.log_dir)
        .with_context(|| format!("Failed to open log directory {}", config.log_dir.display()))?;
    let step_router = StepRouter::new(
        WorkflowStore::new(),
        Arc::new(journal),
        config.max_steps,
        config.require_rule_ack,
    );

    let app = Router::new()
        .merge(routes::routes(AppState::new(step_router)))
        .route("/api-doc/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
