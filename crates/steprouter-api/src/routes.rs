// HTTP routes for the step router

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::error::ApiError;
use crate::protocol::{
    HealthResponse, InitializedResponse, RouteRequest, RouteResponse, StatusResponse,
};
use crate::router::StepRouter;

/// App state shared across routes
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<StepRouter>,
}

impl AppState {
    pub fn new(router: StepRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

/// Create the API routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/route", post(route_request))
        .route("/v1/workflows/:workflow_id/status", get(workflow_status))
        .route("/health", get(health_check))
        .with_state(state)
}

/// POST /v1/route - Submit a plan or a step completion report
///
/// The `type` discriminator selects the request shape: "all_steps_json"
/// initializes a workflow, "single_done_step_json" reports the current step
/// done. Unknown discriminators are rejected before any handler logic runs.
#[utoipa::path(
    post,
    path = "/v1/route",
    responses(
        (status = 201, description = "Workflow initialized", body = InitializedResponse),
        (status = 200, description = "Step accepted; ContinueResponse while steps remain, CompleteResponse on the last step"),
        (status = 400, description = "Plan validation, step cap, or rule acknowledgment failure"),
        (status = 404, description = "Unknown workflow"),
        (status = 409, description = "Duplicate workflow, out-of-order step, agent mismatch, or already complete")
    ),
    tag = "routing"
)]
pub async fn route_request(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<(StatusCode, Json<RouteResponse>), ApiError> {
    match req {
        RouteRequest::AllStepsJson(init) => {
            let resp = state.router.initialize(init).await?;
            Ok((StatusCode::CREATED, Json(RouteResponse::Initialized(resp))))
        }
        RouteRequest::SingleDoneStepJson(report) => {
            let resp = state.router.complete_step(report).await?;
            Ok((StatusCode::OK, Json(resp.into())))
        }
    }
}

/// GET /v1/workflows/{workflow_id}/status - Progress snapshot
#[utoipa::path(
    get,
    path = "/v1/workflows/{workflow_id}/status",
    params(
        ("workflow_id" = String, Path, description = "Workflow identifier")
    ),
    responses(
        (status = 200, description = "Current progress and execution log", body = StatusResponse),
        (status = 404, description = "Unknown workflow")
    ),
    tag = "workflows"
)]
pub async fn workflow_status(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    Ok(Json(state.router.status(&workflow_id).await?))
}

/// GET /health - Process liveness and active workflow count
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(state.router.health().await)
}
