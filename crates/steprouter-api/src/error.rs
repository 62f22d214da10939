// Error -> HTTP response mapping
//
// Every RouterError is deterministic and caller-facing; the body carries a
// stable machine-readable code plus the human-readable message, and for
// plan validation the itemized violations.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use steprouter_core::RouterError;

/// API error wrapper around the core taxonomy
#[derive(Debug)]
pub struct ApiError(pub RouterError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    details: Vec<String>,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            RouterError::PlanValidation(_)
            | RouterError::MaxStepsExceeded { .. }
            | RouterError::RuleAckMissing { .. } => StatusCode::BAD_REQUEST,
            RouterError::UnknownWorkflow(_) => StatusCode::NOT_FOUND,
            RouterError::DuplicateWorkflow(_)
            | RouterError::StepOutOfOrder { .. }
            | RouterError::AgentMismatch { .. }
            | RouterError::WorkflowAlreadyComplete(_) => StatusCode::CONFLICT,
        }
    }

    fn code(&self) -> &'static str {
        match self.0 {
            RouterError::PlanValidation(_) => "plan_validation",
            RouterError::DuplicateWorkflow(_) => "duplicate_workflow",
            RouterError::UnknownWorkflow(_) => "unknown_workflow",
            RouterError::StepOutOfOrder { .. } => "step_out_of_order",
            RouterError::AgentMismatch { .. } => "agent_mismatch",
            RouterError::WorkflowAlreadyComplete(_) => "workflow_already_complete",
            RouterError::RuleAckMissing { .. } => "rule_ack_missing",
            RouterError::MaxStepsExceeded { .. } => "max_steps_exceeded",
        }
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let details = match &self.0 {
            RouterError::PlanValidation(violations) => violations.clone(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.code(),
            details,
        };
        (self.status(), Json(body)).into_response()
    }
}
