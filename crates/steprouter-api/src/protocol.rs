// Wire DTOs for the routing endpoint
//
// Inbound requests carry a `type` discriminator. It is decoded up front as
// an internally-tagged enum, so each request body lands in a strongly-typed
// record and unknown discriminators are rejected at the deserialization
// boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use steprouter_core::{ExecutionLogEntry, FileManifest, StepSpec, WorkflowStatus, WorkflowSummary};

/// Inbound routing request, discriminated by the `type` field
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouteRequest {
    /// Full plan submission ("all_steps_json")
    AllStepsJson(InitializeRequest),
    /// Single step completion report ("single_done_step_json")
    SingleDoneStepJson(StepCompletionRequest),
}

/// Full step plan, submitted exactly once per workflow
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct InitializeRequest {
    /// Unique workflow identifier chosen by the caller
    #[schema(example = "wf-1")]
    pub workflow_id: String,
    /// Free-text statement of the overall goal
    #[serde(default)]
    pub original_goal: String,
    /// Declared step count; must equal the length of `steps`
    pub total_steps: u32,
    /// Ordered step specifications, numbered 1..=total_steps
    pub steps: Vec<StepSpec>,
}

/// Report that the current step finished
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct StepCompletionRequest {
    #[schema(example = "wf-1")]
    pub workflow_id: String,
    /// Step number being reported; must equal the current pointer
    pub step_number: u32,
    /// Echo of the declared total, informational
    #[serde(default)]
    pub total_steps: Option<u32>,
    /// Agent role that executed the step
    #[schema(example = "FileCreator")]
    pub completed_agent_role: String,
    /// Policy the agent operated under, informational
    #[serde(default)]
    pub completed_policy: String,
    /// What the agent actually did
    #[serde(default)]
    pub completed_task: String,
    #[serde(default)]
    #[schema(example = json!(["index.html"]))]
    pub files_created: Vec<String>,
    #[serde(default)]
    pub files_modified: Vec<String>,
    /// Echo of the original goal, informational
    #[serde(default)]
    pub original_goal: Option<String>,
    /// Rule/policy acknowledgment text; required when the rule-ack gate is
    /// enabled, and must equal the plan step's declared policy
    #[serde(default)]
    pub rules_acknowledged: Option<String>,
}

/// Response to a successful plan submission
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InitializedResponse {
    #[schema(example = "initialized")]
    pub status: String,
    pub workflow_id: String,
    pub next_step_number: u32,
    pub total_steps: u32,
    pub agent_role: String,
    pub instruction: String,
}

/// Response when steps remain after an accepted completion
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContinueResponse {
    #[schema(example = "continue")]
    pub status: String,
    pub workflow_id: String,
    pub next_step_number: u32,
    pub total_steps: u32,
    pub agent_role: String,
    pub policy: String,
    pub instruction: String,
    #[schema(example = "Step 2 of 2")]
    pub context: String,
}

/// Response when the accepted completion was the last step
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CompleteResponse {
    #[schema(example = "complete")]
    pub status: String,
    pub workflow_id: String,
    pub message: String,
    pub execution_log: Vec<ExecutionLogEntry>,
    pub summary: WorkflowSummary,
}

/// Either of the two completion responses
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StepCompletionResponse {
    Continue(ContinueResponse),
    Complete(CompleteResponse),
}

/// Union of everything POST /v1/route can return
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RouteResponse {
    Initialized(InitializedResponse),
    Continue(ContinueResponse),
    Complete(CompleteResponse),
}

impl From<StepCompletionResponse> for RouteResponse {
    fn from(resp: StepCompletionResponse) -> Self {
        match resp {
            StepCompletionResponse::Continue(c) => RouteResponse::Continue(c),
            StepCompletionResponse::Complete(c) => RouteResponse::Complete(c),
        }
    }
}

/// Read-only progress snapshot for one workflow
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusResponse {
    pub workflow_id: String,
    pub status: WorkflowStatus,
    /// Current pointer; absent once the workflow is complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_step_number: Option<u32>,
    pub total_steps: u32,
    pub completed_steps: usize,
    pub execution_log: Vec<ExecutionLogEntry>,
    pub file_manifest: FileManifest,
}

/// Process liveness report
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub timestamp: DateTime<Utc>,
    pub active_workflow_count: usize,
}
