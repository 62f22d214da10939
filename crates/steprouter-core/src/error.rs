// Error types for workflow routing

use thiserror::Error;

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RouterError>;

/// Errors that can occur while initializing or advancing a workflow.
///
/// All variants are caller-facing and deterministic: retrying the same
/// request without correcting the input will fail the same way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RouterError {
    /// Malformed or inconsistent plan payload; carries every violation found
    #[error("invalid plan: {}", .0.join("; "))]
    PlanValidation(Vec<String>),

    /// Re-initialization of an existing workflow id
    #[error("workflow '{0}' already exists; use a unique workflow_id")]
    DuplicateWorkflow(String),

    /// Operation on a workflow id that was never initialized
    #[error("workflow '{0}' not found; initialize it first")]
    UnknownWorkflow(String),

    /// Completion report does not match the current pointer
    #[error("step out of order: expected step {expected}, received step {received}")]
    StepOutOfOrder { expected: u32, received: u32 },

    /// Reported agent role does not match the plan's declared role
    #[error("agent mismatch on step {step}: plan declares '{expected}', report names '{received}'")]
    AgentMismatch {
        step: u32,
        expected: String,
        received: String,
    },

    /// Completion submitted after the workflow reached its terminal state
    #[error("workflow '{0}' is already complete")]
    WorkflowAlreadyComplete(String),

    /// Rule acknowledgment gate is enabled and the report failed it
    #[error("step {step} requires acknowledgment of rule '{expected}'")]
    RuleAckMissing { step: u32, expected: String },

    /// Plan exceeds the configured step cap
    #[error("plan declares {requested} steps, exceeding the configured cap of {cap}")]
    MaxStepsExceeded { requested: u32, cap: u32 },
}

impl RouterError {
    /// Create a plan validation error from a list of violations
    pub fn plan(violations: Vec<String>) -> Self {
        RouterError::PlanValidation(violations)
    }

    /// Create a duplicate workflow error
    pub fn duplicate(workflow_id: impl Into<String>) -> Self {
        RouterError::DuplicateWorkflow(workflow_id.into())
    }

    /// Create an unknown workflow error
    pub fn unknown(workflow_id: impl Into<String>) -> Self {
        RouterError::UnknownWorkflow(workflow_id.into())
    }
}
