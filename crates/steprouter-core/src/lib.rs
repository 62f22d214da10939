// Workflow step sequencing core
//
// This crate is transport-agnostic: it owns the plan types, the per-workflow
// state machine, and the error taxonomy. The HTTP layer and the journal live
// in the steprouter-api and steprouter-storage crates.
//
// Key design decisions:
// - Steps execute strictly in ascending numeric order; a completion report
//   for any step other than the current pointer is rejected, never reordered
// - A reported agent role must match the plan's declared role for that step
//   (hard failure, for auditability)
// - The file manifest is a set union across completions, so re-reported
//   paths are counted once
// - Plan validation returns every violation it finds, not just the first

pub mod error;
pub mod plan;
pub mod state;

pub use error::{Result, RouterError};
pub use plan::{StepSpec, WorkflowPlan};
pub use state::{
    ExecutionLogEntry, FileManifest, StepOutcome, WorkflowState, WorkflowStatus, WorkflowSummary,
};
