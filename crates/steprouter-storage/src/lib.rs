// Process-scoped storage for the step router
//
// This crate provides the two stateful collaborators of the HTTP layer:
// - WorkflowStore: the in-memory map of workflow id -> WorkflowState
// - Journal: append-only JSONL / markdown sinks for downstream observability
//
// Nothing here survives a process restart, by design.

pub mod journal;
pub mod workflow_store;

pub use journal::{Journal, JournalEvent};
pub use workflow_store::{SharedWorkflow, WorkflowStore};
