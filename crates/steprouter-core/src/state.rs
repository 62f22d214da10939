// Per-workflow state machine
//
// WorkflowState owns an immutable plan and tracks execution: the current
// pointer, the completed step set, the execution log, and the file manifest.
// The machine has two states, in_progress and the terminal complete.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Result, RouterError};
use crate::plan::{StepSpec, WorkflowPlan};

/// Workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    InProgress,
    Complete,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorkflowStatus::InProgress => write!(f, "in_progress"),
            WorkflowStatus::Complete => write!(f, "complete"),
        }
    }
}

/// One accepted step completion, in completion order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ExecutionLogEntry {
    pub step: u32,
    pub agent_role: String,
    pub instruction: String,
    pub completed_at: DateTime<Utc>,
    pub files_created: Vec<String>,
    pub files_modified: Vec<String>,
    pub status: String,
}

/// Accumulated set of file paths reported across all completed steps.
///
/// Sets, not lists: a path reported by several steps counts once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct FileManifest {
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub created: BTreeSet<String>,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub modified: BTreeSet<String>,
}

impl FileManifest {
    fn record(&mut self, created: &[String], modified: &[String]) {
        self.created.extend(created.iter().cloned());
        self.modified.extend(modified.iter().cloned());
    }
}

/// Aggregate statistics reported on the transition to complete
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WorkflowSummary {
    pub total_steps_completed: usize,
    pub files_created: usize,
    pub files_modified: usize,
    /// Distinct agent roles in order of first appearance
    pub agents_used: Vec<String>,
}

/// Result of recording a completion: hand out the next step, or finish
#[derive(Debug, Clone)]
pub enum StepOutcome {
    Continue(StepSpec),
    Complete(WorkflowSummary),
}

/// The state machine for one workflow instance
#[derive(Debug)]
pub struct WorkflowState {
    plan: WorkflowPlan,
    completed: BTreeSet<u32>,
    log: Vec<ExecutionLogEntry>,
    manifest: FileManifest,
    status: WorkflowStatus,
}

impl WorkflowState {
    /// Create a fresh state for a validated plan.
    ///
    /// An empty plan has nothing to execute and is complete at construction;
    /// wire-level validation rejects zero-step plans before this point.
    pub fn new(plan: WorkflowPlan) -> Self {
        let status = if plan.steps.is_empty() {
            WorkflowStatus::Complete
        } else {
            WorkflowStatus::InProgress
        };
        Self {
            plan,
            completed: BTreeSet::new(),
            log: Vec::new(),
            manifest: FileManifest::default(),
            status,
        }
    }

    pub fn plan(&self) -> &WorkflowPlan {
        &self.plan
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn total_steps(&self) -> u32 {
        self.plan.total_steps
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn execution_log(&self) -> &[ExecutionLogEntry] {
        &self.log
    }

    pub fn manifest(&self) -> &FileManifest {
        &self.manifest
    }

    /// The step number expected to be reported complete next, or None once
    /// every step is done
    pub fn current_pointer(&self) -> Option<u32> {
        (1..=self.plan.total_steps).find(|n| !self.completed.contains(n))
    }

    /// The StepSpec at the current pointer
    pub fn current_step(&self) -> Option<&StepSpec> {
        self.current_pointer().and_then(|n| self.plan.step(n))
    }

    /// Record a completion report for the current step.
    ///
    /// Rejections leave the state untouched: the pointer, log, and manifest
    /// only change on an accepted report.
    pub fn record_completion(
        &mut self,
        step_number: u32,
        agent_role: &str,
        task: &str,
        files_created: Vec<String>,
        files_modified: Vec<String>,
    ) -> Result<StepOutcome> {
        if self.status == WorkflowStatus::Complete {
            return Err(RouterError::WorkflowAlreadyComplete(
                self.plan.workflow_id.clone(),
            ));
        }

        let expected = match self.current_pointer() {
            Some(n) => n,
            None => {
                return Err(RouterError::WorkflowAlreadyComplete(
                    self.plan.workflow_id.clone(),
                ))
            }
        };
        if step_number != expected {
            return Err(RouterError::StepOutOfOrder {
                expected,
                received: step_number,
            });
        }

        // Absent only if the plan skipped validation and has a numbering gap
        let spec = self.plan.step(step_number).ok_or_else(|| {
            RouterError::PlanValidation(vec![format!(
                "step number {step_number} is missing from the plan"
            )])
        })?;
        if spec.agent_role != agent_role {
            return Err(RouterError::AgentMismatch {
                step: step_number,
                expected: spec.agent_role.clone(),
                received: agent_role.to_string(),
            });
        }

        self.manifest.record(&files_created, &files_modified);
        self.log.push(ExecutionLogEntry {
            step: step_number,
            agent_role: agent_role.to_string(),
            instruction: task.to_string(),
            completed_at: Utc::now(),
            files_created,
            files_modified,
            status: "completed".to_string(),
        });
        self.completed.insert(step_number);

        match self.current_step() {
            Some(next) => Ok(StepOutcome::Continue(next.clone())),
            None => {
                self.status = WorkflowStatus::Complete;
                Ok(StepOutcome::Complete(self.summary()))
            }
        }
    }

    /// Aggregate statistics over the execution log and manifest
    pub fn summary(&self) -> WorkflowSummary {
        let mut agents_used: Vec<String> = Vec::new();
        for entry in &self.log {
            if !agents_used.contains(&entry.agent_role) {
                agents_used.push(entry.agent_role.clone());
            }
        }
        WorkflowSummary {
            total_steps_completed: self.completed.len(),
            files_created: self.manifest.created.len(),
            files_modified: self.manifest.modified.len(),
            agents_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(step: u32, agent_role: &str) -> StepSpec {
        StepSpec {
            step,
            agent_role: agent_role.to_string(),
            policy: "File Ops Policy".to_string(),
            instruction: format!("do step {step}"),
            details: vec![],
        }
    }

    fn two_step_state() -> WorkflowState {
        WorkflowState::new(WorkflowPlan {
            workflow_id: "wf-1".to_string(),
            original_goal: "build a site".to_string(),
            total_steps: 2,
            steps: vec![spec(1, "FileCreator"), spec(2, "GitWorkflow")],
        })
    }

    fn complete_step(state: &mut WorkflowState, step: u32, agent: &str) -> Result<StepOutcome> {
        state.record_completion(step, agent, "done", vec![], vec![])
    }

    #[test]
    fn fresh_state_points_at_step_one() {
        let state = two_step_state();
        assert_eq!(state.status(), WorkflowStatus::InProgress);
        assert_eq!(state.current_pointer(), Some(1));
        assert_eq!(state.current_step().unwrap().agent_role, "FileCreator");
    }

    #[test]
    fn completing_all_steps_in_order_finishes_the_workflow() {
        let mut state = two_step_state();

        match complete_step(&mut state, 1, "FileCreator").unwrap() {
            StepOutcome::Continue(next) => {
                assert_eq!(next.step, 2);
                assert_eq!(next.agent_role, "GitWorkflow");
            }
            other => panic!("expected Continue, got {other:?}"),
        }
        assert_eq!(state.current_pointer(), Some(2));
        assert_eq!(state.completed_count(), 1);

        match complete_step(&mut state, 2, "GitWorkflow").unwrap() {
            StepOutcome::Complete(summary) => {
                assert_eq!(summary.total_steps_completed, 2);
                assert_eq!(summary.agents_used, vec!["FileCreator", "GitWorkflow"]);
            }
            other => panic!("expected Complete, got {other:?}"),
        }
        assert_eq!(state.status(), WorkflowStatus::Complete);
        assert_eq!(state.current_pointer(), None);
        assert_eq!(state.execution_log().len(), 2);
        assert_eq!(state.execution_log()[0].step, 1);
        assert_eq!(state.execution_log()[1].step, 2);
    }

    #[test]
    fn out_of_order_completion_is_rejected_without_mutation() {
        let mut state = two_step_state();
        complete_step(&mut state, 1, "FileCreator").unwrap();

        // pointer is 2; reporting step 3 (or 1 again) must not move it
        let err = complete_step(&mut state, 3, "GitWorkflow").unwrap_err();
        assert_eq!(
            err,
            RouterError::StepOutOfOrder {
                expected: 2,
                received: 3
            }
        );
        assert_eq!(state.current_pointer(), Some(2));
        assert_eq!(state.execution_log().len(), 1);
    }

    #[test]
    fn repeated_completion_of_an_accepted_step_is_rejected() {
        let mut state = two_step_state();
        complete_step(&mut state, 1, "FileCreator").unwrap();

        let err = complete_step(&mut state, 1, "FileCreator").unwrap_err();
        assert_eq!(
            err,
            RouterError::StepOutOfOrder {
                expected: 2,
                received: 1
            }
        );
        assert_eq!(state.completed_count(), 1);
    }

    #[test]
    fn agent_mismatch_is_rejected() {
        let mut state = two_step_state();
        let err = complete_step(&mut state, 1, "GitWorkflow").unwrap_err();
        assert_eq!(
            err,
            RouterError::AgentMismatch {
                step: 1,
                expected: "FileCreator".to_string(),
                received: "GitWorkflow".to_string(),
            }
        );
        assert_eq!(state.execution_log().len(), 0);
        assert_eq!(state.current_pointer(), Some(1));
    }

    #[test]
    fn completion_after_terminal_state_is_rejected() {
        let mut state = two_step_state();
        complete_step(&mut state, 1, "FileCreator").unwrap();
        complete_step(&mut state, 2, "GitWorkflow").unwrap();

        let err = complete_step(&mut state, 2, "GitWorkflow").unwrap_err();
        assert_eq!(
            err,
            RouterError::WorkflowAlreadyComplete("wf-1".to_string())
        );
    }

    #[test]
    fn file_manifest_is_a_set_union() {
        let mut state = two_step_state();
        state
            .record_completion(
                1,
                "FileCreator",
                "created index",
                vec!["x.html".to_string()],
                vec![],
            )
            .unwrap();
        let outcome = state
            .record_completion(
                2,
                "GitWorkflow",
                "committed",
                vec!["x.html".to_string(), "y.css".to_string()],
                vec!["x.html".to_string()],
            )
            .unwrap();

        match outcome {
            StepOutcome::Complete(summary) => {
                assert_eq!(summary.files_created, 2);
                assert_eq!(summary.files_modified, 1);
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }

    #[test]
    fn empty_plan_is_complete_at_construction() {
        let state = WorkflowState::new(WorkflowPlan {
            workflow_id: "wf-empty".to_string(),
            original_goal: String::new(),
            total_steps: 0,
            steps: vec![],
        });
        assert_eq!(state.status(), WorkflowStatus::Complete);
        assert_eq!(state.current_pointer(), None);
    }

    #[test]
    fn duplicate_agents_counted_once_in_summary() {
        let mut state = WorkflowState::new(WorkflowPlan {
            workflow_id: "wf-3".to_string(),
            original_goal: String::new(),
            total_steps: 3,
            steps: vec![
                spec(1, "FileCreator"),
                spec(2, "FileCreator"),
                spec(3, "GitWorkflow"),
            ],
        });
        complete_step(&mut state, 1, "FileCreator").unwrap();
        complete_step(&mut state, 2, "FileCreator").unwrap();
        match complete_step(&mut state, 3, "GitWorkflow").unwrap() {
            StepOutcome::Complete(summary) => {
                assert_eq!(summary.agents_used, vec!["FileCreator", "GitWorkflow"]);
                assert_eq!(summary.total_steps_completed, 3);
            }
            other => panic!("expected Complete, got {other:?}"),
        }
    }
}
