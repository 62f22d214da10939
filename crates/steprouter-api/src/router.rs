// StepRouter dispatch service
//
// Validates inbound requests, advances workflow state, and selects the
// next-step payload or the completion summary. Journal writes happen after
// the state mutation commits and are never allowed to fail the response.

use std::sync::Arc;

use chrono::Utc;

use steprouter_core::{Result, RouterError, StepOutcome, WorkflowPlan};
use steprouter_storage::{Journal, WorkflowStore};

use crate::protocol::{
    CompleteResponse, ContinueResponse, HealthResponse, InitializeRequest, InitializedResponse,
    StatusResponse, StepCompletionRequest, StepCompletionResponse,
};

/// Request validation and dispatch over the workflow store
#[derive(Clone)]
pub struct StepRouter {
    store: WorkflowStore,
    journal: Arc<Journal>,
    max_steps: u32,
    require_rule_ack: bool,
}

impl StepRouter {
    pub fn new(
        store: WorkflowStore,
        journal: Arc<Journal>,
        max_steps: u32,
        require_rule_ack: bool,
    ) -> Self {
        Self {
            store,
            journal,
            max_steps,
            require_rule_ack,
        }
    }

    /// Validate a plan submission, create the workflow, return the first step
    pub async fn initialize(&self, req: InitializeRequest) -> Result<InitializedResponse> {
        let plan = WorkflowPlan {
            workflow_id: req.workflow_id,
            original_goal: req.original_goal,
            total_steps: req.total_steps,
            steps: req.steps,
        };
        plan.validate()?;

        // Cap check happens before any state is created
        if plan.total_steps > self.max_steps {
            return Err(RouterError::MaxStepsExceeded {
                requested: plan.total_steps,
                cap: self.max_steps,
            });
        }

        let first = plan
            .step(1)
            .cloned()
            .ok_or_else(|| RouterError::plan(vec!["plan has no first step".to_string()]))?;

        self.store.create(plan.clone()).await?;
        tracing::info!(
            workflow_id = %plan.workflow_id,
            total_steps = plan.total_steps,
            "workflow initialized"
        );
        if let Err(e) = self.journal.log_init(&plan) {
            tracing::warn!(error = %e, "journal append failed for init event");
        }

        Ok(InitializedResponse {
            status: "initialized".to_string(),
            workflow_id: plan.workflow_id,
            next_step_number: first.step,
            total_steps: plan.total_steps,
            agent_role: first.agent_role,
            instruction: first.instruction,
        })
    }

    /// Record a step completion, return the next step or the final summary
    pub async fn complete_step(
        &self,
        req: StepCompletionRequest,
    ) -> Result<StepCompletionResponse> {
        let workflow = self.store.get(&req.workflow_id).await?;
        let mut state = workflow.lock().await;

        // The gate applies only to the step the pointer expects; ordering
        // and terminal-state conflicts are reported by record_completion
        if self.require_rule_ack && state.current_pointer() == Some(req.step_number) {
            // The expected acknowledgment is the plan step's declared policy
            if let Some(spec) = state.plan().step(req.step_number) {
                if req.rules_acknowledged.as_deref() != Some(spec.policy.as_str()) {
                    return Err(RouterError::RuleAckMissing {
                        step: req.step_number,
                        expected: spec.policy.clone(),
                    });
                }
            }
        }

        let outcome = state.record_completion(
            req.step_number,
            &req.completed_agent_role,
            &req.completed_task,
            req.files_created,
            req.files_modified,
        )?;

        tracing::info!(
            workflow_id = %req.workflow_id,
            step = req.step_number,
            agent = %req.completed_agent_role,
            "step completed"
        );
        if let Err(e) = self.journal.log_step(
            &req.workflow_id,
            req.step_number,
            &req.completed_agent_role,
            &req.completed_task,
        ) {
            tracing::warn!(error = %e, "journal append failed for step event");
        }

        match outcome {
            StepOutcome::Continue(next) => Ok(StepCompletionResponse::Continue(ContinueResponse {
                status: "continue".to_string(),
                workflow_id: req.workflow_id,
                next_step_number: next.step,
                total_steps: state.total_steps(),
                agent_role: next.agent_role,
                policy: next.policy,
                instruction: next.instruction,
                context: format!("Step {} of {}", next.step, state.total_steps()),
            })),
            StepOutcome::Complete(summary) => {
                tracing::info!(workflow_id = %req.workflow_id, "workflow complete");
                if let Err(e) = self.journal.log_done(&req.workflow_id, &summary) {
                    tracing::warn!(error = %e, "journal append failed for done event");
                }
                Ok(StepCompletionResponse::Complete(CompleteResponse {
                    status: "complete".to_string(),
                    workflow_id: req.workflow_id.clone(),
                    message: format!("Workflow {} completed successfully.", req.workflow_id),
                    execution_log: state.execution_log().to_vec(),
                    summary,
                }))
            }
        }
    }

    /// Read-only progress snapshot
    pub async fn status(&self, workflow_id: &str) -> Result<StatusResponse> {
        let workflow = self.store.get(workflow_id).await?;
        let state = workflow.lock().await;
        Ok(StatusResponse {
            workflow_id: workflow_id.to_string(),
            status: state.status(),
            next_step_number: state.current_pointer(),
            total_steps: state.total_steps(),
            completed_steps: state.completed_count(),
            execution_log: state.execution_log().to_vec(),
            file_manifest: state.manifest().clone(),
        })
    }

    /// Process liveness plus count of non-complete workflows
    pub async fn health(&self) -> HealthResponse {
        HealthResponse {
            ok: true,
            timestamp: Utc::now(),
            active_workflow_count: self.store.active_count().await,
        }
    }
}
