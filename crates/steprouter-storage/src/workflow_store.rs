// In-memory workflow store
//
// Single source of truth for "does this workflow exist". The outer RwLock
// guards map mutation only; each workflow carries its own Mutex so that
// concurrent completion reports for the same workflow are serialized without
// blocking unrelated workflows.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use steprouter_core::{Result, RouterError, WorkflowPlan, WorkflowState, WorkflowStatus};

/// Shared handle to one workflow's state
pub type SharedWorkflow = Arc<Mutex<WorkflowState>>;

/// In-memory mapping from workflow id to WorkflowState.
///
/// There is no deletion: workflows accumulate for the process lifetime.
#[derive(Debug, Default, Clone)]
pub struct WorkflowStore {
    workflows: Arc<RwLock<HashMap<String, SharedWorkflow>>>,
}

impl WorkflowStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            workflows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a workflow from a validated plan.
    ///
    /// Fails if the id is already present; re-initialization never
    /// overwrites an existing execution log.
    pub async fn create(&self, plan: WorkflowPlan) -> Result<SharedWorkflow> {
        let mut workflows = self.workflows.write().await;
        if workflows.contains_key(&plan.workflow_id) {
            return Err(RouterError::duplicate(plan.workflow_id));
        }
        let id = plan.workflow_id.clone();
        let state = Arc::new(Mutex::new(WorkflowState::new(plan)));
        workflows.insert(id, state.clone());
        Ok(state)
    }

    /// Look up a workflow by id
    pub async fn get(&self, workflow_id: &str) -> Result<SharedWorkflow> {
        self.workflows
            .read()
            .await
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| RouterError::unknown(workflow_id))
    }

    /// Number of workflows that have not reached the terminal state
    pub async fn active_count(&self) -> usize {
        let workflows: Vec<SharedWorkflow> =
            self.workflows.read().await.values().cloned().collect();
        let mut active = 0;
        for workflow in workflows {
            if workflow.lock().await.status() == WorkflowStatus::InProgress {
                active += 1;
            }
        }
        active
    }

    /// Total number of workflows ever initialized in this process
    pub async fn len(&self) -> usize {
        self.workflows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.workflows.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steprouter_core::StepSpec;

    fn plan(id: &str) -> WorkflowPlan {
        WorkflowPlan {
            workflow_id: id.to_string(),
            original_goal: "goal".to_string(),
            total_steps: 1,
            steps: vec![StepSpec {
                step: 1,
                agent_role: "FileCreator".to_string(),
                policy: "File Ops Policy".to_string(),
                instruction: "create files".to_string(),
                details: vec![],
            }],
        }
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = WorkflowStore::new();
        assert!(store.is_empty().await);
        store.create(plan("wf-1")).await.unwrap();

        let workflow = store.get("wf-1").await.unwrap();
        assert_eq!(workflow.lock().await.plan().workflow_id, "wf-1");
        assert_eq!(store.len().await, 1);
        assert!(!store.is_empty().await);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = WorkflowStore::new();
        store.create(plan("wf-1")).await.unwrap();

        let err = store.create(plan("wf-1")).await.unwrap_err();
        assert_eq!(err, RouterError::DuplicateWorkflow("wf-1".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_workflow_is_rejected() {
        let store = WorkflowStore::new();
        let err = store.get("nonexistent").await.unwrap_err();
        assert_eq!(err, RouterError::UnknownWorkflow("nonexistent".to_string()));
    }

    #[tokio::test]
    async fn active_count_excludes_completed_workflows() {
        let store = WorkflowStore::new();
        store.create(plan("wf-1")).await.unwrap();
        store.create(plan("wf-2")).await.unwrap();
        assert_eq!(store.active_count().await, 2);

        let workflow = store.get("wf-1").await.unwrap();
        workflow
            .lock()
            .await
            .record_completion(1, "FileCreator", "done", vec![], vec![])
            .unwrap();

        assert_eq!(store.active_count().await, 1);
        assert_eq!(store.len().await, 2);
    }
}
