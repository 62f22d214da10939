// Workflow plan domain types
//
// A plan is immutable after initialization: the ordered step list, the
// declared total, and the original goal never change once a workflow exists.

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::error::{Result, RouterError};

/// One unit of work with a designated agent role and free-text instruction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct StepSpec {
    /// Step number, 1-indexed and unique within the plan
    pub step: u32,
    /// Agent role expected to execute this step (open set, e.g. "FileCreator")
    pub agent_role: String,
    /// Policy name governing the step. Informational.
    pub policy: String,
    /// Free-text instruction for the agent
    pub instruction: String,
    /// Ordered detail strings elaborating the instruction
    #[serde(default)]
    pub details: Vec<String>,
}

/// Complete, ordered plan of steps for one workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WorkflowPlan {
    pub workflow_id: String,
    pub original_goal: String,
    pub total_steps: u32,
    pub steps: Vec<StepSpec>,
}

impl WorkflowPlan {
    /// Validate internal consistency, collecting every violation found.
    ///
    /// Step numbers must form exactly the set {1..total_steps}; array
    /// position is never trusted.
    pub fn validate(&self) -> Result<()> {
        let mut violations = Vec::new();

        if self.workflow_id.trim().is_empty() {
            violations.push("workflow_id must be a non-empty string".to_string());
        }

        if self.total_steps == 0 {
            violations.push("total_steps must be a positive integer".to_string());
        }

        if self.total_steps as usize != self.steps.len() {
            violations.push(format!(
                "total_steps is {} but {} steps were provided",
                self.total_steps,
                self.steps.len()
            ));
        }

        let mut seen = std::collections::BTreeSet::new();
        for spec in &self.steps {
            if spec.step == 0 || spec.step > self.total_steps {
                violations.push(format!(
                    "step number {} is outside the declared range 1..={}",
                    spec.step, self.total_steps
                ));
            }
            if !seen.insert(spec.step) {
                violations.push(format!("step number {} appears more than once", spec.step));
            }
            if spec.agent_role.trim().is_empty() {
                violations.push(format!("step {} is missing an agent_role", spec.step));
            }
            if spec.instruction.trim().is_empty() {
                violations.push(format!("step {} is missing an instruction", spec.step));
            }
        }

        // Only meaningful when counts and ranges already line up
        if violations.is_empty() {
            for expected in 1..=self.total_steps {
                if !seen.contains(&expected) {
                    violations.push(format!("step number {expected} is missing from the plan"));
                }
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(RouterError::plan(violations))
        }
    }

    /// Look up a step by number
    pub fn step(&self, number: u32) -> Option<&StepSpec> {
        self.steps.iter().find(|s| s.step == number)
    }
}
