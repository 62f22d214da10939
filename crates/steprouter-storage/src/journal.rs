// Append-only journal sinks
//
// Three files under one log directory, written for downstream tailing and
// never read back by the router:
// - router_log.jsonl  one JSON object per event (init/step/done)
// - build-summary.md  timestamped narrative bullet per step, summary blocks
// - CHANGELOG.md      one block per completed workflow
//
// Every append opens the file in append mode, writes complete lines, and
// flushes before returning, so concurrent tails only ever see whole lines.
// A process-wide mutex prevents interleaving between writers.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use steprouter_core::{WorkflowPlan, WorkflowSummary};

pub const JSONL_FILE: &str = "router_log.jsonl";
pub const NARRATIVE_FILE: &str = "build-summary.md";
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";

/// Structured journal event, serialized as one JSON object per line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JournalEvent {
    Init {
        ts: String,
        workflow_id: String,
        total_steps: u32,
        original_goal: String,
    },
    Step {
        ts: String,
        workflow_id: String,
        step: u32,
        agent: String,
        instruction: String,
    },
    Done {
        ts: String,
        workflow_id: String,
        summary: WorkflowSummary,
    },
}

/// Append-only writers rooted at one log directory.
///
/// Callers treat every method as best-effort: a failed append is reported
/// through the returned error and must never roll back workflow state.
#[derive(Debug)]
pub struct Journal {
    log_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl Journal {
    /// Open a journal, creating the log directory if needed
    pub fn new(log_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let log_dir = log_dir.into();
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Record a successful initialization: one JSONL event plus one
    /// narrative line
    pub fn log_init(&self, plan: &WorkflowPlan) -> io::Result<()> {
        let ts = timestamp();
        self.append_event(&JournalEvent::Init {
            ts: ts.clone(),
            workflow_id: plan.workflow_id.clone(),
            total_steps: plan.total_steps,
            original_goal: plan.original_goal.clone(),
        })?;
        self.append(
            NARRATIVE_FILE,
            &format!(
                "- {ts} \u{2022} `{}` \u{2022} **Router** \u{2192} workflow initialized with {} steps\n",
                plan.workflow_id, plan.total_steps
            ),
        )
    }

    /// Record an accepted step completion
    pub fn log_step(
        &self,
        workflow_id: &str,
        step: u32,
        agent: &str,
        instruction: &str,
    ) -> io::Result<()> {
        let ts = timestamp();
        self.append_event(&JournalEvent::Step {
            ts: ts.clone(),
            workflow_id: workflow_id.to_string(),
            step,
            agent: agent.to_string(),
            instruction: instruction.to_string(),
        })?;
        self.append(
            NARRATIVE_FILE,
            &format!("- {ts} \u{2022} `{workflow_id}` \u{2022} **{agent}** \u{2192} {instruction}\n"),
        )
    }

    /// Record a workflow reaching its terminal state: one JSONL event, a
    /// narrative summary block, and a changelog entry
    pub fn log_done(&self, workflow_id: &str, summary: &WorkflowSummary) -> io::Result<()> {
        let ts = timestamp();
        let line = summary_line(summary);
        self.append_event(&JournalEvent::Done {
            ts: ts.clone(),
            workflow_id: workflow_id.to_string(),
            summary: summary.clone(),
        })?;
        self.append(
            NARRATIVE_FILE,
            &format!("\n### {ts} \u{2014} Final Summary ({workflow_id})\n{line}\n\n"),
        )?;
        self.append(
            CHANGELOG_FILE,
            &format!("## {ts} \u{2014} Workflow {workflow_id} Completed\n{line}\n\n"),
        )
    }

    fn append_event(&self, event: &JournalEvent) -> io::Result<()> {
        let json = serde_json::to_string(event).map_err(io::Error::other)?;
        self.append(JSONL_FILE, &format!("{json}\n"))
    }

    fn append(&self, file: &str, content: &str) -> io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_dir.join(file))?;
        f.write_all(content.as_bytes())?;
        f.flush()
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn summary_line(summary: &WorkflowSummary) -> String {
    format!(
        "{} steps completed \u{2022} {} files created \u{2022} {} files modified \u{2022} agents: {}",
        summary.total_steps_completed,
        summary.files_created,
        summary.files_modified,
        summary.agents_used.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use steprouter_core::StepSpec;
    use tempfile::TempDir;

    fn sample_plan() -> WorkflowPlan {
        WorkflowPlan {
            workflow_id: "wf-1".to_string(),
            original_goal: "build a site".to_string(),
            total_steps: 2,
            steps: vec![
                StepSpec {
                    step: 1,
                    agent_role: "FileCreator".to_string(),
                    policy: "File Ops Policy".to_string(),
                    instruction: "create index.html".to_string(),
                    details: vec![],
                },
                StepSpec {
                    step: 2,
                    agent_role: "GitWorkflow".to_string(),
                    policy: "Safe Git Policy".to_string(),
                    instruction: "commit the site".to_string(),
                    details: vec![],
                },
            ],
        }
    }

    fn sample_summary() -> WorkflowSummary {
        WorkflowSummary {
            total_steps_completed: 2,
            files_created: 1,
            files_modified: 0,
            agents_used: vec!["FileCreator".to_string(), "GitWorkflow".to_string()],
        }
    }

    #[test]
    fn jsonl_events_are_one_parseable_object_per_line() {
        let dir = TempDir::new().unwrap();
        let journal = Journal::new(dir.path()).unwrap();

        journal.log_init(&sample_plan()).unwrap();
        journal
            .log_step("wf-1", 1, "FileCreator", "create index.html")
            .unwrap();
        journal.log_done("wf-1", &sample_summary()).unwrap();

        let jsonl = fs::read_to_string(dir.path().join(JSONL_FILE)).unwrap();
        let lines: Vec<&str> = jsonl.lines().collect();
        assert_eq!(lines.len(), 3);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "init");
        assert_eq!(first["workflow_id"], "wf-1");
        assert_eq!(first["total_steps"], 2);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "step");
        assert_eq!(second["step"], 1);
        assert_eq!(second["agent"], "FileCreator");

        let third: serde_json::Value = serde_json::from_str(lines[2]).unwrap();
        assert_eq!(third["type"], "done");
        assert_eq!(third["summary"]["total_steps_completed"], 2);
    }

    #[test]
    fn narrative_lines_follow_completion_order() {
        let dir = TempDir::new().unwrap();
        let journal = Journal::new(dir.path()).unwrap();

        journal.log_init(&sample_plan()).unwrap();
        journal
            .log_step("wf-1", 1, "FileCreator", "create index.html")
            .unwrap();
        journal
            .log_step("wf-1", 2, "GitWorkflow", "commit the site")
            .unwrap();

        let narrative = fs::read_to_string(dir.path().join(NARRATIVE_FILE)).unwrap();
        let creator = narrative.find("FileCreator").unwrap();
        let git = narrative.find("GitWorkflow").unwrap();
        assert!(creator < git);
        assert!(narrative.contains("create index.html"));
    }

    #[test]
    fn completion_appends_a_changelog_block() {
        let dir = TempDir::new().unwrap();
        let journal = Journal::new(dir.path()).unwrap();

        journal.log_done("wf-1", &sample_summary()).unwrap();

        let changelog = fs::read_to_string(dir.path().join(CHANGELOG_FILE)).unwrap();
        assert!(changelog.contains("Workflow wf-1 Completed"));
        assert!(changelog.contains("2 steps completed"));
        assert!(changelog.contains("agents: FileCreator, GitWorkflow"));
    }

    #[test]
    fn missing_log_dir_is_created_on_open() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("logs").join("router");
        let journal = Journal::new(&nested).unwrap();
        assert_eq!(journal.log_dir(), nested.as_path());
        journal.log_done("wf-1", &sample_summary()).unwrap();
        assert!(nested.join(CHANGELOG_FILE).exists());
    }
}
