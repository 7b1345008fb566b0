// ABOUTME: Task execution result types and run report aggregation
// ABOUTME: Records per-node status and timing for one graph execution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::outcome::Outcome;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Full,
    DependenciesOnly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task: String,
    pub status: TaskStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: String,
    pub target: String,
    pub mode: RunMode,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub tasks: Vec<TaskResult>,
    pub outcome: Outcome<()>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub total_tasks: usize,
    pub successful_tasks: usize,
    pub failed_tasks: usize,
    pub skipped_tasks: usize,
}

impl TaskResult {
    pub fn new(task: String) -> Self {
        Self {
            task,
            status: TaskStatus::Pending,
            start_time: None,
            end_time: None,
            duration: None,
            error: None,
        }
    }

    pub fn mark_started(&mut self) {
        self.status = TaskStatus::Running;
        self.start_time = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, status: TaskStatus, error: Option<String>) {
        let now = Utc::now();
        self.status = status;
        self.end_time = Some(now);
        self.duration = self
            .start_time
            .map(|start| (now - start).to_std().unwrap_or(Duration::ZERO));
        self.error = error;
    }

    pub fn is_successful(&self) -> bool {
        self.status == TaskStatus::Success
    }

    pub fn is_finished(&self) -> bool {
        !matches!(self.status, TaskStatus::Pending | TaskStatus::Running)
    }
}

impl RunReport {
    pub fn new(run_id: String, target: String, mode: RunMode) -> Self {
        Self {
            run_id,
            target,
            mode,
            start_time: Utc::now(),
            end_time: None,
            duration: None,
            tasks: Vec::new(),
            outcome: Ok(()),
        }
    }

    pub fn add_task_result(&mut self, result: TaskResult) {
        self.tasks.push(result);
    }

    pub fn mark_completed(&mut self, outcome: Outcome<()>) {
        let now = Utc::now();
        self.end_time = Some(now);
        self.duration = Some((now - self.start_time).to_std().unwrap_or(Duration::ZERO));
        self.outcome = outcome;
    }

    pub fn get_task_result(&self, task: &str) -> Option<&TaskResult> {
        self.tasks.iter().find(|t| t.task == task)
    }

    pub fn is_successful(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn summary(&self) -> RunSummary {
        let count = |status: TaskStatus| self.tasks.iter().filter(|t| t.status == status).count();
        RunSummary {
            total_tasks: self.tasks.len(),
            successful_tasks: count(TaskStatus::Success),
            failed_tasks: count(TaskStatus::Failed),
            skipped_tasks: count(TaskStatus::Skipped),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Success => write!(f, "success"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Skipped => write!(f, "skipped"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::Failure;

    #[test]
    fn test_task_result_lifecycle() {
        let mut result = TaskResult::new("compile".to_string());

        assert_eq!(result.status, TaskStatus::Pending);
        assert!(!result.is_finished());

        result.mark_started();
        assert_eq!(result.status, TaskStatus::Running);
        assert!(result.start_time.is_some());

        result.mark_completed(TaskStatus::Success, None);
        assert!(result.is_finished());
        assert!(result.is_successful());
        assert!(result.duration.is_some());
    }

    #[test]
    fn test_skipped_result_has_no_duration() {
        let mut result = TaskResult::new("package".to_string());
        result.mark_completed(TaskStatus::Skipped, None);

        assert!(result.is_finished());
        assert!(result.duration.is_none());
    }

    #[test]
    fn test_report_summary() {
        let mut report = RunReport::new("run".into(), "package".into(), RunMode::Full);

        let mut ok = TaskResult::new("compile".into());
        ok.mark_started();
        ok.mark_completed(TaskStatus::Success, None);

        let mut failed = TaskResult::new("test".into());
        failed.mark_started();
        failed.mark_completed(TaskStatus::Failed, Some("boom".into()));

        let mut skipped = TaskResult::new("package".into());
        skipped.mark_completed(TaskStatus::Skipped, None);

        report.add_task_result(ok);
        report.add_task_result(failed);
        report.add_task_result(skipped);
        report.mark_completed(Err(Failure::new("boom")));

        assert!(!report.is_successful());
        assert_eq!(
            report.summary(),
            RunSummary {
                total_tasks: 3,
                successful_tasks: 1,
                failed_tasks: 1,
                skipped_tasks: 1,
            }
        );
        assert_eq!(
            report.get_task_result("test").unwrap().error.as_deref(),
            Some("boom")
        );
    }
}
