// ABOUTME: Output formatters for run reports and listings (JSON, text)
// ABOUTME: Handles serialization and presentation of task results and file sets

use serde_json::{json, Value as JsonValue};

use super::error::Result;
use crate::engine::{Project, RunReport, Runnable, TaskResult, TaskStatus};
use crate::parser::ValidationReport;
use crate::path::BuildPath;

pub trait OutputFormatter: Send + Sync {
    fn format_run_report(&self, report: &RunReport) -> Result<String>;

    fn format_task_list(&self, project: &Project) -> Result<String>;

    fn format_file_list(&self, fileset: &str, files: &[BuildPath]) -> Result<String>;

    fn format_validation(&self, build: &str, report: &ValidationReport) -> Result<String>;
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct TextFormatter;

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    pub fn new_pretty() -> Self {
        Self { pretty: true }
    }

    fn render(&self, value: &JsonValue) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    fn task_result_to_json(result: &TaskResult) -> JsonValue {
        json!({
            "task": result.task,
            "status": result.status,
            "start_time": result.start_time,
            "end_time": result.end_time,
            "duration_ms": result.duration.map(|d| d.as_millis() as u64),
            "error": result.error,
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_run_report(&self, report: &RunReport) -> Result<String> {
        let summary = report.summary();
        let value = json!({
            "run_id": report.run_id,
            "target": report.target,
            "mode": report.mode,
            "start_time": report.start_time,
            "end_time": report.end_time,
            "duration_ms": report.duration.map(|d| d.as_millis() as u64),
            "success": report.is_successful(),
            "error": report.outcome.as_ref().err().map(|f| f.message()),
            "summary": summary,
            "tasks": report.tasks.iter().map(Self::task_result_to_json).collect::<Vec<_>>(),
        });
        self.render(&value)
    }

    fn format_task_list(&self, project: &Project) -> Result<String> {
        let tasks: Vec<JsonValue> = project
            .tasks
            .values()
            .map(|task| {
                let (interactive, parameters, dependencies) = match &task.runnable {
                    Runnable::Plain(node) => (
                        node.is_interactive(),
                        Vec::new(),
                        node.dependencies().iter().map(|d| d.label()).collect::<Vec<_>>(),
                    ),
                    Runnable::Parameterized(node) => (
                        false,
                        node.parameters().to_vec(),
                        node.dependencies().iter().map(|d| d.label()).collect::<Vec<_>>(),
                    ),
                };
                json!({
                    "name": task.name,
                    "type": task.task_type,
                    "description": task.summary,
                    "interactive": interactive,
                    "parameters": parameters,
                    "depends_on": dependencies,
                })
            })
            .collect();

        self.render(&json!({
            "project": project.name,
            "root": project.root.absolute(),
            "filesets": project.filesets.keys().collect::<Vec<_>>(),
            "tasks": tasks,
        }))
    }

    fn format_file_list(&self, fileset: &str, files: &[BuildPath]) -> Result<String> {
        let files: Vec<JsonValue> = files
            .iter()
            .map(|path| {
                json!({
                    "path": path.absolute(),
                    "relative": path.relative_path(),
                })
            })
            .collect();
        self.render(&json!({ "fileset": fileset, "files": files }))
    }

    fn format_validation(&self, build: &str, report: &ValidationReport) -> Result<String> {
        self.render(&json!({
            "build": build,
            "valid": report.is_valid,
            "errors": report.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>(),
            "warnings": report.warnings,
        }))
    }
}

impl TextFormatter {
    pub fn new() -> Self {
        Self
    }

    fn status_icon(status: TaskStatus) -> &'static str {
        match status {
            TaskStatus::Success => "✓",
            TaskStatus::Failed => "✗",
            TaskStatus::Skipped => "⊘",
            TaskStatus::Pending => "⧖",
            TaskStatus::Running => "⟳",
        }
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TextFormatter {
    fn format_run_report(&self, report: &RunReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("Run: {} ({})\n", report.target, report.run_id));
        for task in &report.tasks {
            output.push_str(&format!("  {} {}", Self::status_icon(task.status), task.task));
            if let Some(duration) = task.duration {
                output.push_str(&format!(" [{:.2}s]", duration.as_secs_f64()));
            }
            output.push('\n');
            if let Some(ref error) = task.error {
                output.push_str(&format!("    Error: {}\n", error));
            }
        }

        let summary = report.summary();
        output.push_str(&format!(
            "\n{} task(s): {} succeeded, {} failed, {} skipped\n",
            summary.total_tasks, summary.successful_tasks, summary.failed_tasks, summary.skipped_tasks
        ));
        match &report.outcome {
            Ok(()) => output.push_str("Status: success\n"),
            Err(failure) => output.push_str(&format!("Status: failed ({})\n", failure)),
        }

        Ok(output)
    }

    fn format_task_list(&self, project: &Project) -> Result<String> {
        let mut output = format!("Project: {}\n", project.name);
        if let Some(ref description) = project.description {
            output.push_str(&format!("  {}\n", description));
        }

        output.push_str("\nTasks:\n");
        let width = project.tasks.keys().map(|k| k.len()).max().unwrap_or(0);
        for task in project.tasks.values() {
            let mut line = format!("  {:width$}  {}", task.name, task.task_type, width = width);
            match &task.runnable {
                Runnable::Plain(node) if node.is_interactive() => line.push_str(" (interactive)"),
                Runnable::Parameterized(node) => {
                    line.push_str(&format!(" <{}>", node.parameters().join("|")))
                }
                Runnable::Plain(_) => {}
            }
            if let Some(ref summary) = task.summary {
                line.push_str(&format!(" - {}", summary));
            }
            output.push_str(&line);
            output.push('\n');
        }

        if !project.filesets.is_empty() {
            output.push_str("\nFile sets:\n");
            for name in project.filesets.keys() {
                output.push_str(&format!("  {}\n", name));
            }
        }

        Ok(output)
    }

    fn format_file_list(&self, _fileset: &str, files: &[BuildPath]) -> Result<String> {
        let mut output = String::new();
        for path in files {
            output.push_str(&path.relative_path());
            output.push('\n');
        }
        Ok(output)
    }

    fn format_validation(&self, build: &str, report: &ValidationReport) -> Result<String> {
        let mut output = String::new();
        if report.is_valid {
            output.push_str(&format!("✓ Build '{}' is valid\n", build));
        } else {
            output.push_str(&format!(
                "✗ Build '{}' has {} error(s)\n",
                build,
                report.errors.len()
            ));
            for error in &report.errors {
                output.push_str(&format!("  Error: {}\n", error));
            }
        }
        for warning in &report.warnings {
            output.push_str(&format!("  Warning: {}\n", warning));
        }
        Ok(output)
    }
}
