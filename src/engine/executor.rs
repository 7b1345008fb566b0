// ABOUTME: Sequential task graph executor driven by topological order
// ABOUTME: Traps each action once, stops at the first failure and records a run report

use tracing::{debug, error, info, instrument, warn};

use super::dependency::DependencyGraph;
use super::result::{RunMode, RunReport, TaskResult, TaskStatus};
use super::task::Task;
use crate::outcome::{self, Failure, Outcome};

/// Run `task` and everything it depends on.
pub fn run_tasks(task: &Task) -> Outcome<()> {
    run_with_report(task, RunMode::Full).outcome
}

/// Execute the dependency closure of `task` one node at a time.
///
/// Nodes after the first failure are recorded as skipped and never invoked.
#[instrument(skip(task), fields(target = %task.label()))]
pub fn run_with_report(task: &Task, mode: RunMode) -> RunReport {
    let run_id = uuid::Uuid::new_v4().to_string();
    let mut report = RunReport::new(run_id.clone(), task.label(), mode);

    let graph = DependencyGraph::for_task(task);
    let order = match graph.execution_order() {
        Ok(order) => order,
        Err(e) => {
            error!("Failed to plan {}: {}", task.label(), e);
            report.mark_completed(Err(Failure::with_context("planning", e)));
            return report;
        }
    };

    let planned: Vec<Task> = order
        .into_iter()
        .filter(|node| mode == RunMode::Full || !node.same_node(task))
        .collect();

    info!(
        "Running {} task(s) for {} (run_id: {})",
        planned.len(),
        task.label(),
        run_id
    );

    let mut failure: Option<Failure> = None;
    for (position, node) in planned.iter().enumerate() {
        let label = node.label();
        let mut result = TaskResult::new(label.clone());

        if failure.is_some() {
            result.mark_completed(TaskStatus::Skipped, None);
            report.add_task_result(result);
            continue;
        }

        debug!("Starting task {}/{}: {}", position + 1, planned.len(), label);
        result.mark_started();

        // Faults are trapped here; a failure the action reports itself passes
        // through untouched.
        let context = format!("task '{}'", label);
        let outcome = outcome::attempt(&context, || Ok::<_, Failure>(node.invoke()))
            .and_then(|reported| reported);

        match outcome {
            Ok(()) => {
                debug!("Task {} succeeded", label);
                result.mark_completed(TaskStatus::Success, None);
            }
            Err(cause) => {
                warn!("Task {} failed: {}", label, cause);
                result.mark_completed(TaskStatus::Failed, Some(cause.to_string()));
                failure = Some(cause);
            }
        }
        report.add_task_result(result);
    }

    report.mark_completed(failure.map_or(Ok(()), Err));

    let summary = report.summary();
    info!(
        "Run {} finished: {} succeeded, {} failed, {} skipped",
        run_id, summary.successful_tasks, summary.failed_tasks, summary.skipped_tasks
    );

    report
}
