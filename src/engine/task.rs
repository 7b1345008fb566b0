// ABOUTME: Immutable task graph nodes and their parameterized variant
// ABOUTME: Validates dependencies at construction and composes nodes with and_then

use std::fmt;
use std::sync::Arc;

use super::error::{ExecutionError, Result};
use super::executor;
use super::result::RunMode;
use crate::outcome::{Failure, Outcome};

/// Work performed by a task node.
pub type Action = Arc<dyn Fn() -> Outcome<()> + Send + Sync>;

/// Work performed by a parameterized task, given the caller's arguments.
pub type ParameterizedAction = Arc<dyn Fn(&[String]) -> Outcome<()> + Send + Sync>;

const ANONYMOUS: &str = "<anonymous>";

/// A node in the task dependency graph.
///
/// Nodes never change after construction; the `with_*` methods return new
/// nodes. Cloning shares the node, and node identity (not structure) decides
/// whether two dependencies are the same node during planning.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskNode>,
}

struct TaskNode {
    description: Option<String>,
    dependencies: Vec<Task>,
    interactive: bool,
    action: Action,
}

impl Task {
    pub fn new<F>(action: F) -> Self
    where
        F: Fn() -> Outcome<()> + Send + Sync + 'static,
    {
        Self::from_parts(None, Vec::new(), false, Arc::new(action))
    }

    fn from_parts(
        description: Option<String>,
        dependencies: Vec<Task>,
        interactive: bool,
        action: Action,
    ) -> Self {
        Self {
            inner: Arc::new(TaskNode {
                description,
                dependencies,
                interactive,
                action,
            }),
        }
    }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self::from_parts(
            Some(description.into()),
            self.inner.dependencies.clone(),
            self.inner.interactive,
            Arc::clone(&self.inner.action),
        )
    }

    /// Replace the dependency list. Fails if any dependency is interactive.
    pub fn with_dependencies(&self, dependencies: Vec<Task>) -> Result<Self> {
        validate_dependencies(&self.label(), &dependencies)?;
        Ok(Self::from_parts(
            self.inner.description.clone(),
            dependencies,
            self.inner.interactive,
            Arc::clone(&self.inner.action),
        ))
    }

    pub fn with_interactive(&self, interactive: bool) -> Self {
        Self::from_parts(
            self.inner.description.clone(),
            self.inner.dependencies.clone(),
            interactive,
            Arc::clone(&self.inner.action),
        )
    }

    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Description, or a placeholder for anonymous nodes.
    pub fn label(&self) -> String {
        self.inner
            .description
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    pub fn dependencies(&self) -> &[Task] {
        &self.inner.dependencies
    }

    pub fn is_interactive(&self) -> bool {
        self.inner.interactive
    }

    /// Run this node's own action, ignoring its dependencies.
    pub fn invoke(&self) -> Outcome<()> {
        (self.inner.action)()
    }

    /// A new non-interactive node depending on both operands' dependencies.
    /// Its action reports the left action's failure if there is one and only
    /// otherwise runs the right action for its report.
    pub fn and_then(&self, other: &Task) -> Self {
        let mut dependencies = self.inner.dependencies.clone();
        dependencies.extend(other.inner.dependencies.iter().cloned());

        let left = Arc::clone(&self.inner.action);
        let right = Arc::clone(&other.inner.action);
        let action: Action = Arc::new(move || left().and_then(|()| right()));

        Self::from_parts(None, dependencies, false, action)
    }

    /// Run the transitive dependencies and then this node, in topological
    /// order, stopping at the first failure.
    pub fn run(&self) -> Outcome<()> {
        executor::run_with_report(self, RunMode::Full).outcome
    }

    /// Like [`run`](Task::run) without invoking this node's own action.
    pub fn run_dependencies_only(&self) -> Outcome<()> {
        executor::run_with_report(self, RunMode::DependenciesOnly).outcome
    }

    pub(crate) fn node_id(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn same_node(&self, other: &Task) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("description", &self.inner.description)
            .field("dependencies", &self.inner.dependencies.len())
            .field("interactive", &self.inner.interactive)
            .finish()
    }
}

/// A task invoked directly with caller-supplied literal arguments. It is never
/// a dependency of another node.
#[derive(Clone)]
pub struct ParameterizedTask {
    description: Option<String>,
    dependencies: Vec<Task>,
    parameters: Vec<String>,
    action: ParameterizedAction,
}

impl ParameterizedTask {
    /// `parameters` lists accepted literal arguments for help and completion.
    pub fn new<F>(parameters: Vec<String>, action: F) -> Self
    where
        F: Fn(&[String]) -> Outcome<()> + Send + Sync + 'static,
    {
        Self::from_action(parameters, Arc::new(action))
    }

    pub fn from_action(parameters: Vec<String>, action: ParameterizedAction) -> Self {
        Self {
            description: None,
            dependencies: Vec::new(),
            parameters,
            action,
        }
    }

    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self.clone()
        }
    }

    pub fn with_dependencies(&self, dependencies: Vec<Task>) -> Result<Self> {
        validate_dependencies(&self.label(), &dependencies)?;
        Ok(Self {
            dependencies,
            ..self.clone()
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn label(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_string())
    }

    pub fn dependencies(&self) -> &[Task] {
        &self.dependencies
    }

    pub fn parameters(&self) -> &[String] {
        &self.parameters
    }

    /// Run the dependencies in topological order, then the action with
    /// `arguments`. At least one argument is required.
    pub fn invoke(&self, arguments: &[String]) -> Outcome<()> {
        self.as_task(arguments)?.run()
    }

    /// The node [`invoke`](ParameterizedTask::invoke) runs for `arguments`.
    pub fn as_task(&self, arguments: &[String]) -> Outcome<Task> {
        if arguments.is_empty() {
            return Err(Failure::new(format!(
                "task '{}' requires arguments (accepted: {})",
                self.label(),
                self.parameters.join(", ")
            )));
        }

        let action = Arc::clone(&self.action);
        let arguments = arguments.to_vec();
        Ok(Task::from_parts(
            Some(self.label()),
            self.dependencies.clone(),
            false,
            Arc::new(move || action(&arguments)),
        ))
    }
}

impl fmt::Debug for ParameterizedTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterizedTask")
            .field("description", &self.description)
            .field("dependencies", &self.dependencies.len())
            .field("parameters", &self.parameters)
            .finish()
    }
}

fn validate_dependencies(owner: &str, dependencies: &[Task]) -> Result<()> {
    if let Some(interactive) = dependencies.iter().find(|d| d.is_interactive()) {
        return Err(ExecutionError::InteractiveDependency {
            task: owner.to_string(),
            dependency: interactive.label(),
        });
    }
    Ok(())
}
