// ABOUTME: Task graph engine for the keystone build core
// ABOUTME: Handles node construction, dependency planning, sequential execution and project resolution

pub mod context;
pub mod dependency;
pub mod error;
pub mod executor;
pub mod project;
pub mod result;
pub mod task;

pub use context::TaskContext;
pub use dependency::{DefinitionGraph, DependencyGraph};
pub use error::{ExecutionError, Result};
pub use executor::{run_tasks, run_with_report};
pub use project::{Project, ProjectTask, Runnable};
pub use result::{RunMode, RunReport, RunSummary, TaskResult, TaskStatus};
pub use task::{Action, ParameterizedAction, ParameterizedTask, Task};
