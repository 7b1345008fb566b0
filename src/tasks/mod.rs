// ABOUTME: Built-in task kinds turning declared configuration into task actions
// ABOUTME: Contains implementations for command, archive, copy, prune and test tasks

pub mod archive;
pub mod command;
pub mod copy;
pub mod prune;

use crate::engine::error::{ExecutionError, Result};
use crate::engine::{ParameterizedAction, TaskContext};
use crate::outcome::{Failure, Outcome};
use crate::path::{run_file_set, BuildPath, FileSet};
use std::collections::HashMap;

pub trait TaskImplementation: Send + Sync {
    fn task_type(&self) -> &'static str;

    fn validate_config(&self, config: &serde_yaml::Value) -> Result<()>;

    /// Build the action for a declared task. Plain tasks are invoked with no
    /// arguments; parameterized tasks receive the caller's arguments.
    fn create_action(
        &self,
        task_id: &str,
        config: &serde_yaml::Value,
        context: &TaskContext,
    ) -> Result<ParameterizedAction>;
}

pub struct TaskRegistry {
    implementations: HashMap<String, Box<dyn TaskImplementation>>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            implementations: HashMap::new(),
        };

        registry.register(Box::new(command::CommandTask));
        registry.register(Box::new(archive::ArchiveTask));
        registry.register(Box::new(copy::CopyTask));
        registry.register(Box::new(prune::PruneTask));
        registry.register(Box::new(test::TestTask));

        registry
    }

    pub fn register(&mut self, implementation: Box<dyn TaskImplementation>) {
        let task_type = implementation.task_type().to_string();
        self.implementations.insert(task_type, implementation);
    }

    pub fn get_implementation(&self, task_type: &str) -> Option<&dyn TaskImplementation> {
        self.implementations.get(task_type).map(|imp| imp.as_ref())
    }

    pub fn validate_task_config(&self, task_type: &str, config: &serde_yaml::Value) -> Result<()> {
        match self.get_implementation(task_type) {
            Some(implementation) => implementation.validate_config(config),
            None => Err(ExecutionError::TaskNotSupported {
                task_type: task_type.to_string(),
            }),
        }
    }

    pub fn create_action(
        &self,
        task_id: &str,
        task_type: &str,
        config: &serde_yaml::Value,
        context: &TaskContext,
    ) -> Result<ParameterizedAction> {
        match self.get_implementation(task_type) {
            Some(implementation) => {
                implementation.validate_config(config).map_err(|e| match e {
                    ExecutionError::ConfigError { message, .. } => ExecutionError::ConfigError {
                        task_id: task_id.to_string(),
                        message,
                    },
                    other => other,
                })?;
                implementation.create_action(task_id, config, context)
            }
            None => Err(ExecutionError::TaskNotSupported {
                task_type: task_type.to_string(),
            }),
        }
    }

    pub fn list_supported_tasks(&self) -> Vec<&str> {
        let mut supported: Vec<&str> = self.implementations.keys().map(|k| k.as_str()).collect();
        supported.sort_unstable();
        supported
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize a kind's configuration, reporting problems against `task_id`.
pub(crate) fn parse_config<T>(task_id: &str, kind: &str, config: &serde_yaml::Value) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_yaml::from_value(config.clone()).map_err(|e| ExecutionError::ConfigError {
        task_id: task_id.to_string(),
        message: format!("Invalid {} configuration: {}", kind, e),
    })
}

/// Regular files selected by a file set paired with their relative names
/// under `root`, sorted by name. Directories in the set are left out.
pub(crate) fn collect_files(
    fileset: &FileSet,
    root: &BuildPath,
) -> Outcome<Vec<(BuildPath, String)>> {
    let mut files = Vec::new();
    for path in run_file_set(fileset)?.into_iter().filter(BuildPath::is_file) {
        let Some(name) = path.relative_to(root.absolute()) else {
            return Err(Failure::new(format!(
                "{} is outside the project root {}",
                path,
                root.absolute().display()
            )));
        };
        files.push((path, name));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

/// Join per-file failures into a single failure for the task outcome.
pub(crate) fn combine_failures(action: &str, total: usize, failures: Vec<Failure>) -> Outcome<()> {
    if failures.is_empty() {
        return Ok(());
    }

    let details: Vec<&str> = failures.iter().map(|f| f.message()).collect();
    Err(Failure::new(format!(
        "{} failed for {} of {} path(s): {}",
        action,
        failures.len(),
        total,
        details.join("; ")
    )))
}
