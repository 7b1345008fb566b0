// ABOUTME: Declared task configuration and the supported task kinds
// ABOUTME: Kind-specific settings stay as raw YAML until a task implementation reads them

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub task_type: TaskType,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub interactive: bool,
    /// Accepted literal arguments. A non-empty list makes the task parameterized.
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub config: serde_yaml::Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Command,
    Archive,
    Copy,
    Prune,
    Test,
}

impl TaskConfig {
    pub fn is_parameterized(&self) -> bool {
        !self.parameters.is_empty()
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskType::Command => write!(f, "command"),
            TaskType::Archive => write!(f, "archive"),
            TaskType::Copy => write!(f, "copy"),
            TaskType::Prune => write!(f, "prune"),
            TaskType::Test => write!(f, "test"),
        }
    }
}
