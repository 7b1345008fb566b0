// ABOUTME: Error types for task graph construction and project resolution
// ABOUTME: Defines validation failures raised while building the dependency graph

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task '{task}' cannot depend on interactive task '{dependency}'")]
    InteractiveDependency { task: String, dependency: String },

    #[error("Task '{task}' cannot depend on parameterized task '{dependency}'")]
    ParameterizedDependency { task: String, dependency: String },

    #[error("{kind} '{owner}' refers to unknown {kind} '{reference}'")]
    UnknownReference {
        kind: &'static str,
        owner: String,
        reference: String,
    },

    #[error("Circular {kind} references detected: {members:?}")]
    CircularReference {
        kind: &'static str,
        members: Vec<String>,
    },

    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    #[error("Invalid arguments for task '{task_id}': {message}")]
    InvalidArguments { task_id: String, message: String },

    #[error("Task type not supported: {task_type}")]
    TaskNotSupported { task_type: String },

    #[error("Configuration error for task {task_id}: {message}")]
    ConfigError { task_id: String, message: String },

    #[error("Path error: {0}")]
    PathError(#[from] crate::path::PathError),

    #[error("Test adapter error: {0}")]
    TestingError(#[from] crate::testing::TestingError),

    #[error("Parser error: {0}")]
    ParserError(#[from] crate::parser::ParserError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExecutionError>;
