// ABOUTME: Error types for build file parsing and validation
// ABOUTME: Defines specific error types for parser module operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Failed to read build file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Circular dependency detected in tasks: {tasks:?}")]
    CircularDependency { tasks: Vec<String> },

    #[error("Task '{task}' depends on unknown task '{dependency}'")]
    UnknownDependency { task: String, dependency: String },

    #[error("Task '{task}' cannot depend on interactive task '{dependency}'")]
    InteractiveDependency { task: String, dependency: String },

    #[error("Task '{task}' cannot depend on parameterized task '{dependency}'")]
    ParameterizedDependency { task: String, dependency: String },

    #[error("File set '{fileset}' refers to unknown file set '{reference}'")]
    UnknownFileSet { fileset: String, reference: String },

    #[error("Circular file set references detected: {filesets:?}")]
    CircularFileSet { filesets: Vec<String> },

    #[error("Invalid file set '{fileset}': {reason}")]
    InvalidFileSet { fileset: String, reason: String },

    #[error("Invalid task configuration for '{task}': {reason}")]
    InvalidTaskConfig { task: String, reason: String },

    #[error("Invalid test adapter '{adapter}': {reason}")]
    InvalidAdapter { adapter: String, reason: String },

    #[error("Empty build: no tasks defined")]
    EmptyBuild,
}

pub type Result<T> = std::result::Result<T, ParserError>;
