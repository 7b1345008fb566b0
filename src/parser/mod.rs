// ABOUTME: Parser module for YAML build file definitions
// ABOUTME: Exports build file parsing, validation, and data structures

pub mod build;
pub mod error;
pub mod task;
pub mod validation;

pub use build::{AdapterConfig, BuildFile, FileSetConfig};
pub use error::{ParserError, ValidationError};
pub use task::{TaskConfig, TaskType};
pub use validation::{BuildValidator, ValidationReport};
