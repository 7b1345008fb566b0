// ABOUTME: Error types for test declarations and adapter dispatch
// ABOUTME: Defines specific error types for testing module operations

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TestingError {
    #[error("Invalid test declaration '{literal}': {reason}")]
    InvalidDeclaration { literal: String, reason: String },

    #[error("No {style} test adapter registered for superclass '{superclass}'")]
    NoAdapter {
        superclass: String,
        style: &'static str,
    },

    #[error("Test adapter '{name}' conflicts with an existing adapter for '{superclass}'")]
    DuplicateAdapter { name: String, superclass: String },
}

pub type Result<T> = std::result::Result<T, TestingError>;
