// ABOUTME: Failure value carried by every outcome in the build core
// ABOUTME: Holds a context-prefixed, human readable message

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result of any trapped operation.
pub type Outcome<T> = std::result::Result<T, Failure>;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct Failure {
    message: String,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Build a failure whose message is `context: cause`
    pub fn with_context(context: &str, cause: impl std::fmt::Display) -> Self {
        if context.is_empty() {
            Self::new(cause.to_string())
        } else {
            Self::new(format!("{}: {}", context, cause))
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
