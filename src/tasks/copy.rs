// ABOUTME: Copy task implementation mirroring a file set into a directory
// ABOUTME: Keeps each file's relative layout and reports every file that failed

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use super::{collect_files, combine_failures, parse_config, TaskImplementation};
use crate::engine::error::{ExecutionError, Result};
use crate::engine::{ParameterizedAction, TaskContext};
use crate::fileops;
use crate::outcome::Outcome;

pub struct CopyTask;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyConfig {
    pub fileset: String,
    /// Destination directory relative to the project root
    pub destination: String,
}

impl TaskImplementation for CopyTask {
    fn task_type(&self) -> &'static str {
        "copy"
    }

    fn validate_config(&self, config: &serde_yaml::Value) -> Result<()> {
        let config: CopyConfig = parse_config("validation", "copy", config)?;
        if config.destination.trim().is_empty() {
            return Err(ExecutionError::ConfigError {
                task_id: "validation".to_string(),
                message: "destination cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    fn create_action(
        &self,
        task_id: &str,
        config: &serde_yaml::Value,
        context: &TaskContext,
    ) -> Result<ParameterizedAction> {
        let config: CopyConfig = parse_config(task_id, "copy", config)?;
        let fileset = context.fileset(task_id, &config.fileset)?;
        let destination = context.resolve(&config.destination)?;
        let root = context.project_root.clone();

        Ok(Arc::new(move |_: &[String]| -> Outcome<()> {
            let pairs: Vec<(PathBuf, PathBuf)> = collect_files(&fileset, &root)?
                .into_iter()
                .map(|(path, name)| {
                    (
                        path.absolute().to_path_buf(),
                        destination.absolute().join(name),
                    )
                })
                .collect();

            let failures = fileops::copy_all(
                pairs
                    .iter()
                    .map(|(source, target)| (source.as_path(), target.as_path())),
            );
            combine_failures("copy", pairs.len(), failures)
        }))
    }
}
