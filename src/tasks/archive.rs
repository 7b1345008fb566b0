// ABOUTME: Archive task implementation packing a file set into a tar.gz file
// ABOUTME: Entry names come from each file's path relative to its base or the project root

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{collect_files, parse_config, TaskImplementation};
use crate::engine::error::{ExecutionError, Result};
use crate::engine::{ParameterizedAction, TaskContext};
use crate::fileops::{self, DEFAULT_COMPRESSION_LEVEL};
use crate::outcome::Outcome;

pub struct ArchiveTask;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    pub fileset: String,
    /// Archive location relative to the project root
    pub output: String,
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,
}

fn default_compression_level() -> u32 {
    DEFAULT_COMPRESSION_LEVEL
}

impl TaskImplementation for ArchiveTask {
    fn task_type(&self) -> &'static str {
        "archive"
    }

    fn validate_config(&self, config: &serde_yaml::Value) -> Result<()> {
        let config: ArchiveConfig = parse_config("validation", "archive", config)?;

        if config.output.trim().is_empty() {
            return Err(ExecutionError::ConfigError {
                task_id: "validation".to_string(),
                message: "output cannot be empty".to_string(),
            });
        }

        if config.compression_level > 9 {
            return Err(ExecutionError::ConfigError {
                task_id: "validation".to_string(),
                message: format!(
                    "compression_level must be between 0 and 9, got {}",
                    config.compression_level
                ),
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
        let config: ArchiveConfig = parse_config(task_id, "archive", config)?;
        let fileset = context.fileset(task_id, &config.fileset)?;
        let output = context.resolve(&config.output)?;
        let root = context.project_root.clone();
        let level = config.compression_level;

        Ok(Arc::new(move |_: &[String]| -> Outcome<()> {
            let entries: Vec<_> = collect_files(&fileset, &root)?
                .into_iter()
                .filter(|(path, _)| *path != output)
                .map(|(path, name)| (path.absolute().to_path_buf(), name))
                .collect();

            let stats = fileops::create_archive(output.absolute(), &entries, level)?;
            info!(
                "Archived {} file(s) into {}",
                stats.files_archived,
                output.absolute().display()
            );
            Ok(())
        }))
    }
}
