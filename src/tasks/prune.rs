// ABOUTME: Prune task implementation deleting everything a file set selects
// ABOUTME: Continues past paths that cannot be deleted and reports them together

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use super::{combine_failures, parse_config, TaskImplementation};
use crate::engine::error::Result;
use crate::engine::{ParameterizedAction, TaskContext};
use crate::fileops;
use crate::outcome::Outcome;
use crate::path::run_file_set;

pub struct PruneTask;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PruneConfig {
    pub fileset: String,
}

impl TaskImplementation for PruneTask {
    fn task_type(&self) -> &'static str {
        "prune"
    }

    fn validate_config(&self, config: &serde_yaml::Value) -> Result<()> {
        parse_config::<PruneConfig>("validation", "prune", config).map(|_| ())
    }

    fn create_action(
        &self,
        task_id: &str,
        config: &serde_yaml::Value,
        context: &TaskContext,
    ) -> Result<ParameterizedAction> {
        let config: PruneConfig = parse_config(task_id, "prune", config)?;
        let fileset = context.fileset(task_id, &config.fileset)?;

        Ok(Arc::new(move |_: &[String]| -> Outcome<()> {
            let mut paths: Vec<_> = run_file_set(&fileset)?.into_iter().collect();
            // Contents before their directories
            paths.sort_by(|a, b| b.cmp(a));

            info!("Pruning {} path(s)", paths.len());
            let failures = fileops::prune(paths.iter().map(|path| path.absolute()));
            combine_failures("prune", paths.len(), failures)
        }))
    }
}
