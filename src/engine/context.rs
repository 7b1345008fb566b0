// ABOUTME: Context handed to task kinds while they build their actions
// ABOUTME: Carries the project root, resolved file sets and test adapters

use indexmap::IndexMap;
use std::sync::Arc;

use super::error::{ExecutionError, Result};
use crate::path::{BuildPath, FileSet};
use crate::testing::AdapterRegistry;

#[derive(Clone)]
pub struct TaskContext {
    pub project_name: String,
    pub project_root: BuildPath,
    pub filesets: IndexMap<String, FileSet>,
    pub adapters: Arc<AdapterRegistry>,
}

impl TaskContext {
    pub fn new(project_name: impl Into<String>, project_root: BuildPath) -> Self {
        Self {
            project_name: project_name.into(),
            project_root,
            filesets: IndexMap::new(),
            adapters: Arc::new(AdapterRegistry::new()),
        }
    }

    pub fn with_filesets(mut self, filesets: IndexMap<String, FileSet>) -> Self {
        self.filesets = filesets;
        self
    }

    pub fn with_adapters(mut self, adapters: AdapterRegistry) -> Self {
        self.adapters = Arc::new(adapters);
        self
    }

    /// Look up a file set named in the configuration of `task_id`.
    pub fn fileset(&self, task_id: &str, name: &str) -> Result<FileSet> {
        self.filesets
            .get(name)
            .cloned()
            .ok_or_else(|| ExecutionError::UnknownReference {
                kind: "file set",
                owner: task_id.to_string(),
                reference: name.to_string(),
            })
    }

    /// Resolve a `/`-separated location against the project root.
    pub fn resolve(&self, location: &str) -> Result<BuildPath> {
        Ok(BuildPath::from_string(&self.project_root, location)?)
    }
}
