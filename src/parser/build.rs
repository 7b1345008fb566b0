// ABOUTME: Core build file data structures and parsing functionality
// ABOUTME: Defines the BuildFile struct with its file set, adapter and task declarations

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::error::{ParserError, Result, ValidationError};
use super::task::TaskConfig;

fn default_include() -> String {
    "*".to_string()
}

fn default_recursive() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildFile {
    pub name: String,
    pub description: Option<String>,
    /// Project root, relative to the directory holding the build file.
    pub root: Option<PathBuf>,
    #[serde(default)]
    pub filesets: IndexMap<String, FileSetConfig>,
    #[serde(default)]
    pub test_adapters: Vec<AdapterConfig>,
    pub tasks: IndexMap<String, TaskConfig>,
}

/// A named file set. Roots are searched for names matching `include`; other
/// file sets can be merged in with `union` and removed with `minus`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSetConfig {
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default = "default_include")]
    pub include: String,
    #[serde(default = "default_recursive")]
    pub recursive: bool,
    /// Directory names whose contents are left out of a recursive search.
    #[serde(default)]
    pub skip: Vec<String>,
    #[serde(default)]
    pub union: Vec<String>,
    #[serde(default)]
    pub minus: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdapterConfig {
    pub name: String,
    pub superclass: String,
    #[serde(default)]
    pub module: bool,
    /// Program and arguments; `{test}` is replaced by the test class name.
    pub command: Vec<String>,
}

impl Default for FileSetConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            include: default_include(),
            recursive: default_recursive(),
            skip: Vec::new(),
            union: Vec::new(),
            minus: Vec::new(),
        }
    }
}

impl FileSetConfig {
    /// Every file set this one refers to by name.
    pub fn references(&self) -> impl Iterator<Item = &String> {
        self.union.iter().chain(self.minus.iter())
    }
}

impl BuildFile {
    /// Parse a build file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ParserError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse a build file from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let build: BuildFile = serde_yaml::from_str(content).map_err(ParserError::YamlError)?;
        build.validate_structure()?;
        Ok(build)
    }

    fn validate_structure(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ParserError::MissingField("name".to_string()));
        }

        if self.tasks.is_empty() {
            return Err(ValidationError::EmptyBuild.into());
        }

        for (name, fileset) in &self.filesets {
            if fileset.roots.is_empty() && fileset.union.is_empty() {
                return Err(ValidationError::InvalidFileSet {
                    fileset: name.clone(),
                    reason: "needs at least one root or union member".to_string(),
                }
                .into());
            }
        }

        let mut adapter_names = HashSet::new();
        for adapter in &self.test_adapters {
            if !adapter_names.insert(adapter.name.as_str()) {
                return Err(ValidationError::InvalidAdapter {
                    adapter: adapter.name.clone(),
                    reason: "duplicate adapter name".to_string(),
                }
                .into());
            }
            if adapter.command.is_empty() {
                return Err(ValidationError::InvalidAdapter {
                    adapter: adapter.name.clone(),
                    reason: "command cannot be empty".to_string(),
                }
                .into());
            }
        }

        Ok(())
    }

    pub fn task_names(&self) -> Vec<String> {
        self.tasks.keys().cloned().collect()
    }

    pub fn get_task(&self, name: &str) -> Option<&TaskConfig> {
        self.tasks.get(name)
    }

    /// Names of tasks that list `name` in their `depends_on`.
    pub fn get_dependent_tasks(&self, name: &str) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|(_, task)| task.depends_on.iter().any(|dep| dep == name))
            .map(|(task_name, _)| task_name.clone())
            .collect()
    }
}
