// ABOUTME: Build file validation and dependency checking
// ABOUTME: Collects every structural problem in a build file into one report

use petgraph::graph::NodeIndex;
use petgraph::Graph;
use std::collections::{HashMap, HashSet};

use super::build::BuildFile;
use super::error::{Result, ValidationError};
use super::task::TaskConfig;
use crate::tasks::TaskRegistry;

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
    pub is_valid: bool,
}

pub struct BuildValidator {
    task_registry: Option<TaskRegistry>,
}

impl BuildValidator {
    pub fn new() -> Self {
        Self {
            task_registry: None,
        }
    }

    pub fn with_task_registry(mut self, task_registry: TaskRegistry) -> Self {
        self.task_registry = Some(task_registry);
        self
    }

    /// Validate a complete build file
    pub fn validate(&self, build: &BuildFile) -> Result<ValidationReport> {
        let mut report = ValidationReport::new();

        self.validate_dependencies(build, &mut report);
        self.validate_filesets(build, &mut report);
        self.validate_task_configs(build, &mut report);
        self.check_unused_filesets(build, &mut report);

        report.is_valid = report.errors.is_empty();
        Ok(report)
    }

    /// Unknown, interactive and parameterized dependencies, then cycles
    fn validate_dependencies(&self, build: &BuildFile, report: &mut ValidationReport) {
        for (task_name, task_config) in &build.tasks {
            for dep in &task_config.depends_on {
                match build.tasks.get(dep) {
                    None => report.errors.push(ValidationError::UnknownDependency {
                        task: task_name.clone(),
                        dependency: dep.clone(),
                    }),
                    Some(dependency) if dependency.interactive => {
                        report.errors.push(ValidationError::InteractiveDependency {
                            task: task_name.clone(),
                            dependency: dep.clone(),
                        })
                    }
                    Some(dependency) if dependency.is_parameterized() => {
                        report.errors.push(ValidationError::ParameterizedDependency {
                            task: task_name.clone(),
                            dependency: dep.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        let references = build
            .tasks
            .iter()
            .map(|(name, task)| (name, task.depends_on.iter().collect::<Vec<_>>()));
        if let Err(cycle) = detect_cycles(references) {
            report
                .errors
                .push(ValidationError::CircularDependency { tasks: cycle });
        }
    }

    fn validate_filesets(&self, build: &BuildFile, report: &mut ValidationReport) {
        for (name, fileset) in &build.filesets {
            for reference in fileset.references() {
                if !build.filesets.contains_key(reference) {
                    report.errors.push(ValidationError::UnknownFileSet {
                        fileset: name.clone(),
                        reference: reference.clone(),
                    });
                }
            }

            if fileset.include.trim().is_empty() {
                report.errors.push(ValidationError::InvalidFileSet {
                    fileset: name.clone(),
                    reason: "include pattern cannot be empty".to_string(),
                });
            }
        }

        let references = build
            .filesets
            .iter()
            .map(|(name, fileset)| (name, fileset.references().collect::<Vec<_>>()));
        if let Err(cycle) = detect_cycles(references) {
            report
                .errors
                .push(ValidationError::CircularFileSet { filesets: cycle });
        }
    }

    fn validate_task_configs(&self, build: &BuildFile, report: &mut ValidationReport) {
        for (task_name, task_config) in &build.tasks {
            if let Err(error) = self.validate_single_task(build, task_name, task_config) {
                report.errors.push(error);
            }
        }
    }

    fn validate_single_task(
        &self,
        build: &BuildFile,
        task_name: &str,
        task_config: &TaskConfig,
    ) -> std::result::Result<(), ValidationError> {
        if task_config.interactive && task_config.is_parameterized() {
            return Err(ValidationError::InvalidTaskConfig {
                task: task_name.to_string(),
                reason: "a parameterized task cannot also be interactive".to_string(),
            });
        }

        if let Some(fileset) = referenced_fileset(task_config) {
            if !build.filesets.contains_key(fileset) {
                return Err(ValidationError::InvalidTaskConfig {
                    task: task_name.to_string(),
                    reason: format!("unknown file set '{}'", fileset),
                });
            }
        }

        if let Some(ref registry) = self.task_registry {
            let task_type = task_config.task_type.to_string();

            if let Err(e) = registry.validate_task_config(&task_type, &task_config.config) {
                return Err(ValidationError::InvalidTaskConfig {
                    task: task_name.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(())
    }

    fn check_unused_filesets(&self, build: &BuildFile, report: &mut ValidationReport) {
        let mut used: HashSet<&str> = build
            .tasks
            .values()
            .filter_map(referenced_fileset)
            .collect();
        for fileset in build.filesets.values() {
            used.extend(fileset.references().map(String::as_str));
        }

        for name in build.filesets.keys() {
            if !used.contains(name.as_str()) {
                report
                    .warnings
                    .push(format!("File set '{}' is not used by any task", name));
            }
        }
    }
}

/// The `fileset` key every file-consuming task kind shares.
fn referenced_fileset(task_config: &TaskConfig) -> Option<&str> {
    task_config.config.get("fileset").and_then(|v| v.as_str())
}

/// Detect reference cycles with petgraph's topological sort. Unknown names
/// are reported elsewhere and ignored here.
fn detect_cycles<'a, I>(definitions: I) -> std::result::Result<(), Vec<String>>
where
    I: Iterator<Item = (&'a String, Vec<&'a String>)>,
{
    let definitions: Vec<_> = definitions.collect();
    let mut graph = Graph::new();
    let mut node_map: HashMap<&String, NodeIndex> = HashMap::new();

    for (name, _) in &definitions {
        node_map.insert(*name, graph.add_node((*name).clone()));
    }

    for (name, references) in &definitions {
        let node = node_map[*name];
        for reference in references {
            if let Some(&target) = node_map.get(*reference) {
                graph.add_edge(target, node, ());
            }
        }
    }

    match petgraph::algo::toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(cycle) => Err(vec![graph[cycle.node_id()].clone()]),
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
            is_valid: true,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

impl Default for BuildValidator {
    fn default() -> Self {
        Self::new()
    }
}
