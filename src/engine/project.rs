// ABOUTME: Resolves a parsed build file into file sets, adapters and task nodes
// ABOUTME: Names are resolved in dependency order so every reference is checked once

use indexmap::IndexMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::context::TaskContext;
use super::dependency::DefinitionGraph;
use super::error::{ExecutionError, Result};
use super::executor;
use super::result::{RunMode, RunReport};
use super::task::{ParameterizedTask, Task};
use crate::outcome::Outcome;
use crate::parser::{BuildFile, FileSetConfig, TaskConfig, TaskType};
use crate::path::{normalize, run_file_set, BuildPath, FileSet, NameFilter};
use crate::tasks::TaskRegistry;
use crate::testing::AdapterRegistry;

/// The graph node behind a declared task.
#[derive(Clone, Debug)]
pub enum Runnable {
    Plain(Task),
    Parameterized(ParameterizedTask),
}

#[derive(Clone, Debug)]
pub struct ProjectTask {
    pub name: String,
    pub task_type: TaskType,
    pub summary: Option<String>,
    pub runnable: Runnable,
}

pub struct Project {
    pub name: String,
    pub description: Option<String>,
    pub root: BuildPath,
    pub filesets: IndexMap<String, FileSet>,
    pub tasks: IndexMap<String, ProjectTask>,
}

impl Project {
    /// Parse and resolve a build file. Relative roots are taken from the
    /// directory holding the file.
    pub fn load(path: &Path, registry: &TaskRegistry) -> Result<Self> {
        let build = BuildFile::from_file(path)?;
        let location = std::fs::canonicalize(path)?;
        let base_dir = location.parent().unwrap_or(Path::new("/"));
        Self::from_build(&build, base_dir, registry)
    }

    #[instrument(skip(build, registry), fields(project = %build.name))]
    pub fn from_build(build: &BuildFile, base_dir: &Path, registry: &TaskRegistry) -> Result<Self> {
        let root_location = match build.root {
            Some(ref root) => normalize(&base_dir.join(root)),
            None => normalize(base_dir),
        };
        let root = BuildPath::from_absolute(&root_location)?;
        debug!("Project root: {}", root);

        let filesets = resolve_filesets(&root, &build.filesets)?;
        let adapters = AdapterRegistry::from_configs(&build.test_adapters, root.absolute())?;

        let context = TaskContext::new(build.name.clone(), root.clone())
            .with_filesets(filesets.clone())
            .with_adapters(adapters);
        let tasks = resolve_tasks(&build.tasks, &context, registry)?;

        info!(
            "Loaded project {} with {} file set(s) and {} task(s)",
            build.name,
            filesets.len(),
            tasks.len()
        );

        Ok(Self {
            name: build.name.clone(),
            description: build.description.clone(),
            root,
            filesets,
            tasks,
        })
    }

    pub fn task(&self, name: &str) -> Result<&ProjectTask> {
        self.tasks.get(name).ok_or_else(|| ExecutionError::TaskNotFound {
            task_id: name.to_string(),
        })
    }

    pub fn fileset(&self, name: &str) -> Result<&FileSet> {
        self.filesets
            .get(name)
            .ok_or_else(|| ExecutionError::UnknownReference {
                kind: "file set",
                owner: self.name.clone(),
                reference: name.to_string(),
            })
    }

    /// Evaluate a named file set, sorted for display.
    pub fn files(&self, name: &str) -> Result<Outcome<Vec<BuildPath>>> {
        let fileset = self.fileset(name)?;
        Ok(run_file_set(fileset).map(|paths| {
            let mut paths: Vec<BuildPath> = paths.into_iter().collect();
            paths.sort();
            paths
        }))
    }

    /// The node a run of `name` executes. Plain tasks take no arguments;
    /// parameterized tasks need at least one.
    pub fn runnable_task(&self, name: &str, arguments: &[String]) -> Result<Task> {
        match &self.task(name)?.runnable {
            Runnable::Plain(task) if arguments.is_empty() => Ok(task.clone()),
            Runnable::Plain(_) => Err(ExecutionError::InvalidArguments {
                task_id: name.to_string(),
                message: "task does not accept arguments".to_string(),
            }),
            Runnable::Parameterized(task) => {
                task.as_task(arguments)
                    .map_err(|failure| ExecutionError::InvalidArguments {
                        task_id: name.to_string(),
                        message: failure.message().to_string(),
                    })
            }
        }
    }

    pub fn run(&self, name: &str, arguments: &[String], mode: RunMode) -> Result<RunReport> {
        let task = self.runnable_task(name, arguments)?;
        Ok(executor::run_with_report(&task, mode))
    }
}

fn resolve_filesets(
    root: &BuildPath,
    configs: &IndexMap<String, FileSetConfig>,
) -> Result<IndexMap<String, FileSet>> {
    let order = DefinitionGraph::from_definitions(
        "file set",
        configs.iter().map(|(name, config)| (name, config.references())),
    )?
    .resolution_order()?;

    let mut resolved: IndexMap<String, FileSet> = IndexMap::new();
    for name in order {
        let config = &configs[&name];
        let mut fileset = FileSet::empty();

        for location in &config.roots {
            let base = BuildPath::from_string(root, location)?.mark_base()?;
            fileset = fileset + select(FileSet::from(base), config);
        }
        for member in &config.union {
            fileset = fileset + resolved[member].clone();
        }
        for excluded in &config.minus {
            fileset = fileset - resolved[excluded].clone();
        }

        debug!("Resolved file set {}", name);
        resolved.insert(name, fileset);
    }

    // Keep declaration order for listing
    Ok(configs
        .keys()
        .filter_map(|name| resolved.get(name).map(|set| (name.clone(), set.clone())))
        .collect())
}

fn select(base: FileSet, config: &FileSetConfig) -> FileSet {
    let include = NameFilter::from(config.include.as_str());
    if !config.recursive {
        return base.children(include);
    }
    if config.skip.is_empty() {
        return base.descendants(include);
    }

    let skipped: Vec<NameFilter> = config.skip.iter().map(NameFilter::glob).collect();
    let skip = NameFilter::custom(move |name| skipped.iter().any(|filter| filter.matches(name)));
    base.descendants_except(include, skip)
}

fn resolve_tasks(
    configs: &IndexMap<String, TaskConfig>,
    context: &TaskContext,
    registry: &TaskRegistry,
) -> Result<IndexMap<String, ProjectTask>> {
    let order = DefinitionGraph::from_definitions(
        "task",
        configs.iter().map(|(name, config)| (name, &config.depends_on)),
    )?
    .resolution_order()?;

    let mut resolved: IndexMap<String, ProjectTask> = IndexMap::new();
    for name in order {
        let config = &configs[&name];
        let dependencies = config
            .depends_on
            .iter()
            .map(|dependency| match &resolved[dependency].runnable {
                Runnable::Plain(task) if task.is_interactive() => {
                    Err(ExecutionError::InteractiveDependency {
                        task: name.clone(),
                        dependency: dependency.clone(),
                    })
                }
                Runnable::Plain(task) => Ok(task.clone()),
                Runnable::Parameterized(_) => Err(ExecutionError::ParameterizedDependency {
                    task: name.clone(),
                    dependency: dependency.clone(),
                }),
            })
            .collect::<Result<Vec<Task>>>()?;

        let action =
            registry.create_action(&name, &config.task_type.to_string(), &config.config, context)?;

        let runnable = if config.is_parameterized() {
            if config.interactive {
                return Err(ExecutionError::ConfigError {
                    task_id: name.clone(),
                    message: "a parameterized task cannot also be interactive".to_string(),
                });
            }
            Runnable::Parameterized(
                ParameterizedTask::from_action(config.parameters.clone(), action)
                    .with_description(name.clone())
                    .with_dependencies(dependencies)?,
            )
        } else {
            Runnable::Plain(
                Task::new(move || action(&[]))
                    .with_description(name.clone())
                    .with_interactive(config.interactive)
                    .with_dependencies(dependencies)?,
            )
        };

        resolved.insert(
            name.clone(),
            ProjectTask {
                name: name.clone(),
                task_type: config.task_type,
                summary: config.description.clone(),
                runnable,
            },
        );
    }

    Ok(configs
        .keys()
        .filter_map(|name| resolved.get(name).map(|task| (name.clone(), task.clone())))
        .collect())
}
