// ABOUTME: Command implementations for the keystone CLI
// ABOUTME: Handles execution of run, list, files, and validate commands

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

use crate::engine::{Project, RunMode};
use crate::output::OutputFormat;
use crate::parser::{BuildFile, BuildValidator};
use crate::tasks::TaskRegistry;

fn load_project(build_file: &Path) -> Result<Project> {
    Project::load(build_file, &TaskRegistry::new())
        .with_context(|| format!("Failed to load build file {}", build_file.display()))
}

/// Run a task and its dependencies, printing the run report
pub fn run_task(
    build_file: &Path,
    task: &str,
    arguments: &[String],
    deps_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let project = load_project(build_file)?;
    let mode = if deps_only {
        RunMode::DependenciesOnly
    } else {
        RunMode::Full
    };

    info!("Running task {} from {}", task, build_file.display());
    let report = project.run(task, arguments, mode)?;

    println!("{}", format.formatter().format_run_report(&report)?);

    // A failed run must produce a non-zero exit code
    match report.outcome {
        Ok(()) => Ok(()),
        Err(failure) => Err(anyhow::anyhow!("Task '{}' failed: {}", task, failure)),
    }
}

/// List declared tasks and file sets
pub fn list_tasks(build_file: &Path, format: OutputFormat) -> Result<()> {
    let project = load_project(build_file)?;
    println!("{}", format.formatter().format_task_list(&project)?);
    Ok(())
}

/// Evaluate a named file set and print the files it selects
pub fn show_files(build_file: &Path, fileset: &str, format: OutputFormat) -> Result<()> {
    let project = load_project(build_file)?;
    let files = project
        .files(fileset)?
        .map_err(|failure| anyhow::anyhow!("{}", failure))?;

    info!("File set {} selects {} path(s)", fileset, files.len());
    print!("{}", format.formatter().format_file_list(fileset, &files)?);
    Ok(())
}

/// Validate a build file, reporting every problem found
pub fn validate_build(build_file: &Path, format: OutputFormat) -> Result<()> {
    info!("Validating build file: {}", build_file.display());

    let build = BuildFile::from_file(build_file)
        .with_context(|| format!("Build file validation failed: {}", build_file.display()))?;
    let report = BuildValidator::new()
        .with_task_registry(TaskRegistry::new())
        .validate(&build)?;

    print!("{}", format.formatter().format_validation(&build.name, &report)?);

    if report.is_valid {
        // Resolving also checks roots and task construction
        load_project(build_file)?;
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "Build file has {} error(s)",
            report.errors.len()
        ))
    }
}
