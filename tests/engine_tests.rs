// ABOUTME: Integration tests for the task graph and project execution
// ABOUTME: Tests ordering, failure propagation, and_then and declared file tasks end to end

use std::fs;
use std::sync::{Arc, Mutex};

use flate2::read::GzDecoder;
use keystone::engine::{ExecutionError, ParameterizedTask, Project, RunMode, Task, TaskStatus};
use keystone::outcome::Failure;
use keystone::tasks::TaskRegistry;

mod common;
use common::{TestBuildBuilder, TestEnvironment};

type Log = Arc<Mutex<Vec<String>>>;

fn recording(log: &Log, name: &str) -> Task {
    let log = Arc::clone(log);
    let entry = name.to_string();
    Task::new(move || {
        log.lock().unwrap().push(entry.clone());
        Ok(())
    })
    .with_description(name)
}

fn failing(log: &Log, name: &str, message: &str) -> Task {
    let log = Arc::clone(log);
    let entry = name.to_string();
    let message = message.to_string();
    Task::new(move || {
        log.lock().unwrap().push(entry.clone());
        Err(Failure::new(message.clone()))
    })
    .with_description(name)
}

fn entries(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

fn load(env: &TestEnvironment, builder: &TestBuildBuilder) -> Project {
    let file = env.build_file(builder);
    Project::load(&file, &TaskRegistry::new()).expect("project should load")
}

#[test]
fn test_diamond_runs_each_node_once_in_order() {
    let log: Log = Arc::default();
    let a = recording(&log, "A");
    let b = recording(&log, "B").with_dependencies(vec![a.clone()]).unwrap();
    let c = recording(&log, "C").with_dependencies(vec![a]).unwrap();
    let d = recording(&log, "D").with_dependencies(vec![b, c]).unwrap();

    assert_eq!(d.run(), Ok(()));

    let order = entries(&log);
    assert_eq!(order.len(), 4);
    assert_eq!(order.first().map(String::as_str), Some("A"));
    assert_eq!(order.last().map(String::as_str), Some("D"));
}

#[test]
fn test_failure_propagates_and_stops() {
    let log: Log = Arc::default();
    let a = recording(&log, "A");
    let b = failing(&log, "B", "B broke").with_dependencies(vec![a]).unwrap();
    let c = recording(&log, "C").with_dependencies(vec![b]).unwrap();

    assert_eq!(c.run(), Err(Failure::new("B broke")));
    assert_eq!(entries(&log), vec!["A", "B"]);
}

#[test]
fn test_interactive_dependency_is_rejected() {
    let log: Log = Arc::default();
    let shell = recording(&log, "shell").with_interactive(true);

    let result = recording(&log, "all").with_dependencies(vec![shell]);

    assert!(matches!(
        result,
        Err(ExecutionError::InteractiveDependency { ref dependency, .. }) if dependency == "shell"
    ));
}

#[test]
fn test_and_then_merges_dependencies_and_short_circuits() {
    let log: Log = Arc::default();
    let setup_left = recording(&log, "setup-left");
    let setup_right = recording(&log, "setup-right");

    let left = failing(&log, "left", "left broke")
        .with_dependencies(vec![setup_left])
        .unwrap();
    let right = recording(&log, "right")
        .with_dependencies(vec![setup_right])
        .unwrap();

    let combined = left.and_then(&right);
    assert_eq!(combined.dependencies().len(), 2);
    assert!(!combined.is_interactive());

    assert_eq!(combined.run(), Err(Failure::new("left broke")));
    let order = entries(&log);
    assert!(order.contains(&"setup-left".to_string()));
    assert!(order.contains(&"setup-right".to_string()));
    assert!(!order.contains(&"right".to_string()));
}

#[test]
fn test_and_then_runs_both_on_success() {
    let log: Log = Arc::default();
    let combined = recording(&log, "first").and_then(&recording(&log, "second"));

    assert_eq!(combined.run(), Ok(()));
    assert_eq!(entries(&log), vec!["first", "second"]);
}

#[test]
fn test_parameterized_task_receives_arguments() {
    let log: Log = Arc::default();
    let setup = recording(&log, "setup");
    let seen = Arc::clone(&log);
    let deploy = ParameterizedTask::new(vec!["staging".into(), "prod".into()], move |args| {
        seen.lock().unwrap().push(format!("deploy {}", args.join(" ")));
        Ok(())
    })
    .with_description("deploy")
    .with_dependencies(vec![setup])
    .unwrap();

    assert!(deploy.invoke(&[]).is_err());
    assert!(entries(&log).is_empty());

    assert_eq!(deploy.invoke(&["prod".to_string()]), Ok(()));
    assert_eq!(entries(&log), vec!["setup", "deploy prod"]);
}

#[test]
fn test_panics_become_failures() {
    let log: Log = Arc::default();
    let a = recording(&log, "A");
    let exploding = Task::new(|| panic!("disk on fire"))
        .with_description("exploding")
        .with_dependencies(vec![a])
        .unwrap();
    let after = recording(&log, "after").with_dependencies(vec![exploding]).unwrap();

    let failure = after.run().unwrap_err();

    assert!(failure.message().contains("disk on fire"));
    assert_eq!(entries(&log), vec!["A"]);
}

#[test]
fn test_dependencies_only_run() {
    let log: Log = Arc::default();
    let a = recording(&log, "A");
    let b = recording(&log, "B").with_dependencies(vec![a]).unwrap();

    assert_eq!(b.run_dependencies_only(), Ok(()));
    assert_eq!(entries(&log), vec!["A"]);
}

#[cfg(unix)]
#[test]
fn test_project_run_report_marks_skipped_tasks() {
    let env = TestEnvironment::new();
    let builder = TestBuildBuilder::new("chain")
        .add_script_task("first", "echo first >> log.txt", &[])
        .add_failing_task("second", &["first"])
        .add_script_task("third", "echo third >> log.txt", &["second"]);
    let project = load(&env, &builder);

    let report = project.run("third", &[], RunMode::Full).unwrap();

    assert!(!report.is_successful());
    assert_eq!(report.get_task_result("first").unwrap().status, TaskStatus::Success);
    assert_eq!(report.get_task_result("second").unwrap().status, TaskStatus::Failed);
    assert_eq!(report.get_task_result("third").unwrap().status, TaskStatus::Skipped);
    assert_eq!(env.read_file("log.txt").trim(), "first");
}

#[cfg(unix)]
#[test]
fn test_project_deps_only_leaves_target_alone() {
    let env = TestEnvironment::new();
    let builder = TestBuildBuilder::new("chain")
        .add_script_task("first", "echo first >> log.txt", &[])
        .add_script_task("second", "echo second >> log.txt", &["first"]);
    let project = load(&env, &builder);

    let report = project.run("second", &[], RunMode::DependenciesOnly).unwrap();

    assert!(report.is_successful());
    assert!(report.get_task_result("second").is_none());
    assert_eq!(env.read_file("log.txt").trim(), "first");
}

#[test]
fn test_project_archive_names_are_relative_to_fileset_root() {
    let env = TestEnvironment::new();
    env.write_file("docs/index.md", "# index");
    env.write_file("docs/guide/intro.md", "# intro");
    env.write_file("docs/notes.txt", "skip me");

    let builder = TestBuildBuilder::new("archive")
        .with_fileset("docs", "{ roots: [docs], include: '*.md' }")
        .with_task(
            "package",
            "{ type: archive, config: { fileset: docs, output: dist/docs.tar.gz } }",
        );
    let project = load(&env, &builder);

    let report = project.run("package", &[], RunMode::Full).unwrap();
    assert!(report.is_successful(), "{:?}", report.outcome);
    assert!(!env.path().join("dist/docs.tar.gz.partial").exists());

    let file = fs::File::open(env.path().join("dist/docs.tar.gz")).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut names: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|entry| entry.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(names, vec!["guide/intro.md", "index.md"]);
}

#[test]
fn test_project_copy_then_prune() {
    let env = TestEnvironment::new();
    env.write_file("assets/logo.svg", "<svg/>");
    env.write_file("assets/fonts/mono.ttf", "font");

    let builder = TestBuildBuilder::new("site")
        .with_fileset("assets", "{ roots: [assets] }")
        .with_fileset("output", "{ roots: [public] }")
        .with_task(
            "publish",
            "{ type: copy, config: { fileset: assets, destination: public } }",
        )
        .with_task("clean", "{ type: prune, config: { fileset: output } }");
    let project = load(&env, &builder);

    assert!(project.run("publish", &[], RunMode::Full).unwrap().is_successful());
    assert_eq!(env.read_file("public/logo.svg"), "<svg/>");
    assert_eq!(env.read_file("public/fonts/mono.ttf"), "font");

    let report = project.run("clean", &[], RunMode::Full).unwrap();
    assert!(report.is_successful(), "{:?}", report.outcome);
    assert!(!env.path().join("public/logo.svg").exists());
    assert!(env.path().join("assets/logo.svg").exists());
}

#[test]
fn test_project_files_are_requeried() {
    let env = TestEnvironment::new();
    env.create_sample_tree();
    let builder = TestBuildBuilder::new("files")
        .with_fileset("texts", "{ roots: ['.'], include: '*.txt' }")
        .with_task("noop", "{ type: command, config: { command: 'true' } }");
    let project = load(&env, &builder);

    assert_eq!(project.files("texts").unwrap().unwrap().len(), 2);
    env.write_file("sub/d.txt", "d");
    assert_eq!(project.files("texts").unwrap().unwrap().len(), 3);
}
