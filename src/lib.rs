// ABOUTME: Main library module for the keystone build orchestration core
// ABOUTME: Exports all core modules and provides the public API

pub mod cli;
pub mod engine;
pub mod fileops;
pub mod outcome;
pub mod output;
pub mod parser;
pub mod path;
pub mod tasks;
pub mod testing;

// Re-export commonly used types
pub use cli::{App, Args, Config};
pub use engine::{
    run_tasks, run_with_report, ParameterizedTask, Project, RunMode, RunReport, Task, TaskStatus,
};
pub use outcome::{attempt, attempt_unit, attempt_with_cleanup, Failure, Outcome};
pub use parser::{BuildFile, BuildValidator, TaskConfig};
pub use path::{run_file_set, BuildPath, FileSet, NameFilter};
pub use testing::{TestAdapter, TestDeclaration, TestStatus};

// Error handling
pub type Result<T> = anyhow::Result<T>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
