// ABOUTME: Command task implementation for running programs and shell scripts
// ABOUTME: Parameterized arguments are appended to the command line

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

use super::{parse_config, TaskImplementation};
use crate::engine::error::{ExecutionError, Result};
use crate::engine::{ParameterizedAction, TaskContext};
use crate::outcome::{Failure, Outcome};

pub struct CommandTask;

/// Configuration for command task execution
///
/// Either a program (`command` plus `args`) or a `script` run by `shell -c`.
/// Arguments given to a parameterized task are appended to `args`, or passed
/// to the script as positional parameters.
///
/// ```yaml
/// type: command
/// config:
///   command: cargo
///   args: [build, --release]
///   env:
///     RUSTFLAGS: "-D warnings"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default)]
    pub args: Vec<String>,

    #[serde(default)]
    pub script: Option<String>,

    #[serde(default = "default_shell")]
    pub shell: String,

    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory relative to the project root
    #[serde(default)]
    pub working_dir: Option<String>,

    #[serde(default = "default_expected_exit_codes")]
    pub expected_exit_codes: Vec<i32>,
}

fn default_shell() -> String {
    "/bin/sh".to_string()
}

fn default_expected_exit_codes() -> Vec<i32> {
    vec![0]
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            script: None,
            shell: default_shell(),
            env: HashMap::new(),
            working_dir: None,
            expected_exit_codes: default_expected_exit_codes(),
        }
    }
}

impl TaskImplementation for CommandTask {
    fn task_type(&self) -> &'static str {
        "command"
    }

    fn validate_config(&self, config: &serde_yaml::Value) -> Result<()> {
        let config: CommandConfig = parse_config("validation", "command", config)?;
        let invalid = |message: &str| ExecutionError::ConfigError {
            task_id: "validation".to_string(),
            message: message.to_string(),
        };

        match (&config.command, &config.script) {
            (None, None) => return Err(invalid("Either 'command' or 'script' must be provided")),
            (Some(_), Some(_)) => {
                return Err(invalid(
                    "Cannot specify both 'command' and 'script' - use only one",
                ))
            }
            (Some(command), None) if command.trim().is_empty() => {
                return Err(invalid("Command cannot be empty"))
            }
            (None, Some(script)) if script.trim().is_empty() => {
                return Err(invalid("Script cannot be empty"))
            }
            _ => {}
        }

        if config.script.is_some() && config.shell.is_empty() {
            return Err(invalid(
                "Shell interpreter cannot be empty when using script mode",
            ));
        }

        if config.expected_exit_codes.is_empty() {
            return Err(invalid("expected_exit_codes cannot be empty"));
        }

        Ok(())
    }

    fn create_action(
        &self,
        task_id: &str,
        config: &serde_yaml::Value,
        context: &TaskContext,
    ) -> Result<ParameterizedAction> {
        let config: CommandConfig = parse_config(task_id, "command", config)?;
        let working_dir = match config.working_dir {
            Some(ref dir) => context.resolve(dir)?.absolute().to_path_buf(),
            None => context.project_root.absolute().to_path_buf(),
        };

        let task_id = task_id.to_string();
        Ok(Arc::new(move |extra: &[String]| {
            run_command(&task_id, &config, &working_dir, extra)
        }))
    }
}

fn build_command(config: &CommandConfig, extra: &[String]) -> Option<Command> {
    let mut command = if let Some(ref script) = config.script {
        let mut command = Command::new(&config.shell);
        // `$0` for the script, then the caller's arguments as `$1`, `$2`, ...
        command.arg("-c").arg(script).arg("keystone").args(extra);
        command
    } else {
        let mut command = Command::new(config.command.as_ref()?);
        command.args(&config.args).args(extra);
        command
    };

    for (key, value) in &config.env {
        command.env(key, value);
    }
    Some(command)
}

fn run_command(
    task_id: &str,
    config: &CommandConfig,
    working_dir: &Path,
    extra: &[String],
) -> Outcome<()> {
    let Some(mut command) = build_command(config, extra) else {
        return Err(Failure::new(format!(
            "task '{}' has neither a command nor a script",
            task_id
        )));
    };
    command.current_dir(working_dir);

    info!("Executing command task: {}", task_id);
    debug!("Command: {:?}", command);

    let starting = format!("starting {:?}", command.get_program());
    let status = command
        .status()
        .map_err(|e| Failure::with_context(&starting, e))?;

    match status.code() {
        Some(code) if config.expected_exit_codes.contains(&code) => {
            debug!("Task {} exited with {}", task_id, code);
            Ok(())
        }
        Some(code) => Err(Failure::new(format!(
            "command exited with code {} (expected one of {:?})",
            code, config.expected_exit_codes
        ))),
        None => Err(Failure::new("command was terminated by a signal")),
    }
}
