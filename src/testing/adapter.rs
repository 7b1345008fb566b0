// ABOUTME: Test adapter capability interface, subprocess adapter and registry
// ABOUTME: Dispatches each declared test to the adapter serving its superclass

use std::collections::HashMap;
use std::convert::Infallible;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::declaration::TestDeclaration;
use super::error::{Result, TestingError};
use super::status::{TestResult, TestStatus, TestSummary};
use crate::outcome;
use crate::parser::AdapterConfig;

/// Placeholder replaced by the test class name in adapter commands.
pub const TEST_PLACEHOLDER: &str = "{test}";

/// Runs one test class for the test library it was written against.
pub trait TestAdapter: Send + Sync {
    fn name(&self) -> &str;
    /// The superclass identifier this adapter serves.
    fn superclass(&self) -> &str;
    fn is_module_style(&self) -> bool;
    fn run_one(&self, class_name: &str) -> TestStatus;
}

/// Runs each test in its own subprocess, so a missing test library only
/// affects the tests that need it.
///
/// Exit code 0 is a pass and 1 a failure. Any other exit, a signal or a
/// failure to spawn is an error.
pub struct CommandAdapter {
    name: String,
    superclass: String,
    module: bool,
    command: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl CommandAdapter {
    pub fn new(
        name: impl Into<String>,
        superclass: impl Into<String>,
        module: bool,
        command: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            superclass: superclass.into(),
            module,
            command,
            working_dir: None,
        }
    }

    pub fn from_config(config: &AdapterConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.superclass.clone(),
            config.module,
            config.command.clone(),
        )
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    fn command_for(&self, class_name: &str) -> Option<Command> {
        let (program, args) = self.command.split_first()?;
        let mut command = Command::new(program.replace(TEST_PLACEHOLDER, class_name));
        command.args(args.iter().map(|arg| arg.replace(TEST_PLACEHOLDER, class_name)));
        command.stdin(Stdio::null());
        if let Some(ref dir) = self.working_dir {
            command.current_dir(dir);
        }
        Some(command)
    }
}

impl TestAdapter for CommandAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn superclass(&self) -> &str {
        &self.superclass
    }

    fn is_module_style(&self) -> bool {
        self.module
    }

    fn run_one(&self, class_name: &str) -> TestStatus {
        let Some(mut command) = self.command_for(class_name) else {
            warn!("Test adapter {} has no command configured", self.name);
            return TestStatus::Error;
        };

        debug!("Adapter {} running {:?}", self.name, command);
        match command.status() {
            Ok(status) => match status.code() {
                Some(0) => TestStatus::Passed,
                Some(1) => TestStatus::Failed,
                other => {
                    warn!(
                        "Test {} ended abnormally under {} (exit code: {:?})",
                        class_name, self.name, other
                    );
                    TestStatus::Error
                }
            },
            Err(e) => {
                warn!("Failed to start test adapter {}: {}", self.name, e);
                TestStatus::Error
            }
        }
    }
}

/// Adapters keyed by the superclass they serve and their module style.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<(String, bool), Arc<dyn TestAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build command adapters for every configured entry, run from `working_dir`.
    pub fn from_configs(configs: &[AdapterConfig], working_dir: impl Into<PathBuf>) -> Result<Self> {
        let working_dir = working_dir.into();
        let mut registry = Self::new();
        for config in configs {
            let adapter = CommandAdapter::from_config(config).with_working_dir(working_dir.clone());
            registry.register(Arc::new(adapter))?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, adapter: Arc<dyn TestAdapter>) -> Result<()> {
        let key = (adapter.superclass().to_string(), adapter.is_module_style());
        if self.adapters.contains_key(&key) {
            return Err(TestingError::DuplicateAdapter {
                name: adapter.name().to_string(),
                superclass: key.0,
            });
        }
        self.adapters.insert(key, adapter);
        Ok(())
    }

    pub fn get(&self, superclass: &str, module: bool) -> Option<&Arc<dyn TestAdapter>> {
        self.adapters.get(&(superclass.to_string(), module))
    }

    pub fn find(&self, declaration: &TestDeclaration) -> Result<&Arc<dyn TestAdapter>> {
        self.get(&declaration.superclass, declaration.module)
            .ok_or_else(|| TestingError::NoAdapter {
                superclass: declaration.superclass.clone(),
                style: if declaration.module { "module" } else { "class" },
            })
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Run every declaration through its adapter. A missing adapter or a
/// panicking adapter records an error for that test and the run continues.
pub fn run_declared(registry: &AdapterRegistry, declarations: &[TestDeclaration]) -> TestSummary {
    let mut summary = TestSummary::new();

    for declaration in declarations {
        let result = match registry.find(declaration) {
            Ok(adapter) => {
                let context = format!("test '{}'", declaration.class_name);
                match outcome::attempt(&context, || {
                    Ok::<_, Infallible>(adapter.run_one(&declaration.class_name))
                }) {
                    Ok(status) => TestResult::new(
                        declaration.clone(),
                        Some(adapter.name().to_string()),
                        status,
                    ),
                    Err(failure) => TestResult::new(
                        declaration.clone(),
                        Some(adapter.name().to_string()),
                        TestStatus::Error,
                    )
                    .with_detail(failure.message()),
                }
            }
            Err(e) => {
                warn!("{}", e);
                TestResult::new(declaration.clone(), None, TestStatus::Error)
                    .with_detail(e.to_string())
            }
        };

        info!("Test {}: {}", declaration.class_name, result.status);
        summary.add_result(result);
    }

    summary
}
