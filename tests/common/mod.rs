// ABOUTME: Common utilities and helpers for integration tests
// ABOUTME: Provides scratch source trees and a builder for YAML build files

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use keystone::path::BuildPath;

pub struct TestBuildBuilder {
    name: String,
    filesets: Vec<(String, String)>,
    adapters: Vec<String>,
    tasks: Vec<(String, String)>,
}

impl TestBuildBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            filesets: Vec::new(),
            adapters: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Add a file set given as an inline YAML mapping.
    pub fn with_fileset(mut self, name: &str, mapping: &str) -> Self {
        self.filesets.push((name.to_string(), mapping.to_string()));
        self
    }

    /// Add a test adapter given as an inline YAML mapping.
    pub fn with_adapter(mut self, mapping: &str) -> Self {
        self.adapters.push(mapping.to_string());
        self
    }

    /// Add a task given as an inline YAML mapping.
    pub fn with_task(mut self, name: &str, mapping: &str) -> Self {
        self.tasks.push((name.to_string(), mapping.to_string()));
        self
    }

    pub fn add_script_task(self, name: &str, script: &str, depends_on: &[&str]) -> Self {
        let mapping = format!(
            "{{ type: command, depends_on: [{}], config: {{ script: '{}' }} }}",
            depends_on.join(", "),
            script.replace('\'', "''")
        );
        self.with_task(name, &mapping)
    }

    pub fn add_failing_task(self, name: &str, depends_on: &[&str]) -> Self {
        self.add_script_task(name, "exit 1", depends_on)
    }

    pub fn generate_yaml(&self) -> String {
        let mut yaml = format!("name: {}\nroot: .\n", self.name);

        if !self.filesets.is_empty() {
            yaml.push_str("filesets:\n");
            for (name, mapping) in &self.filesets {
                yaml.push_str(&format!("  {}: {}\n", name, mapping));
            }
        }

        if !self.adapters.is_empty() {
            yaml.push_str("test_adapters:\n");
            for mapping in &self.adapters {
                yaml.push_str(&format!("  - {}\n", mapping));
            }
        }

        yaml.push_str("tasks:\n");
        for (name, mapping) in &self.tasks {
            yaml.push_str(&format!("  {}: {}\n", name, mapping));
        }

        yaml
    }

    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        fs::write(path, self.generate_yaml())
    }
}

pub struct TestEnvironment {
    pub temp_dir: TempDir,
}

impl TestEnvironment {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root of the scratch tree as a path identity.
    pub fn root(&self) -> BuildPath {
        BuildPath::root(self.path()).expect("temp directory is absolute")
    }

    /// Write `content` at a `/`-separated location, creating directories.
    pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create directories");
        }
        fs::write(&path, content).expect("Failed to write file");
        path
    }

    pub fn read_file(&self, relative: &str) -> String {
        fs::read_to_string(self.path().join(relative)).expect("Failed to read file")
    }

    /// The tree `root/{a.txt, sub/{b.txt, c.log}}`.
    pub fn create_sample_tree(&self) {
        self.write_file("a.txt", "a");
        self.write_file("sub/b.txt", "b");
        self.write_file("sub/c.log", "c");
    }

    pub fn build_file(&self, builder: &TestBuildBuilder) -> PathBuf {
        let path = self.path().join("keystone.build.yaml");
        builder
            .write_to_file(&path)
            .expect("Failed to write build file");
        path
    }
}

/// Names of `paths` relative to `root`, sorted.
pub fn relative_names(paths: impl IntoIterator<Item = BuildPath>, root: &BuildPath) -> Vec<String> {
    let mut names: Vec<String> = paths
        .into_iter()
        .map(|path| {
            path.relative_to(root.absolute())
                .expect("path is below the root")
        })
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_builder() {
        let builder = TestBuildBuilder::new("demo")
            .with_fileset("docs", "{ roots: [docs] }")
            .add_script_task("first", "echo it's", &[])
            .add_failing_task("second", &["first"]);

        let yaml = builder.generate_yaml();

        assert!(yaml.contains("name: demo"));
        assert!(yaml.contains("  docs: { roots: [docs] }"));
        assert!(yaml.contains("depends_on: [first]"));
        assert!(yaml.contains("'echo it''s'"));
        keystone::parser::BuildFile::from_yaml(&yaml).unwrap();
    }

    #[test]
    fn test_environment_setup() {
        let env = TestEnvironment::new();
        env.create_sample_tree();
        assert!(env.path().join("sub/c.log").exists());
        assert_eq!(env.read_file("a.txt"), "a");
    }
}
