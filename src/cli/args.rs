// ABOUTME: Command line argument definitions and parsing using Clap
// ABOUTME: Defines the main CLI structure and subcommands for keystone

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "keystone")]
#[command(about = "Run build tasks declared in a YAML build file")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(short, long, global = true, help = "Path to configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, help = "Disable colored output")]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a task and everything it depends on
    Run {
        #[arg(help = "Name of the task to run")]
        task: String,

        #[arg(help = "Arguments for a parameterized task")]
        arguments: Vec<String>,

        #[arg(short, long, help = "Path to build file")]
        file: Option<PathBuf>,

        #[arg(long, help = "Run only the task's dependencies")]
        deps_only: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Report format")]
        format: OutputFormat,
    },

    /// List the tasks and file sets of a build file
    List {
        #[arg(short, long, help = "Path to build file")]
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Listing format")]
        format: OutputFormat,
    },

    /// Show the files a named file set currently selects
    Files {
        #[arg(help = "Name of the file set")]
        fileset: String,

        #[arg(short, long, help = "Path to build file")]
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Listing format")]
        format: OutputFormat,
    },

    /// Validate a build file without running anything
    Validate {
        #[arg(short, long, help = "Path to build file")]
        file: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text, help = "Report format")]
        format: OutputFormat,
    },
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_arguments() {
        let args = Args::try_parse_from([
            "keystone", "run", "deploy", "prod", "eu", "-f", "build.yaml", "--format", "json",
        ])
        .unwrap();

        match args.command {
            Commands::Run {
                task,
                arguments,
                file,
                deps_only,
                format,
            } => {
                assert_eq!(task, "deploy");
                assert_eq!(arguments, vec!["prod", "eu"]);
                assert_eq!(file, Some(PathBuf::from("build.yaml")));
                assert!(!deps_only);
                assert_eq!(format, OutputFormat::Json);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = Args::try_parse_from(["keystone", "list", "-v", "--no-color"]).unwrap();
        assert!(args.verbose);
        assert!(args.no_color);
        assert!(matches!(args.command, Commands::List { .. }));
    }

    #[test]
    fn test_files_requires_fileset() {
        assert!(Args::try_parse_from(["keystone", "files"]).is_err());
    }
}
