// ABOUTME: Path identity model and the lazy file-set query algebra built on it
// ABOUTME: Exports path values, name filters and file-set expressions

pub mod error;
pub mod filter;
pub mod finder;
pub mod identity;

pub use error::{PathError, Result};
pub use filter::NameFilter;
pub use finder::{run_file_set, FileSet};
pub use identity::{normalize, BuildPath};
