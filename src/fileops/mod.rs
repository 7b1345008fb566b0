// ABOUTME: File input/output operations for build actions
// ABOUTME: Every entry point is trapped and returns an outcome instead of an error

pub mod archive;
pub mod files;

pub use archive::{create_archive, ArchiveStats, DEFAULT_COMPRESSION_LEVEL};
pub use files::{copy_all, copy_file, delete, prune, read_text, write_text};
