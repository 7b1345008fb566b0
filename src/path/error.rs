// ABOUTME: Error types for path construction and file-set evaluation
// ABOUTME: Covers component validation, base-marker misuse and directory traversal

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Invalid path component '{component}': {reason}")]
    InvalidComponent { component: String, reason: String },

    #[error("Cannot mark '{path}' as a base: '{existing}' is already marked")]
    DuplicateBaseMarker { path: PathBuf, existing: PathBuf },

    #[error("Path is not absolute: {0}")]
    NotAbsolute(PathBuf),

    #[error("Unsupported component '{component}' in {path}")]
    UnsupportedComponent { path: PathBuf, component: String },

    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),

    #[error("Path {path} is not below {base}")]
    NotDescendant { path: PathBuf, base: PathBuf },

    #[error("Failed to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Symbolic link {link} points back into {target}")]
    LinkCycle { link: PathBuf, target: PathBuf },

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("File set source failed: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, PathError>;
