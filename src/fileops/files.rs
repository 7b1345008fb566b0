// ABOUTME: Single-file and batch file operations returning outcome values
// ABOUTME: Batch variants keep going past individual failures and report them all

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};

use crate::outcome::{attempt, attempt_unit, Failure, Outcome};

/// Read a UTF-8 text file.
pub fn read_text(path: &Path) -> Outcome<String> {
    attempt(&format!("reading {}", path.display()), || {
        fs::read_to_string(path)
    })
}

/// Write `content` as UTF-8, creating missing parent directories.
pub fn write_text(path: &Path, content: &str) -> Outcome<()> {
    attempt(&format!("writing {}", path.display()), || {
        write_text_inner(path, content)
    })
}

/// Copy one file, creating missing parent directories of `destination`.
pub fn copy_file(source: &Path, destination: &Path) -> Outcome<()> {
    attempt(&copy_context(source, destination), || {
        copy_file_inner(source, destination)
    })
}

/// Delete a file, or a directory together with its contents. A path that
/// does not exist is already deleted.
pub fn delete(path: &Path) -> Outcome<()> {
    attempt(&format!("deleting {}", path.display()), || delete_inner(path))
}

/// Delete every path, returning one failure per path that could not be removed.
pub fn prune<'a, I>(paths: I) -> Vec<Failure>
where
    I: IntoIterator<Item = &'a Path>,
{
    let mut failures = Vec::new();
    let mut deleted = 0usize;

    for path in paths {
        match attempt_unit(&format!("deleting {}", path.display()), || {
            delete_inner(path)
        }) {
            Some(failure) => failures.push(failure),
            None => deleted += 1,
        }
    }

    info!("Pruned {} path(s), {} failure(s)", deleted, failures.len());
    failures
}

/// Copy every `(source, destination)` pair, returning one failure per pair
/// that could not be copied.
pub fn copy_all<'a, I>(pairs: I) -> Vec<Failure>
where
    I: IntoIterator<Item = (&'a Path, &'a Path)>,
{
    let mut failures = Vec::new();
    let mut copied = 0usize;

    for (source, destination) in pairs {
        match attempt_unit(&copy_context(source, destination), || {
            copy_file_inner(source, destination)
        }) {
            Some(failure) => failures.push(failure),
            None => copied += 1,
        }
    }

    info!("Copied {} file(s), {} failure(s)", copied, failures.len());
    failures
}

fn copy_context(source: &Path, destination: &Path) -> String {
    format!("copying {} to {}", source.display(), destination.display())
}

fn write_text_inner(path: &Path, content: &str) -> io::Result<()> {
    create_parent(path)?;
    fs::write(path, content.as_bytes())
}

fn copy_file_inner(source: &Path, destination: &Path) -> io::Result<()> {
    create_parent(destination)?;
    let bytes = fs::copy(source, destination)?;
    debug!("Copied {} ({} bytes)", source.display(), bytes);
    Ok(())
}

fn delete_inner(path: &Path) -> io::Result<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path)?;
    } else {
        fs::remove_file(path)?;
    }
    debug!("Deleted {}", path.display());
    Ok(())
}

pub(crate) fn create_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
