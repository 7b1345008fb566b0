// ABOUTME: Gzip-compressed tar archive creation from explicit entry names
// ABOUTME: Writes to a partial file and renames it into place on success

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tar::Builder;
use tracing::{debug, info};

use super::files::create_parent;
use crate::outcome::{attempt_with_cleanup, Outcome};

pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveStats {
    pub files_archived: usize,
    pub bytes_processed: u64,
}

/// Archive every `(file, entry name)` pair into `output`.
///
/// The archive is written to `<output>.partial` and renamed into place once
/// complete. The partial file is removed on every exit path.
pub fn create_archive(
    output: &Path,
    entries: &[(PathBuf, String)],
    compression_level: u32,
) -> Outcome<ArchiveStats> {
    let partial = partial_path(output);
    let context = format!("creating archive {}", output.display());

    attempt_with_cleanup(
        &context,
        || write_archive(output, &partial, entries, compression_level),
        || remove_if_present(&partial),
    )
}

fn write_archive(
    output: &Path,
    partial: &Path,
    entries: &[(PathBuf, String)],
    compression_level: u32,
) -> io::Result<ArchiveStats> {
    create_parent(output)?;

    let file = File::create(partial)?;
    let encoder = GzEncoder::new(file, Compression::new(compression_level.min(9)));
    let mut tar_builder = Builder::new(encoder);

    let mut stats = ArchiveStats {
        files_archived: 0,
        bytes_processed: 0,
    };

    for (path, name) in entries {
        let size = fs::metadata(path)?.len();
        tar_builder.append_path_with_name(path, name)?;
        stats.files_archived += 1;
        stats.bytes_processed += size;
        debug!("Added to archive: {} ({} bytes)", name, size);
    }

    tar_builder.into_inner()?.finish()?;
    fs::rename(partial, output)?;

    info!(
        "Archived {} file(s), {} bytes into {}",
        stats.files_archived,
        stats.bytes_processed,
        output.display()
    );
    Ok(stats)
}

fn partial_path(output: &Path) -> PathBuf {
    let mut name = output.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
