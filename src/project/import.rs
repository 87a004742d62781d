//! Bulk import of a directory tree into a project.
//!
//! Directory structure is mirrored as project folders and every regular file
//! becomes an imported project file. Hashing and copying run in parallel;
//! per-entry failures are collected into the report instead of aborting the
//! whole import.

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use rayon::prelude::*;
use tracing::warn;

use crate::{
    project::store::{self, ProjectData},
    Error, Result,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Options controlling [`Project::import_directory`](crate::project::Project::import_directory).
    pub struct ImportFlags: u8 {
        /// Descend into symbolic links instead of skipping them.
        const FOLLOW_SYMLINKS = 0x01;
        /// Skip dotfiles and dot-directories.
        const SKIP_HIDDEN = 0x02;
        /// Import every file directly under the target folder, without
        /// recreating the directory structure.
        const FLATTEN = 0x04;
    }
}

/// Outcome of a bulk directory import.
///
/// Mirrors the loading-report shape used elsewhere in this codebase: the ids
/// of everything imported, what was skipped by policy, and per-entry failure
/// details for everything that could not be imported.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Ids of the files imported, in source-walk order.
    pub imported: Vec<String>,
    /// Entries skipped by policy (symlinks, hidden files).
    pub skipped: Vec<PathBuf>,
    /// Entries that failed to import (path and error message).
    pub failed: Vec<(PathBuf, String)>,
}

impl ImportReport {
    /// Number of files imported.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.imported.len()
    }

    /// Number of entries that failed to import.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Whether every discovered entry was imported.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One regular file discovered by the walk, with the project folder that
/// will own it.
struct PendingFile {
    source: PathBuf,
    name: String,
    folder: Option<String>,
}

pub(crate) fn import_directory(
    data: &ProjectData,
    src_dir: &Path,
    parent: Option<&str>,
    flags: ImportFlags,
) -> Result<ImportReport> {
    if !src_dir.is_dir() {
        return Err(Error::Error(format!(
            "Import source is not a directory: {}",
            src_dir.display()
        )));
    }

    let mut report = ImportReport::default();
    let mut pending = Vec::new();
    walk(
        data,
        src_dir,
        parent.map(str::to_string),
        flags,
        &mut pending,
        &mut report,
    )?;

    let results: Vec<(PathBuf, Result<String>)> = pending
        .par_iter()
        .map(|entry| {
            let outcome = store::read_for_import(&entry.source).and_then(|bytes| {
                data.add_file_record(
                    &bytes,
                    Some(entry.source.clone()),
                    entry.folder.as_deref(),
                    &entry.name,
                )
                .map(|record| record.id.clone())
            });
            (entry.source.clone(), outcome)
        })
        .collect();

    for (source, outcome) in results {
        match outcome {
            Ok(id) => report.imported.push(id),
            Err(err) => {
                warn!(path = %source.display(), %err, "import failed");
                report.failed.push((source, err.to_string()));
            }
        }
    }

    Ok(report)
}

/// Depth-first walk creating folders and queueing files.
fn walk(
    data: &ProjectData,
    dir: &Path,
    folder: Option<String>,
    flags: ImportFlags,
    pending: &mut Vec<PendingFile>,
    report: &mut ImportReport,
) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(std::fs::DirEntry::file_name);

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        if flags.contains(ImportFlags::SKIP_HIDDEN) && name.starts_with('.') {
            report.skipped.push(path);
            continue;
        }

        let metadata = std::fs::symlink_metadata(&path)?;
        if metadata.is_symlink() && !flags.contains(ImportFlags::FOLLOW_SYMLINKS) {
            report.skipped.push(path);
            continue;
        }

        if path.is_dir() {
            let child = if flags.contains(ImportFlags::FLATTEN) {
                folder.clone()
            } else {
                Some(data.add_folder_record(folder.as_deref(), &name)?.id.clone())
            };
            walk(data, &path, child, flags, pending, report)?;
        } else if path.is_file() {
            pending.push(PendingFile {
                source: path,
                name,
                folder: folder.clone(),
            });
        } else {
            report.skipped.push(path);
        }
    }

    Ok(())
}
