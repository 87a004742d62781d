//! File wrapper over a store record.

use std::{path::Path, sync::Arc};

use crate::{
    project::{
        folder::ProjectFolder,
        store::{self, FileRecord, ProjectData},
    },
    Result,
};

/// An imported file inside a project.
///
/// The record holds both where the file came from and where its imported copy
/// lives inside the project data directory, plus the size and SHA-1 digest
/// captured at import time. Name, description and owning folder are the only
/// mutable parts; contents are immutable once imported.
pub struct ProjectFile {
    pub(crate) data: Arc<ProjectData>,
    pub(crate) record: Arc<FileRecord>,
}

impl ProjectFile {
    pub(crate) fn new(data: Arc<ProjectData>, record: Arc<FileRecord>) -> Self {
        Self { data, record }
    }

    /// Stable GUID identifier of this file.
    pub fn id(&self) -> &str {
        &self.record.id
    }

    /// Display name.
    pub fn name(&self) -> String {
        read_lock!(self.record.name).clone()
    }

    /// Set the display name.
    pub fn set_name(&self, name: &str) {
        *write_lock!(self.record.name) = name.to_string();
    }

    /// Free-form description.
    pub fn description(&self) -> String {
        read_lock!(self.record.description).clone()
    }

    /// Set the free-form description.
    pub fn set_description(&self, description: &str) {
        *write_lock!(self.record.description) = description.to_string();
    }

    /// Path the file was imported from, when it came from disk.
    pub fn source_path(&self) -> Option<&Path> {
        self.record.source_path.as_deref()
    }

    /// Location of the imported copy inside the project data directory.
    pub fn data_path(&self) -> &Path {
        &self.record.data_path
    }

    /// Size of the imported contents in bytes.
    pub fn size(&self) -> u64 {
        self.record.size
    }

    /// SHA-1 digest of the imported contents.
    pub fn sha1(&self) -> [u8; 20] {
        self.record.digest
    }

    /// Hex rendering of the content digest.
    pub fn sha1_hex(&self) -> String {
        store::digest_hex(&self.record.digest)
    }

    /// Read back the imported contents.
    ///
    /// # Errors
    /// Fails when the imported copy cannot be read.
    pub fn contents(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.record.data_path)?)
    }

    /// Owning folder, or `None` for a top-level file.
    ///
    /// Returns `None` as well when the recorded folder id no longer resolves
    /// to a live record.
    pub fn folder(&self) -> Option<ProjectFolder> {
        let folder_id = read_lock!(self.record.folder).clone()?;
        let record = self.data.folder(&folder_id)?;
        Some(ProjectFolder::new(self.data.clone(), record))
    }

    /// Move this file into `folder`, or to the top level with `None`.
    ///
    /// # Errors
    /// Fails with [`Error::DanglingHandle`](crate::Error::DanglingHandle)
    /// when `folder` is no longer part of the project, and with
    /// [`Error::Error`](crate::Error::Error) when it belongs to a different
    /// project.
    pub fn set_folder(&self, folder: Option<&ProjectFolder>) -> Result<()> {
        if let Some(folder) = folder {
            if !Arc::ptr_eq(&self.data, &folder.data) {
                return Err(crate::Error::Error(
                    "folder belongs to a different project".to_string(),
                ));
            }
        }
        self.data
            .set_file_folder(&self.record, folder.map(ProjectFolder::id))
    }

    /// Whether the file is still present in its project.
    pub fn exists(&self) -> bool {
        self.data.file(&self.record.id).is_some()
    }
}

impl Clone for ProjectFile {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            record: self.record.clone(),
        }
    }
}

impl PartialEq for ProjectFile {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.record.id == other.record.id
    }
}

impl Eq for ProjectFile {}

impl std::fmt::Debug for ProjectFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectFile")
            .field("id", &self.record.id)
            .field("name", &self.name())
            .field("size", &self.record.size)
            .field("folder", &*read_lock!(self.record.folder))
            .finish()
    }
}
