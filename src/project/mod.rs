//! On-disk project container: imported files organized in a folder tree.
//!
//! A project is a directory holding a manifest (`project.xml`) and a data
//! directory with the imported contents of every file added to it. This
//! module provides the [`Project`] container plus the [`ProjectFolder`] and
//! [`ProjectFile`] wrappers over its records.
//!
//! # Architecture
//!
//! Records live in concurrent id-keyed tables owned by the shared store;
//! wrappers hold the store plus a strong reference to their record, so they
//! are cheap to clone, compare by identity, and stay readable after deletion
//! without keeping the deleted entity in the tree. The folder relation is a
//! forest — every mutation that could introduce a parent cycle is rejected
//! at the store boundary rather than trusted to callers.
//!
//! # Ordering
//!
//! [`Project::folders`] and [`Project::files`] return deterministic
//! id-ordered snapshots. [`Project::sorted_folders`] returns the
//! ancestors-first display order; see the ordering notes in this module's
//! sort implementation for the exact total order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use binscope::project::Project;
//!
//! let project = Project::create("/tmp/teardown.bsproj", "router teardown")?;
//! let vendor = project.add_folder(None, "vendor")?;
//! project.add_file("/firmware/boot.bin", Some(&vendor), "boot.bin")?;
//! project.save()?;
//!
//! for folder in project.sorted_folders()? {
//!     println!("{} {}", folder.id(), folder.name());
//! }
//! # Ok::<(), binscope::Error>(())
//! ```

mod file;
mod folder;
mod import;
mod manifest;
mod order;
pub(crate) mod store;

use std::{path::Path, sync::Arc};

use crate::{Error, Result};

pub use file::ProjectFile;
pub use folder::ProjectFolder;
pub use import::{ImportFlags, ImportReport};

use store::ProjectData;

/// An on-disk project: a named container of imported files and the folder
/// forest organizing them.
///
/// `Project` is a shared handle; clones refer to the same store. All
/// operations are synchronous and safe to call from multiple threads.
///
/// # Lifecycle
///
/// [`Project::create`] lays out a fresh project directory,
/// [`Project::open`] rebuilds one from its manifest, and [`Project::save`]
/// persists the current record state. Imported file contents are written at
/// import time and are not rewritten by `save`.
pub struct Project {
    data: Arc<ProjectData>,
}

impl Project {
    /// Create a new project at `path`.
    ///
    /// Lays out the project directory (manifest plus data directory) and
    /// writes an initial manifest.
    ///
    /// # Errors
    /// Fails when `path` already contains a project manifest, when `name` is
    /// empty, or on I/O errors.
    pub fn create<P: AsRef<Path>>(path: P, name: &str) -> Result<Self> {
        let path = path.as_ref();
        if name.trim().is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }
        if path.join(store::MANIFEST_FILE).exists() {
            return Err(Error::Error(format!(
                "Path already contains a project: {}",
                path.display()
            )));
        }
        std::fs::create_dir_all(path.join(store::DATA_DIR))?;

        let project = Self {
            data: Arc::new(ProjectData::new(path.to_path_buf(), name.to_string())),
        };
        project.save()?;
        Ok(project)
    }

    /// Open an existing project at `path`.
    ///
    /// # Errors
    /// Fails when the manifest is missing, unreadable, malformed, or
    /// references records that are not present.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            data: Arc::new(manifest::load(path.as_ref())?),
        })
    }

    /// Persist the current record state to the manifest.
    ///
    /// # Errors
    /// Fails on I/O or serialization errors; the previous manifest contents
    /// are not guaranteed to survive a failed write.
    pub fn save(&self) -> Result<()> {
        manifest::save(&self.data)
    }

    /// Root directory of the project on disk.
    pub fn path(&self) -> &Path {
        &self.data.path
    }

    /// Display name.
    pub fn name(&self) -> String {
        read_lock!(self.data.name).clone()
    }

    /// Set the display name.
    pub fn set_name(&self, name: &str) {
        *write_lock!(self.data.name) = name.to_string();
    }

    /// Free-form description.
    pub fn description(&self) -> String {
        read_lock!(self.data.description).clone()
    }

    /// Set the free-form description.
    pub fn set_description(&self, description: &str) {
        *write_lock!(self.data.description) = description.to_string();
    }

    /// Create a folder under `parent`, or at the root with `None`.
    ///
    /// # Errors
    /// Fails when `name` is empty, when `parent` is no longer part of this
    /// project, or when it belongs to a different project.
    pub fn add_folder(&self, parent: Option<&ProjectFolder>, name: &str) -> Result<ProjectFolder> {
        if let Some(parent) = parent {
            self.check_same_store(&parent.data, "parent folder")?;
        }
        let record = self
            .data
            .add_folder_record(parent.map(ProjectFolder::id), name)?;
        Ok(ProjectFolder::new(self.data.clone(), record))
    }

    /// Import the file at `src_path` into `folder` under `name`.
    ///
    /// The contents are copied into the project data directory and digested;
    /// later changes to the source file do not affect the project.
    ///
    /// # Errors
    /// Fails when the source cannot be read, when `name` is empty, or when
    /// `folder` is stale or foreign.
    pub fn add_file<P: AsRef<Path>>(
        &self,
        src_path: P,
        folder: Option<&ProjectFolder>,
        name: &str,
    ) -> Result<ProjectFile> {
        if let Some(folder) = folder {
            self.check_same_store(&folder.data, "folder")?;
        }
        let src_path = src_path.as_ref();
        let bytes = store::read_for_import(src_path)?;
        let record = self.data.add_file_record(
            &bytes,
            Some(src_path.to_path_buf()),
            folder.map(ProjectFolder::id),
            name,
        )?;
        Ok(ProjectFile::new(self.data.clone(), record))
    }

    /// Import in-memory contents as a new file.
    ///
    /// # Errors
    /// Fails when `name` is empty, when `folder` is stale or foreign, or on
    /// I/O errors writing the imported copy.
    pub fn add_file_from_bytes(
        &self,
        bytes: &[u8],
        folder: Option<&ProjectFolder>,
        name: &str,
    ) -> Result<ProjectFile> {
        if let Some(folder) = folder {
            self.check_same_store(&folder.data, "folder")?;
        }
        let record = self
            .data
            .add_file_record(bytes, None, folder.map(ProjectFolder::id), name)?;
        Ok(ProjectFile::new(self.data.clone(), record))
    }

    /// Import a directory tree; see [`ImportFlags`] for the policy knobs.
    ///
    /// # Errors
    /// Fails when `src_dir` is not a directory or on I/O errors during the
    /// walk. Per-file failures do not abort the import; they are collected
    /// in the returned [`ImportReport`].
    pub fn import_directory<P: AsRef<Path>>(
        &self,
        src_dir: P,
        parent: Option<&ProjectFolder>,
        flags: ImportFlags,
    ) -> Result<ImportReport> {
        if let Some(parent) = parent {
            self.check_same_store(&parent.data, "parent folder")?;
        }
        import::import_directory(
            &self.data,
            src_dir.as_ref(),
            parent.map(ProjectFolder::id),
            flags,
        )
    }

    /// All folders, ordered by id.
    pub fn folders(&self) -> Vec<ProjectFolder> {
        self.data
            .folders
            .iter()
            .map(|entry| ProjectFolder::new(self.data.clone(), entry.value().clone()))
            .collect()
    }

    /// All files, ordered by id.
    pub fn files(&self) -> Vec<ProjectFile> {
        self.data
            .files
            .iter()
            .map(|entry| ProjectFile::new(self.data.clone(), entry.value().clone()))
            .collect()
    }

    /// Look up a folder by id.
    pub fn folder_by_id(&self, id: &str) -> Option<ProjectFolder> {
        self.data
            .folder(id)
            .map(|record| ProjectFolder::new(self.data.clone(), record))
    }

    /// Look up a file by id.
    pub fn file_by_id(&self, id: &str) -> Option<ProjectFile> {
        self.data
            .file(id)
            .map(|record| ProjectFile::new(self.data.clone(), record))
    }

    /// All folders in display order: ancestors strictly before descendants,
    /// roots ordered by id, and a deterministic order between unrelated
    /// subtrees.
    ///
    /// # Errors
    /// Fails with [`Error::DanglingHandle`] when a folder references a
    /// parent that is no longer part of the project — a construction error,
    /// detected before any ordering work happens — and with
    /// [`Error::CycleDetected`] on externally corrupted parent chains.
    pub fn sorted_folders(&self) -> Result<Vec<ProjectFolder>> {
        Ok(order::sorted_folder_records(&self.data)?
            .into_iter()
            .map(|record| ProjectFolder::new(self.data.clone(), record))
            .collect())
    }

    /// Delete a folder, its descendant folders and all contained files.
    ///
    /// Returns `false` when the folder is already gone; the wrapper itself
    /// stays readable either way.
    pub fn delete_folder(&self, folder: &ProjectFolder) -> bool {
        Arc::ptr_eq(&self.data, &folder.data) && self.data.delete_folder_recursive(folder.id())
    }

    /// Delete a file record and its imported copy.
    ///
    /// Returns `false` when the file is already gone.
    pub fn delete_file(&self, file: &ProjectFile) -> bool {
        Arc::ptr_eq(&self.data, &file.data) && self.data.delete_file(file.id())
    }

    fn check_same_store(&self, other: &Arc<ProjectData>, what: &str) -> Result<()> {
        if Arc::ptr_eq(&self.data, other) {
            Ok(())
        } else {
            Err(Error::Error(format!(
                "{what} belongs to a different project"
            )))
        }
    }
}

impl Clone for Project {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
        }
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl Eq for Project {}

impl std::fmt::Debug for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Project")
            .field("path", &self.data.path)
            .field("name", &self.name())
            .field("folders", &self.data.folders.len())
            .field("files", &self.data.files.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{deep_folder_chain, scratch_project};

    #[test]
    fn create_rejects_double_init() {
        let dir = tempfile::tempdir().unwrap();
        let _first = scratch_project(dir.path());
        assert!(Project::create(dir.path().join("scratch.bsproj"), "again").is_err());
    }

    #[test]
    fn add_folder_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let project = scratch_project(dir.path());

        let parent = project.add_folder(None, "vendor").unwrap();
        let child = project.add_folder(Some(&parent), "zlib").unwrap();

        let folders = project.folders();
        assert_eq!(folders.len(), 2);
        let found = project.folder_by_id(child.id()).unwrap();
        assert_eq!(found.name(), "zlib");
        assert_eq!(found.parent().unwrap(), parent);
    }

    #[test]
    fn foreign_parent_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let a = Project::create(dir.path().join("a.bsproj"), "a").unwrap();
        let b = Project::create(dir.path().join("b.bsproj"), "b").unwrap();
        let folder = b.add_folder(None, "theirs").unwrap();

        assert!(a.add_folder(Some(&folder), "mine").is_err());
    }

    #[test]
    fn file_import_copies_and_digests() {
        let dir = tempfile::tempdir().unwrap();
        let project = scratch_project(dir.path());

        let file = project
            .add_file_from_bytes(b"\x7fELF-ish", None, "sample.bin")
            .unwrap();
        assert_eq!(file.size(), 8);
        assert_eq!(file.contents().unwrap(), b"\x7fELF-ish");
        assert!(file.data_path().starts_with(project.path()));
        assert_eq!(file.sha1_hex().len(), 40);
    }

    #[test]
    fn delete_file_removes_copy() {
        let dir = tempfile::tempdir().unwrap();
        let project = scratch_project(dir.path());
        let file = project.add_file_from_bytes(b"bytes", None, "f").unwrap();
        let copy = file.data_path().to_path_buf();

        assert!(copy.exists());
        assert!(project.delete_file(&file));
        assert!(!copy.exists());
        assert!(!file.exists());
        assert!(!project.delete_file(&file));
    }

    #[test]
    fn sorted_folders_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let project = scratch_project(dir.path());

        // Two roots and one child; roots order by id, the child after its root.
        let a = project.add_folder(None, "a").unwrap();
        let b = project.add_folder(None, "b").unwrap();
        let c = project.add_folder(Some(&a), "c").unwrap();

        let sorted = project.sorted_folders().unwrap();
        let pos = |f: &ProjectFolder| sorted.iter().position(|s| s == f).unwrap();
        assert!(pos(&a) < pos(&c), "ancestor must come first");
        let (first_root, second_root) = if a.id() < b.id() { (&a, &b) } else { (&b, &a) };
        assert!(pos(first_root) < pos(second_root));
    }

    #[test]
    fn deep_chains_keep_ancestor_order() {
        let dir = tempfile::tempdir().unwrap();
        let project = scratch_project(dir.path());
        let ids = deep_folder_chain(&project, 24);

        let sorted = project.sorted_folders().unwrap();
        let positions: Vec<usize> = ids
            .iter()
            .map(|id| sorted.iter().position(|f| f.id() == id).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn save_and_open_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rt.bsproj");
        let original = Project::create(&path, "round trip").unwrap();
        original.set_description("imported firmware");

        let vendor = original.add_folder(None, "vendor").unwrap();
        let nested = original.add_folder(Some(&vendor), "nested").unwrap();
        let file = original
            .add_file_from_bytes(b"contents", Some(&nested), "blob.bin")
            .unwrap();
        original.save().unwrap();

        let reopened = Project::open(&path).unwrap();
        assert_eq!(reopened.name(), "round trip");
        assert_eq!(reopened.description(), "imported firmware");
        assert_eq!(reopened.folders().len(), 2);

        let file_again = reopened.file_by_id(file.id()).unwrap();
        assert_eq!(file_again.name(), "blob.bin");
        assert_eq!(file_again.sha1(), file.sha1());
        assert_eq!(file_again.folder().unwrap().name(), "nested");
        assert_eq!(file_again.contents().unwrap(), b"contents");

        // Fresh ids keep minting past the persisted ones.
        let extra = reopened.add_folder(None, "extra").unwrap();
        assert!(reopened.folder_by_id(extra.id()).is_some());
        assert_ne!(extra.id(), vendor.id());
        assert_ne!(extra.id(), nested.id());
    }

    #[test]
    fn open_rejects_garbage_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.bsproj");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("project.xml"), "<not-a-project/>").unwrap();

        assert!(matches!(
            Project::open(&path),
            Err(Error::Malformed { .. })
        ));
    }
}
