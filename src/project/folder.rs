//! Folder wrapper over a store record.

use std::sync::Arc;

use crate::{
    project::{
        order,
        store::{FolderRecord, ProjectData},
    },
    Result,
};

/// A folder inside a project.
///
/// Wrappers are cheap clones of a strong record reference plus the owning
/// store; a wrapper stays readable even after its folder was deleted from the
/// project (the record lives as long as any holder), while tree operations
/// act on the live table. Two wrappers are equal when they refer to the same
/// record of the same project.
///
/// # Examples
///
/// ```rust,no_run
/// use binscope::project::Project;
///
/// let project = Project::create("/tmp/demo.bsproj", "demo")?;
/// let vendor = project.add_folder(None, "vendor")?;
/// let zlib = project.add_folder(Some(&vendor), "zlib")?;
/// assert_eq!(zlib.parent().as_ref().map(|f| f.id().to_string()), Some(vendor.id().to_string()));
/// assert!(vendor.is_ancestor_of(&zlib));
/// # Ok::<(), binscope::Error>(())
/// ```
pub struct ProjectFolder {
    pub(crate) data: Arc<ProjectData>,
    pub(crate) record: Arc<FolderRecord>,
}

impl ProjectFolder {
    pub(crate) fn new(data: Arc<ProjectData>, record: Arc<FolderRecord>) -> Self {
        Self { data, record }
    }

    /// Stable GUID identifier of this folder.
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

    /// Parent folder, or `None` for a root folder.
    ///
    /// Returns `None` as well when the recorded parent id no longer resolves
    /// to a live record.
    pub fn parent(&self) -> Option<ProjectFolder> {
        let parent_id = read_lock!(self.record.parent).clone()?;
        let record = self.data.folder(&parent_id)?;
        Some(ProjectFolder::new(self.data.clone(), record))
    }

    /// Move this folder under `parent`, or to the root with `None`.
    ///
    /// # Errors
    /// Fails with [`Error::CycleDetected`](crate::Error::CycleDetected) when
    /// the move would make the folder its own ancestor, and with
    /// [`Error::Error`](crate::Error::Error) when `parent` belongs to a
    /// different project.
    pub fn set_parent(&self, parent: Option<&ProjectFolder>) -> Result<()> {
        if let Some(parent) = parent {
            if !Arc::ptr_eq(&self.data, &parent.data) {
                return Err(crate::Error::Error(
                    "parent folder belongs to a different project".to_string(),
                ));
            }
        }
        self.data
            .set_folder_parent(&self.record, parent.map(ProjectFolder::id))
    }

    /// Whether this folder appears in the parent chain of `other`.
    pub fn is_ancestor_of(&self, other: &ProjectFolder) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            && order::is_ancestor(&self.data, &other.record, &self.record.id)
    }

    /// Whether the folder is still present in its project.
    pub fn exists(&self) -> bool {
        self.data.folder(&self.record.id).is_some()
    }
}

impl Clone for ProjectFolder {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            record: self.record.clone(),
        }
    }
}

impl PartialEq for ProjectFolder {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data) && self.record.id == other.record.id
    }
}

impl Eq for ProjectFolder {}

impl std::fmt::Debug for ProjectFolder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectFolder")
            .field("id", &self.record.id)
            .field("name", &self.name())
            .field("parent", &*read_lock!(self.record.parent))
            .finish()
    }
}
