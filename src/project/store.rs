//! Record store backing a [`Project`](crate::project::Project).
//!
//! The store is the in-process stand-in for what used to be an opaque handle
//! table: every folder and file is an [`Arc`]ed record in a concurrent ordered
//! table keyed by its id, and wrapper types hold the store plus a strong
//! reference to their record. Mutations that could corrupt the folder tree
//! (parent cycles, dangling parents) are rejected here rather than trusted to
//! callers.

use std::{
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
};

use crossbeam_skiplist::SkipMap;
use sha1::{Digest, Sha1};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Name of the manifest file inside a project directory.
pub(crate) const MANIFEST_FILE: &str = "project.xml";

/// Name of the directory holding imported file contents.
pub(crate) const DATA_DIR: &str = "data";

/// Interior state of one project folder.
///
/// Shared via `Arc` by any number of [`ProjectFolder`](crate::project::ProjectFolder)
/// wrappers; the record outlives its table entry if a wrapper still holds it
/// after deletion, matching the reference-counted lifetime of the original
/// handle objects.
pub(crate) struct FolderRecord {
    pub(crate) id: String,
    pub(crate) name: RwLock<String>,
    pub(crate) description: RwLock<String>,
    pub(crate) parent: RwLock<Option<String>>,
}

/// Interior state of one imported project file.
pub(crate) struct FileRecord {
    pub(crate) id: String,
    pub(crate) name: RwLock<String>,
    pub(crate) description: RwLock<String>,
    /// Where the file was imported from, if it came from disk.
    pub(crate) source_path: Option<PathBuf>,
    /// Location of the imported copy inside the project data directory.
    pub(crate) data_path: PathBuf,
    pub(crate) size: u64,
    /// SHA-1 digest of the imported contents.
    pub(crate) digest: [u8; 20],
    pub(crate) folder: RwLock<Option<String>>,
}

/// Shared project state: identity, record tables and the id mint.
pub(crate) struct ProjectData {
    /// Root directory of the project on disk.
    pub(crate) path: PathBuf,
    pub(crate) name: RwLock<String>,
    pub(crate) description: RwLock<String>,
    /// Folder records keyed by id. `SkipMap` gives lock-free reads and a
    /// deterministic id-ordered iteration for snapshots.
    pub(crate) folders: SkipMap<String, Arc<FolderRecord>>,
    /// File records keyed by id.
    pub(crate) files: SkipMap<String, Arc<FileRecord>>,
    next_id: AtomicU64,
}

impl ProjectData {
    pub(crate) fn new(path: PathBuf, name: String) -> Self {
        Self {
            path,
            name: RwLock::new(name),
            description: RwLock::new(String::new()),
            folders: SkipMap::new(),
            files: SkipMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Absolute path of the data directory holding imported file contents.
    pub(crate) fn data_dir(&self) -> PathBuf {
        self.path.join(DATA_DIR)
    }

    /// Absolute path of the project manifest.
    pub(crate) fn manifest_path(&self) -> PathBuf {
        self.path.join(MANIFEST_FILE)
    }

    /// Mint a fresh entity id.
    ///
    /// Ids are GUID-formatted and deterministic per store: the leading groups
    /// carry a monotonic serial, the trailing groups a digest over the project
    /// path and serial. Lexicographic order of minted ids therefore matches
    /// mint order, which keeps id-ordered snapshots stable.
    pub(crate) fn mint_id(&self) -> String {
        let serial = self.next_id.fetch_add(1, Ordering::Relaxed);
        crate::utils::mint_guid(self.path.as_os_str().as_encoded_bytes(), serial)
    }

    /// Bump the id mint past `serial`, used when rebuilding a store from a
    /// manifest so freshly minted ids cannot collide with persisted ones.
    pub(crate) fn reserve_serial(&self, serial: u64) {
        self.next_id.fetch_max(serial + 1, Ordering::Relaxed);
    }

    pub(crate) fn folder(&self, id: &str) -> Option<Arc<FolderRecord>> {
        self.folders.get(id).map(|entry| entry.value().clone())
    }

    pub(crate) fn file(&self, id: &str) -> Option<Arc<FileRecord>> {
        self.files.get(id).map(|entry| entry.value().clone())
    }

    /// Create a folder record under `parent` (`None` for a root folder).
    pub(crate) fn add_folder_record(
        &self,
        parent: Option<&str>,
        name: &str,
    ) -> Result<Arc<FolderRecord>> {
        if name.trim().is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }
        if let Some(parent_id) = parent {
            if self.folders.get(parent_id).is_none() {
                return Err(Error::NotFound(parent_id.to_string()));
            }
        }

        let record = Arc::new(FolderRecord {
            id: self.mint_id(),
            name: RwLock::new(name.to_string()),
            description: RwLock::new(String::new()),
            parent: RwLock::new(parent.map(str::to_string)),
        });
        self.folders.insert(record.id.clone(), record.clone());
        debug!(id = %record.id, name, "folder added");
        Ok(record)
    }

    /// Import `bytes` as a new file record under `folder`.
    ///
    /// The contents are copied into the data directory and digested; the
    /// record is live once this returns.
    pub(crate) fn add_file_record(
        &self,
        bytes: &[u8],
        source: Option<PathBuf>,
        folder: Option<&str>,
        name: &str,
    ) -> Result<Arc<FileRecord>> {
        if name.trim().is_empty() {
            return Err(Error::InvalidName(name.to_string()));
        }
        if let Some(folder_id) = folder {
            if self.folders.get(folder_id).is_none() {
                return Err(Error::NotFound(folder_id.to_string()));
            }
        }

        let id = self.mint_id();
        let data_path = self.data_dir().join(&id);
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::write(&data_path, bytes)?;

        let (digest, size) = digest_bytes(bytes);
        let record = Arc::new(FileRecord {
            id,
            name: RwLock::new(name.to_string()),
            description: RwLock::new(String::new()),
            source_path: source,
            data_path,
            size,
            digest,
            folder: RwLock::new(folder.map(str::to_string)),
        });
        self.files.insert(record.id.clone(), record.clone());
        debug!(id = %record.id, name, size, "file imported");
        Ok(record)
    }

    /// Insert a previously constructed folder record, used by the manifest
    /// loader. The caller guarantees parent ids are resolved afterwards.
    pub(crate) fn insert_folder_record(&self, record: Arc<FolderRecord>) {
        self.folders.insert(record.id.clone(), record);
    }

    pub(crate) fn insert_file_record(&self, record: Arc<FileRecord>) {
        self.files.insert(record.id.clone(), record);
    }

    /// Re-parent `record` under `new_parent`, rejecting edits that would
    /// create a cycle.
    ///
    /// The check walks the candidate parent chain before the edit is applied;
    /// a dangling id in that chain fails with [`Error::DanglingHandle`], and
    /// a chain longer than the folder count fails with
    /// [`Error::CycleDetected`] instead of looping.
    pub(crate) fn set_folder_parent(
        &self,
        record: &FolderRecord,
        new_parent: Option<&str>,
    ) -> Result<()> {
        if let Some(start) = new_parent {
            if start == record.id {
                return Err(Error::CycleDetected(record.id.clone()));
            }

            let limit = self.folders.len();
            let mut steps = 0usize;
            let mut cursor = Some(start.to_string());
            while let Some(id) = cursor {
                let ancestor = self.folder(&id).ok_or(Error::DanglingHandle {
                    kind: "folder",
                    id: id.clone(),
                })?;
                if ancestor.id == record.id {
                    return Err(Error::CycleDetected(record.id.clone()));
                }
                steps += 1;
                if steps > limit {
                    return Err(Error::CycleDetected(id));
                }
                cursor = read_lock!(ancestor.parent).clone();
            }
        }

        *write_lock!(record.parent) = new_parent.map(str::to_string);
        Ok(())
    }

    /// Move `record` into `folder` (`None` for the project root).
    pub(crate) fn set_file_folder(&self, record: &FileRecord, folder: Option<&str>) -> Result<()> {
        if let Some(folder_id) = folder {
            if self.folders.get(folder_id).is_none() {
                return Err(Error::DanglingHandle {
                    kind: "folder",
                    id: folder_id.to_string(),
                });
            }
        }
        *write_lock!(record.folder) = folder.map(str::to_string);
        Ok(())
    }

    /// Ids of the direct child folders of `id`.
    pub(crate) fn child_folder_ids(&self, id: &str) -> Vec<String> {
        self.folders
            .iter()
            .filter(|entry| read_lock!(entry.value().parent).as_deref() == Some(id))
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Remove `id` and every descendant folder and contained file.
    ///
    /// Returns `false` when the folder is already gone. On-disk copies of
    /// removed files are deleted best-effort; a failed unlink is logged and
    /// does not abort the removal.
    pub(crate) fn delete_folder_recursive(&self, id: &str) -> bool {
        if self.folders.get(id).is_none() {
            return false;
        }

        let mut doomed = vec![id.to_string()];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let mut children = self.child_folder_ids(&doomed[cursor]);
            doomed.append(&mut children);
            cursor += 1;
        }

        for entry in self.files.iter() {
            let in_doomed = {
                let folder = read_lock!(entry.value().folder);
                folder
                    .as_deref()
                    .is_some_and(|fid| doomed.iter().any(|d| d == fid))
            };
            if in_doomed {
                self.delete_file(entry.key());
            }
        }

        for folder_id in &doomed {
            self.folders.remove(folder_id);
        }
        debug!(id, removed = doomed.len(), "folder deleted");
        true
    }

    /// Remove a file record and its on-disk copy.
    ///
    /// Returns `false` when the record is already gone.
    pub(crate) fn delete_file(&self, id: &str) -> bool {
        let Some(entry) = self.files.remove(id) else {
            return false;
        };
        let data_path = &entry.value().data_path;
        if data_path.starts_with(self.data_dir()) {
            if let Err(err) = std::fs::remove_file(data_path) {
                warn!(id, path = %data_path.display(), %err, "could not remove imported copy");
            }
        }
        true
    }
}

/// Digest and size of a byte slice, shared by the import paths.
pub(crate) fn digest_bytes(bytes: &[u8]) -> ([u8; 20], u64) {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    (hasher.finalize().into(), bytes.len() as u64)
}

/// Hex rendering of a SHA-1 digest for manifests and display.
pub(crate) fn digest_hex(digest: &[u8; 20]) -> String {
    let mut out = String::with_capacity(40);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Parse a 40-character hex digest back into bytes.
pub(crate) fn digest_from_hex(hex: &str) -> Result<[u8; 20]> {
    if hex.len() != 40 {
        return Err(malformed_error!("Invalid digest length {}", hex.len()));
    }
    let mut digest = [0u8; 20];
    for (i, chunk) in hex.as_bytes().chunks(2).enumerate() {
        let text = std::str::from_utf8(chunk)
            .map_err(|_| malformed_error!("Invalid digest encoding: {}", hex))?;
        digest[i] = u8::from_str_radix(text, 16)
            .map_err(|_| malformed_error!("Invalid digest byte: {}", text))?;
    }
    Ok(digest)
}

/// Read file contents for import, memory-mapping non-empty files.
pub(crate) fn read_for_import(path: &Path) -> Result<Vec<u8>> {
    let file = std::fs::File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(Vec::new());
    }

    // Mapping is read-only and the source is not expected to change mid-import.
    let mapped = unsafe { memmap2::Mmap::map(&file)? };
    Ok(mapped.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ProjectData {
        ProjectData::new(PathBuf::from("/tmp/binscope-test"), "test".to_string())
    }

    #[test]
    fn minted_ids_are_unique_and_ordered() {
        let data = store();
        let a = data.mint_id();
        let b = data.mint_id();
        assert_ne!(a, b);
        assert!(a < b, "mint order must match lexicographic order");
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn add_folder_rejects_empty_name() {
        let data = store();
        assert!(matches!(
            data.add_folder_record(None, "  "),
            Err(Error::InvalidName(_))
        ));
    }

    #[test]
    fn add_folder_rejects_unknown_parent() {
        let data = store();
        assert!(matches!(
            data.add_folder_record(Some("nope"), "child"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn set_parent_rejects_self_and_descendant() {
        let data = store();
        let a = data.add_folder_record(None, "a").unwrap();
        let b = data.add_folder_record(Some(&a.id), "b").unwrap();
        let c = data.add_folder_record(Some(&b.id), "c").unwrap();

        assert!(matches!(
            data.set_folder_parent(&a, Some(&a.id)),
            Err(Error::CycleDetected(_))
        ));
        assert!(matches!(
            data.set_folder_parent(&a, Some(&c.id)),
            Err(Error::CycleDetected(_))
        ));
        // Re-parenting down one level stays legal for the leaf.
        data.set_folder_parent(&c, Some(&a.id)).unwrap();
        assert_eq!(read_lock!(c.parent).as_deref(), Some(a.id.as_str()));
    }

    #[test]
    fn set_parent_reports_dangling_chain() {
        let data = store();
        let a = data.add_folder_record(None, "a").unwrap();
        let b = data.add_folder_record(Some(&a.id), "b").unwrap();
        let c = data.add_folder_record(None, "c").unwrap();
        data.folders.remove(&a.id);

        assert!(matches!(
            data.set_folder_parent(&c, Some(&b.id)),
            Err(Error::DanglingHandle { kind: "folder", .. })
        ));
    }

    #[test]
    fn recursive_delete_takes_descendants() {
        let data = store();
        let a = data.add_folder_record(None, "a").unwrap();
        let b = data.add_folder_record(Some(&a.id), "b").unwrap();
        let _ = data.add_folder_record(Some(&b.id), "c").unwrap();
        let other = data.add_folder_record(None, "other").unwrap();

        assert!(data.delete_folder_recursive(&a.id));
        assert_eq!(data.folders.len(), 1);
        assert!(data.folder(&other.id).is_some());
        // Second delete is a refused no-op.
        assert!(!data.delete_folder_recursive(&a.id));
    }

    #[test]
    fn digest_hex_round_trip() {
        let (digest, size) = digest_bytes(b"hello");
        assert_eq!(size, 5);
        let hex = digest_hex(&digest);
        assert_eq!(hex.len(), 40);
        assert_eq!(digest_from_hex(&hex).unwrap(), digest);
        assert!(digest_from_hex("zz").is_err());
    }
}
