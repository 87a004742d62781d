//! End-to-end project lifecycle: create, import, persist, reopen.

use binscope::project::{ImportFlags, Project};

fn write_source_tree(root: &std::path::Path) {
    std::fs::create_dir_all(root.join("firmware/extracted")).unwrap();
    std::fs::create_dir_all(root.join("notes")).unwrap();
    std::fs::write(root.join("firmware/boot.bin"), b"\x7fELFboot").unwrap();
    std::fs::write(root.join("firmware/extracted/rootfs.img"), b"squashfs").unwrap();
    std::fs::write(root.join("notes/findings.md"), b"# findings").unwrap();
    std::fs::write(root.join(".hidden"), b"secret").unwrap();
}

#[test]
fn import_directory_mirrors_structure() {
    let scratch = tempfile::tempdir().unwrap();
    let source = scratch.path().join("source");
    write_source_tree(&source);

    let project = Project::create(scratch.path().join("p.bsproj"), "import test").unwrap();
    let report = project
        .import_directory(&source, None, ImportFlags::SKIP_HIDDEN)
        .unwrap();

    assert!(report.is_complete_success());
    assert_eq!(report.success_count(), 3);
    assert_eq!(report.skipped.len(), 1, "dotfile must be skipped");

    // firmware, firmware/extracted, notes
    assert_eq!(project.folders().len(), 3);
    let names: Vec<String> = project.files().iter().map(|f| f.name()).collect();
    assert!(names.contains(&"boot.bin".to_string()));
    assert!(names.contains(&"rootfs.img".to_string()));

    let rootfs = project
        .files()
        .into_iter()
        .find(|f| f.name() == "rootfs.img")
        .unwrap();
    let owning = rootfs.folder().unwrap();
    assert_eq!(owning.name(), "extracted");
    assert_eq!(owning.parent().unwrap().name(), "firmware");
    assert_eq!(rootfs.contents().unwrap(), b"squashfs");
}

#[test]
fn flatten_import_skips_folder_creation() {
    let scratch = tempfile::tempdir().unwrap();
    let source = scratch.path().join("source");
    write_source_tree(&source);

    let project = Project::create(scratch.path().join("p.bsproj"), "flat").unwrap();
    let target = project.add_folder(None, "all").unwrap();
    let report = project
        .import_directory(
            &source,
            Some(&target),
            ImportFlags::SKIP_HIDDEN | ImportFlags::FLATTEN,
        )
        .unwrap();

    assert_eq!(report.success_count(), 3);
    assert_eq!(project.folders().len(), 1, "only the target folder exists");
    for file in project.files() {
        assert_eq!(file.folder().unwrap().name(), "all");
    }
}

#[test]
fn reopened_project_preserves_structure_and_contents() {
    let scratch = tempfile::tempdir().unwrap();
    let source = scratch.path().join("source");
    write_source_tree(&source);
    let path = scratch.path().join("persist.bsproj");

    let digests: Vec<(String, String)> = {
        let project = Project::create(&path, "persist").unwrap();
        project
            .import_directory(&source, None, ImportFlags::SKIP_HIDDEN)
            .unwrap();
        project.save().unwrap();
        project
            .files()
            .iter()
            .map(|f| (f.id().to_string(), f.sha1_hex()))
            .collect()
    };

    let reopened = Project::open(&path).unwrap();
    assert_eq!(reopened.name(), "persist");
    assert_eq!(reopened.files().len(), digests.len());
    for (id, digest) in digests {
        let file = reopened.file_by_id(&id).unwrap();
        assert_eq!(file.sha1_hex(), digest);
        assert!(!file.contents().unwrap().is_empty());
    }

    // Sorted order survives the round trip: every folder after its parent.
    let sorted = reopened.sorted_folders().unwrap();
    for (index, folder) in sorted.iter().enumerate() {
        if let Some(parent) = folder.parent() {
            let parent_index = sorted.iter().position(|f| f == &parent).unwrap();
            assert!(parent_index < index);
        }
    }
}

#[test]
fn folder_moves_and_deletes_persist() {
    let scratch = tempfile::tempdir().unwrap();
    let path = scratch.path().join("moves.bsproj");
    let project = Project::create(&path, "moves").unwrap();

    let keep = project.add_folder(None, "keep").unwrap();
    let drop_me = project.add_folder(None, "drop").unwrap();
    let nested = project.add_folder(Some(&drop_me), "nested").unwrap();
    let file = project
        .add_file_from_bytes(b"payload", Some(&nested), "payload.bin")
        .unwrap();
    let orphan_copy = file.data_path().to_path_buf();

    // Moving the nested folder out rescues it from the later delete.
    nested.set_parent(Some(&keep)).unwrap();
    assert!(project.delete_folder(&drop_me));
    assert!(nested.exists());
    assert!(file.exists());

    // Cycles stay rejected across the persistence boundary.
    project.save().unwrap();
    let reopened = Project::open(&path).unwrap();
    let keep_again = reopened.folder_by_id(keep.id()).unwrap();
    let nested_again = reopened.folder_by_id(nested.id()).unwrap();
    assert!(keep_again.set_parent(Some(&nested_again)).is_err());

    assert!(reopened.delete_folder(&keep_again));
    assert!(reopened.folders().is_empty());
    assert!(reopened.files().is_empty());
    assert!(!orphan_copy.exists(), "imported copy must be unlinked");
}
