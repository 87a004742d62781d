//! Project manifest persistence.
//!
//! The manifest is a single XML document at the project root describing the
//! project identity plus every folder and file record. Contents of imported
//! files live next to it in the data directory and are not part of the
//! manifest itself.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <project version="1" name="firmware teardown">
//!   <folders>
//!     <folder id="..." name="vendor"/>
//!     <folder id="..." name="zlib" parent="..."/>
//!   </folders>
//!   <files>
//!     <file id="..." name="boot.bin" folder="..." size="4096" sha1="..." data="data/..."/>
//!   </files>
//! </project>
//! ```

use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use quick_xml::{
    events::{BytesDecl, BytesEnd, BytesStart, Event},
    Reader, Writer,
};
use tracing::debug;

use crate::{
    project::store::{self, FileRecord, FolderRecord, ProjectData, DATA_DIR, MANIFEST_FILE},
    Result,
};

/// Manifest format version this build writes and accepts.
const MANIFEST_VERSION: &str = "1";

/// Serialize `data` to its manifest file.
pub(crate) fn save(data: &ProjectData) -> Result<()> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("project");
    root.push_attribute(("version", MANIFEST_VERSION));
    root.push_attribute(("name", read_lock!(data.name).as_str()));
    let description = read_lock!(data.description).clone();
    if !description.is_empty() {
        root.push_attribute(("description", description.as_str()));
    }
    writer.write_event(Event::Start(root))?;

    writer.write_event(Event::Start(BytesStart::new("folders")))?;
    for entry in data.folders.iter() {
        let record = entry.value();
        let mut el = BytesStart::new("folder");
        el.push_attribute(("id", record.id.as_str()));
        el.push_attribute(("name", read_lock!(record.name).as_str()));
        if let Some(parent) = read_lock!(record.parent).as_deref() {
            el.push_attribute(("parent", parent));
        }
        let description = read_lock!(record.description).clone();
        if !description.is_empty() {
            el.push_attribute(("description", description.as_str()));
        }
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new("folders")))?;

    writer.write_event(Event::Start(BytesStart::new("files")))?;
    for entry in data.files.iter() {
        let record = entry.value();
        let mut el = BytesStart::new("file");
        el.push_attribute(("id", record.id.as_str()));
        el.push_attribute(("name", read_lock!(record.name).as_str()));
        if let Some(folder) = read_lock!(record.folder).as_deref() {
            el.push_attribute(("folder", folder));
        }
        el.push_attribute(("size", record.size.to_string().as_str()));
        el.push_attribute(("sha1", store::digest_hex(&record.digest).as_str()));
        let relative = format!("{DATA_DIR}/{}", record.id);
        el.push_attribute(("data", relative.as_str()));
        if let Some(source) = &record.source_path {
            el.push_attribute(("source", source.to_string_lossy().as_ref()));
        }
        let description = read_lock!(record.description).clone();
        if !description.is_empty() {
            el.push_attribute(("description", description.as_str()));
        }
        writer.write_event(Event::Empty(el))?;
    }
    writer.write_event(Event::End(BytesEnd::new("files")))?;

    writer.write_event(Event::End(BytesEnd::new("project")))?;

    std::fs::write(data.manifest_path(), writer.into_inner())?;
    debug!(path = %data.manifest_path().display(), "manifest written");
    Ok(())
}

/// Parse the manifest under `root` and rebuild the store.
pub(crate) fn load(root: &Path) -> Result<ProjectData> {
    let manifest_path = root.join(MANIFEST_FILE);
    let text = std::fs::read_to_string(&manifest_path)?;

    let mut reader = Reader::from_str(&text);
    reader.config_mut().trim_text(true);

    let mut data: Option<ProjectData> = None;
    let mut max_serial = 0u64;

    loop {
        match reader.read_event()? {
            Event::Start(el) => match el.name().as_ref() {
                b"project" => {
                    if data.is_some() {
                        return Err(malformed_error!("Nested project element"));
                    }
                    let version = require_attr(&el, "version")?;
                    if version != MANIFEST_VERSION {
                        return Err(malformed_error!(
                            "Unsupported manifest version {}",
                            version
                        ));
                    }
                    let name = require_attr(&el, "name")?;
                    let loaded = ProjectData::new(root.to_path_buf(), name);
                    if let Some(description) = attr(&el, "description")? {
                        *write_lock!(loaded.description) = description;
                    }
                    data = Some(loaded);
                }
                b"folders" | b"files" => {}
                other => {
                    return Err(malformed_error!(
                        "Unexpected element {}",
                        String::from_utf8_lossy(other)
                    ));
                }
            },
            Event::Empty(el) => {
                let data = data
                    .as_ref()
                    .ok_or_else(|| malformed_error!("Entity outside project element"))?;
                match el.name().as_ref() {
                    b"folder" => {
                        let record = read_folder(&el)?;
                        if data.folder(&record.id).is_some() {
                            return Err(malformed_error!("Duplicate folder id {}", record.id));
                        }
                        max_serial = max_serial.max(parse_serial(&record.id).unwrap_or(0));
                        data.insert_folder_record(record);
                    }
                    b"file" => {
                        let record = read_file(&el, root)?;
                        if data.file(&record.id).is_some() {
                            return Err(malformed_error!("Duplicate file id {}", record.id));
                        }
                        max_serial = max_serial.max(parse_serial(&record.id).unwrap_or(0));
                        data.insert_file_record(record);
                    }
                    other => {
                        return Err(malformed_error!(
                            "Unexpected element {}",
                            String::from_utf8_lossy(other)
                        ));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let data = data.ok_or_else(|| malformed_error!("Manifest has no project element"))?;
    data.reserve_serial(max_serial);
    verify_references(&data)?;
    Ok(data)
}

fn read_folder(el: &BytesStart<'_>) -> Result<Arc<FolderRecord>> {
    Ok(Arc::new(FolderRecord {
        id: require_attr(el, "id")?,
        name: RwLock::new(require_attr(el, "name")?),
        description: RwLock::new(attr(el, "description")?.unwrap_or_default()),
        parent: RwLock::new(attr(el, "parent")?),
    }))
}

fn read_file(el: &BytesStart<'_>, root: &Path) -> Result<Arc<FileRecord>> {
    let size = require_attr(el, "size")?
        .parse::<u64>()
        .map_err(|err| malformed_error!("Invalid file size: {}", err))?;
    let digest = store::digest_from_hex(&require_attr(el, "sha1")?)?;
    let data_rel = require_attr(el, "data")?;

    Ok(Arc::new(FileRecord {
        id: require_attr(el, "id")?,
        name: RwLock::new(require_attr(el, "name")?),
        description: RwLock::new(attr(el, "description")?.unwrap_or_default()),
        source_path: attr(el, "source")?.map(PathBuf::from),
        data_path: root.join(data_rel),
        size,
        digest,
        folder: RwLock::new(attr(el, "folder")?),
    }))
}

/// Every persisted parent and folder reference must resolve.
fn verify_references(data: &ProjectData) -> Result<()> {
    for entry in data.folders.iter() {
        if let Some(parent) = read_lock!(entry.value().parent).as_deref() {
            if data.folder(parent).is_none() {
                return Err(malformed_error!(
                    "Folder {} references missing parent {}",
                    entry.key(),
                    parent
                ));
            }
        }
    }
    for entry in data.files.iter() {
        if let Some(folder) = read_lock!(entry.value().folder).as_deref() {
            if data.folder(folder).is_none() {
                return Err(malformed_error!(
                    "File {} references missing folder {}",
                    entry.key(),
                    folder
                ));
            }
        }
    }
    Ok(())
}

fn attr(el: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    for attribute in el.attributes() {
        let attribute =
            attribute.map_err(|err| malformed_error!("Invalid attribute: {}", err))?;
        if attribute.key.as_ref() == key.as_bytes() {
            let value = attribute
                .unescape_value()
                .map_err(|err| malformed_error!("Invalid attribute value: {}", err))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn require_attr(el: &BytesStart<'_>, key: &str) -> Result<String> {
    attr(el, key)?.ok_or_else(|| {
        malformed_error!(
            "Missing {} attribute on {}",
            key,
            String::from_utf8_lossy(el.name().as_ref())
        )
    })
}

/// Recover the mint serial from an id's leading groups.
///
/// Returns `None` for ids that do not follow the minted layout; those still
/// load, they just cannot collide with freshly minted ids anyway.
fn parse_serial(id: &str) -> Option<u64> {
    let mut groups = id.split('-');
    let hi = u64::from_str_radix(groups.next()?, 16).ok()?;
    let mid = u64::from_str_radix(groups.next()?, 16).ok()?;
    let low = u64::from_str_radix(groups.next()?, 16).ok()?;
    Some((hi << 32) | (mid << 16) | low)
}
