//! Deterministic ancestors-first ordering over project folders.
//!
//! Every folder is keyed by its *id path* — the sequence of ancestor ids from
//! its root down to the folder itself — and keys compare lexicographically
//! element-wise. This gives a genuine total order with the guarantees display
//! and serialization code relies on:
//!
//! - root folders order before everything else, and among themselves by id;
//! - an ancestor's key is a strict prefix of each descendant's key, so every
//!   folder appears strictly after all of its ancestors;
//! - folders in unrelated subtrees order by the first ancestor id where their
//!   paths diverge, identically in both comparison directions.
//!
//! The earlier pairwise formulation of this order walked one operand's parent
//! chain per comparison and fell back to "left first" whenever neither
//! operand contained the other, which is not transitive across disjoint
//! subtrees. Precomputing keys removes that ambiguity and also drops the sort
//! from `O(F log F · depth)` comparisons-with-walks to one `O(depth)` walk
//! per folder.

use std::sync::Arc;

use crate::{
    project::store::{FolderRecord, ProjectData},
    Error, Result,
};

/// Id path of `record`: ancestor ids from root to the record itself.
///
/// Fails with [`Error::DanglingHandle`] when a parent id resolves to no live
/// record, and with [`Error::CycleDetected`] when the chain is longer than
/// the folder table (only possible through external corruption of persisted
/// state).
pub(crate) fn id_path(data: &ProjectData, record: &FolderRecord) -> Result<Vec<String>> {
    let mut reversed = vec![record.id.clone()];

    let limit = data.folders.len();
    let mut steps = 0usize;
    let mut cursor = read_lock!(record.parent).clone();
    while let Some(id) = cursor {
        let ancestor = data.folder(&id).ok_or(Error::DanglingHandle {
            kind: "folder",
            id: id.clone(),
        })?;
        steps += 1;
        if steps > limit {
            return Err(Error::CycleDetected(id));
        }
        reversed.push(ancestor.id.clone());
        cursor = read_lock!(ancestor.parent).clone();
    }

    reversed.reverse();
    Ok(reversed)
}

/// All folder records, ancestors strictly before descendants.
///
/// Keys for every folder are resolved up front, so a dangling parent
/// reference fails the whole operation before any comparison runs.
pub(crate) fn sorted_folder_records(data: &ProjectData) -> Result<Vec<Arc<FolderRecord>>> {
    let mut keyed: Vec<(Vec<String>, Arc<FolderRecord>)> =
        Vec::with_capacity(data.folders.len());
    for entry in data.folders.iter() {
        keyed.push((id_path(data, entry.value())?, entry.value().clone()));
    }

    keyed.sort_by(|lhs, rhs| lhs.0.cmp(&rhs.0));
    Ok(keyed.into_iter().map(|(_, record)| record).collect())
}

/// Whether `ancestor_id` appears in the parent chain of `record`.
///
/// This is the walk the original pairwise comparator used for its
/// descendant check; it survives as a query in its own right.
pub(crate) fn is_ancestor(data: &ProjectData, record: &FolderRecord, ancestor_id: &str) -> bool {
    let limit = data.folders.len();
    let mut steps = 0usize;
    let mut cursor = read_lock!(record.parent).clone();
    while let Some(id) = cursor {
        if id == ancestor_id {
            return true;
        }
        let Some(parent) = data.folder(&id) else {
            return false;
        };
        steps += 1;
        if steps > limit {
            return false;
        }
        cursor = read_lock!(parent.parent).clone();
    }
    false
}
