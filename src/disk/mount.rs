//! Mount table: in-memory registry of mounted primary partitions.
//!
//! Identifiers are deterministic: the fixed host tag, a per-disk sequence
//! number, and a letter assigned to the disk path at its first mount
//! (A..Z, wrapping). Keying the counters by path keeps interleaved mounts
//! across disks from miscounting. Identifiers are case-normalized to
//! lowercase, and there is no unmount: records live until process exit.

use crate::context::Context;
use crate::disk::consts::{HOST_TAG, STATUS_MOUNTED};
use crate::disk::io::{open_disk, read_mbr, write_mbr};
use crate::disk::layout::PartitionEntry;
use crate::error::{DiskError, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Snapshot of a partition taken at mount time.
#[derive(Debug, Clone)]
pub struct MountedPartition {
    pub id: String,
    pub path: PathBuf,
    pub entry: PartitionEntry,
}

struct DiskSeq {
    letter: char,
    next_number: i32,
}

#[derive(Default)]
pub struct MountTable {
    mounts: BTreeMap<String, MountedPartition>,
    seqs: BTreeMap<PathBuf, DiskSeq>,
    letters_assigned: u32,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next identifier and correlative for `path`.
    fn reserve(&mut self, path: &Path) -> (String, i32) {
        let seq = self.seqs.entry(path.to_path_buf()).or_insert_with(|| {
            let letter = (b'A' + (self.letters_assigned % 26) as u8) as char;
            self.letters_assigned += 1;
            DiskSeq {
                letter,
                next_number: 1,
            }
        });
        let number = seq.next_number;
        seq.next_number += 1;
        let id = format!("{HOST_TAG}{number}{}", seq.letter).to_lowercase();
        (id, number)
    }

    fn insert(&mut self, record: MountedPartition) {
        self.mounts.insert(record.id.clone(), record);
    }

    pub fn is_mounted(&self, path: &Path, name: &str) -> bool {
        self.find(path, name).is_some()
    }

    pub fn is_mounted_by_id(&self, id: &str) -> bool {
        self.mounts.contains_key(&id.to_lowercase())
    }

    pub fn get(&self, id: &str) -> Option<&MountedPartition> {
        self.mounts.get(&id.to_lowercase())
    }

    pub fn find(&self, path: &Path, name: &str) -> Option<&MountedPartition> {
        self.mounts
            .values()
            .find(|m| m.path == path && m.entry.name_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MountedPartition> {
        self.mounts.values()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }
}

/// Mount the named primary partition of a disk image.
///
/// The registry lock is held only around in-memory mutation; the MBR read
/// and the identifier persist happen outside it, so mounting one image
/// never blocks work on another. The record is inserted only after the
/// on-disk entry update lands.
pub fn mount(ctx: &Context, path: &Path, name: &str) -> Result<String> {
    let mut file = open_disk(path)?;
    let mut mbr = read_mbr(&mut file)?;

    let index = mbr
        .partitions
        .iter()
        .position(|p| p.is_primary() && p.name_str() == name)
        .ok_or_else(|| {
            DiskError::NotFound(format!(
                "primary partition '{name}' on disk '{}'",
                path.display()
            ))
        })?;

    let (id, correlative) = {
        let mut reg = ctx.registry();
        if reg.mounts.is_mounted(path, name) {
            return Err(DiskError::AlreadyMounted(format!(
                "'{name}' on '{}'",
                path.display()
            )));
        }
        reg.mounts.reserve(path)
    };

    // Persist the transient mount fields into the table entry. The on-disk
    // id field keeps only the first 4 bytes of longer identifiers.
    let entry = &mut mbr.partitions[index];
    entry.status = STATUS_MOUNTED;
    entry.correlative = correlative;
    let id_bytes = id.as_bytes();
    let n = id_bytes.len().min(4);
    entry.id = [0u8; 4];
    entry.id[..n].copy_from_slice(&id_bytes[..n]);
    let snapshot = *entry;
    write_mbr(&mut file, &mbr)?;

    ctx.registry().mounts.insert(MountedPartition {
        id: id.clone(),
        path: path.to_path_buf(),
        entry: snapshot,
    });
    Ok(id)
}
