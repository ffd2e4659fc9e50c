//! Logical partitions: the EBR linked list inside an extended partition.
//!
//! The chain lives entirely on disk. Nodes are addressed by absolute byte
//! offset and each node is written at its own `start`, so the head is
//! always found at the extended partition's start; no separate head
//! pointer exists. The chain is append-only: space freed by deleting a
//! logical partition is not reused.

use crate::disk::consts::MAX_EBR_HOPS;
use crate::disk::io::{open_disk, open_disk_readonly, read_ebr, read_mbr, write_ebr};
use crate::disk::layout::{Ebr, Fit};
use crate::disk::partitions::find_extended;
use crate::error::{DiskError, Result};
use std::fs::File;
use std::path::Path;

/// Append a logical partition to the extended partition's chain.
pub fn create_logical_partition(path: &Path, size: i64, name: &str, fit: Fit) -> Result<Ebr> {
    if size <= 0 {
        return Err(DiskError::InvalidArgument(format!(
            "partition size must be positive, got {size}"
        )));
    }
    if name.is_empty() || name.len() > crate::disk::consts::PART_NAME_LEN {
        return Err(DiskError::InvalidArgument(format!(
            "invalid partition name '{name}'"
        )));
    }

    let mut file = open_disk(path)?;
    let mbr = read_mbr(&mut file)?;
    let extended = match find_extended(&mbr) {
        Some(e) => *e,
        None => {
            return Err(DiskError::NotFound(format!(
                "no extended partition on disk '{}'",
                path.display()
            )));
        }
    };

    // Walk to the tail. A size-0 node is an unused slot (fresh extended
    // partitions are zero-filled), so the chain effectively ends there.
    let mut current = extended.start;
    let mut tail: Option<Ebr> = None;
    let mut hops = 0usize;
    loop {
        hops += 1;
        if hops > MAX_EBR_HOPS {
            return Err(DiskError::CorruptImage(format!(
                "EBR chain exceeds {MAX_EBR_HOPS} hops, assuming a cycle"
            )));
        }

        let ebr = read_ebr(&mut file, current)?;
        if ebr.size == 0 {
            break;
        }
        if ebr.name_str() == name {
            return Err(DiskError::Duplicate(format!(
                "a logical partition named '{name}' already exists"
            )));
        }
        if ebr.is_tail() {
            tail = Some(ebr);
            break;
        }
        current = ebr.next;
        tail = Some(ebr);
    }

    let new_start = match &tail {
        Some(t) => t.start + t.size,
        None => extended.start,
    };
    if new_start + size > extended.end() {
        return Err(DiskError::OutOfSpace(format!(
            "need {size} bytes at offset {new_start}, extended partition ends at {}",
            extended.end()
        )));
    }

    let node = Ebr::new(new_start, size, fit, name);
    write_ebr(&mut file, new_start, &node)?;
    if let Some(mut prev) = tail {
        prev.next = new_start;
        write_ebr(&mut file, prev.start, &prev)?;
    }
    Ok(node)
}

/// Walk the chain starting at `start`, yielding the created logical
/// partitions in creation order. Both terminator encodings (0 and the
/// negative sentinel) end the walk, as does an unused size-0 slot.
pub fn read_chain(path: &Path, start: i64) -> Result<Vec<Ebr>> {
    let mut file = open_disk_readonly(path)?;
    walk_chain(&mut file, start)
}

fn walk_chain(file: &mut File, start: i64) -> Result<Vec<Ebr>> {
    let mut chain = Vec::new();
    let mut current = start;
    let mut hops = 0usize;
    loop {
        hops += 1;
        if hops > MAX_EBR_HOPS {
            return Err(DiskError::CorruptImage(format!(
                "EBR chain exceeds {MAX_EBR_HOPS} hops, assuming a cycle"
            )));
        }

        let ebr = read_ebr(file, current)?;
        if ebr.size == 0 {
            break;
        }
        let next = ebr.next;
        chain.push(ebr);
        if next <= 0 {
            break;
        }
        current = next;
    }
    Ok(chain)
}

/// Node offsets of every chain member, for teardown. Node offset equals
/// the node's own `start` field.
pub fn chain_offsets(file: &mut File, start: i64) -> Result<Vec<i64>> {
    Ok(walk_chain(file, start)?.iter().map(|e| e.start).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::layout::{DeleteMode, PartKind};
    use crate::disk::partitions::{create_partition, delete_partition};
    use crate::disk::store::create_disk;

    const MB: i64 = 1024 * 1024;

    fn disk_with_extended(dir: &tempfile::TempDir, disk: i64, ext: i64) -> (std::path::PathBuf, i64) {
        let path = dir.path().join("disk.vd");
        create_disk(&path, disk, Fit::First).unwrap();
        let entry = create_partition(&path, ext, "ext", PartKind::Extended, Fit::First).unwrap();
        (path, entry.start)
    }

    #[test]
    fn chain_grows_in_creation_order() {
        let dir = tempfile::tempdir().unwrap();
        let (path, ext_start) = disk_with_extended(&dir, 20 * MB, 15 * MB);

        create_logical_partition(&path, 5 * MB, "l1", Fit::First).unwrap();
        create_logical_partition(&path, 5 * MB, "l2", Fit::First).unwrap();

        let chain = read_chain(&path, ext_start).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].name_str(), "l1");
        assert_eq!(chain[1].name_str(), "l2");
        // Head sits at the extended partition's start, links point forward.
        assert_eq!(chain[0].start, ext_start);
        assert_eq!(chain[0].next, chain[1].start);
        assert!(chain[1].is_tail());
    }

    #[test]
    fn overflowing_logical_partition_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (path, ext_start) = disk_with_extended(&dir, 20 * MB, 15 * MB);

        create_logical_partition(&path, 5 * MB, "l1", Fit::First).unwrap();
        create_logical_partition(&path, 5 * MB, "l2", Fit::First).unwrap();
        match create_logical_partition(&path, 6 * MB, "l3", Fit::First) {
            Err(DiskError::OutOfSpace(_)) => {}
            other => panic!("expected OutOfSpace, got {other:?}"),
        }
        // The failed append leaves the chain untouched.
        assert_eq!(read_chain(&path, ext_start).unwrap().len(), 2);
    }

    #[test]
    fn empty_chain_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (path, ext_start) = disk_with_extended(&dir, 20 * MB, 15 * MB);
        assert!(read_chain(&path, ext_start).unwrap().is_empty());
    }

    #[test]
    fn duplicate_logical_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (path, _) = disk_with_extended(&dir, 20 * MB, 15 * MB);
        create_logical_partition(&path, MB, "same", Fit::First).unwrap();
        match create_logical_partition(&path, MB, "same", Fit::First) {
            Err(DiskError::Duplicate(_)) => {}
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn missing_extended_partition_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.vd");
        create_disk(&path, 20 * MB, Fit::First).unwrap();
        create_partition(&path, MB, "prim", PartKind::Primary, Fit::First).unwrap();
        match create_logical_partition(&path, MB, "l1", Fit::First) {
            Err(DiskError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn legacy_zero_terminator_ends_the_walk() {
        let dir = tempfile::tempdir().unwrap();
        let (path, ext_start) = disk_with_extended(&dir, 20 * MB, 15 * MB);
        create_logical_partition(&path, MB, "l1", Fit::First).unwrap();

        // Rewrite the tail's terminator with the legacy zero encoding.
        let mut file = open_disk(&path).unwrap();
        let mut head = read_ebr(&mut file, ext_start).unwrap();
        head.next = 0;
        write_ebr(&mut file, ext_start, &head).unwrap();

        let chain = read_chain(&path, ext_start).unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name_str(), "l1");
    }

    #[test]
    fn cyclic_chain_is_reported_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let (path, ext_start) = disk_with_extended(&dir, 20 * MB, 15 * MB);
        create_logical_partition(&path, MB, "l1", Fit::First).unwrap();

        // Point the head back at itself.
        let mut file = open_disk(&path).unwrap();
        let mut head = read_ebr(&mut file, ext_start).unwrap();
        head.next = ext_start;
        write_ebr(&mut file, ext_start, &head).unwrap();

        match read_chain(&path, ext_start) {
            Err(DiskError::CorruptImage(_)) => {}
            other => panic!("expected CorruptImage, got {other:?}"),
        }
    }

    #[test]
    fn deleting_extended_partition_tears_down_chain() {
        let dir = tempfile::tempdir().unwrap();
        let (path, ext_start) = disk_with_extended(&dir, 20 * MB, 15 * MB);
        create_logical_partition(&path, MB, "l1", Fit::First).unwrap();
        create_logical_partition(&path, MB, "l2", Fit::First).unwrap();

        delete_partition(&path, "ext", DeleteMode::Fast).unwrap();

        // A fresh extended partition over the same bytes sees no stale chain.
        create_partition(&path, 15 * MB, "ext2", PartKind::Extended, Fit::First).unwrap();
        assert!(read_chain(&path, ext_start).unwrap().is_empty());
    }
}
