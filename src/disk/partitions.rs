//! MBR partition table management: slot allocation and deletion.

use crate::disk::consts::{MBR_SIZE, PART_NAME_LEN, STATUS_ACTIVE, STATUS_FREE};
use crate::disk::io::{open_disk, read_mbr, write_mbr, zero_fill};
use crate::disk::layout::{DeleteMode, Fit, Mbr, PartKind, PartitionEntry};
use crate::disk::logical::chain_offsets;
use crate::error::{DiskError, Result};
use std::fs::File;
use std::path::Path;

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DiskError::InvalidArgument(
            "partition name must not be empty".into(),
        ));
    }
    if name.len() > PART_NAME_LEN {
        return Err(DiskError::InvalidArgument(format!(
            "partition name '{name}' exceeds {PART_NAME_LEN} bytes"
        )));
    }
    Ok(())
}

/// Allocate a top-level (primary or extended) partition.
///
/// Allocation is a contiguous bump: the candidate start is the highest
/// `start + size` over the active entries, or the MBR size when the table
/// is empty. Holes left by deletions are not reused, and the stored fit
/// tag does not drive a free-list search.
pub fn create_partition(
    path: &Path,
    size: i64,
    name: &str,
    kind: PartKind,
    fit: Fit,
) -> Result<PartitionEntry> {
    if size <= 0 {
        return Err(DiskError::InvalidArgument(format!(
            "partition size must be positive, got {size}"
        )));
    }
    validate_name(name)?;
    if kind == PartKind::Logical {
        return Err(DiskError::InvalidArgument(
            "logical partitions are created inside an extended partition".into(),
        ));
    }

    let mut file = open_disk(path)?;
    let mut mbr = read_mbr(&mut file)?;

    if mbr.partitions.iter().all(|p| !p.is_free()) {
        return Err(DiskError::OutOfSpace(
            "all 4 partition slots are in use".into(),
        ));
    }
    if kind == PartKind::Extended && mbr.partitions.iter().any(|p| p.is_extended()) {
        return Err(DiskError::Duplicate(
            "an extended partition already exists on this disk".into(),
        ));
    }
    if mbr.find_active(name).is_some() {
        return Err(DiskError::Duplicate(format!(
            "a partition named '{name}' already exists"
        )));
    }

    let candidate = mbr
        .active_entries()
        .map(|p| p.end())
        .max()
        .unwrap_or(MBR_SIZE as i64);
    if candidate + size > mbr.size {
        return Err(DiskError::OutOfSpace(format!(
            "need {size} bytes at offset {candidate}, disk ends at {}",
            mbr.size
        )));
    }

    let slot = mbr
        .partitions
        .iter()
        .position(|p| p.is_free())
        .expect("free slot checked above");

    let mut entry = PartitionEntry::empty();
    entry.status = STATUS_ACTIVE;
    entry.kind = kind.as_byte();
    entry.fit = fit.as_byte();
    entry.start = candidate;
    entry.size = size;
    entry.set_name(name);
    mbr.partitions[slot] = entry;

    write_mbr(&mut file, &mbr)?;
    Ok(entry)
}

/// Delete an active partition by name.
///
/// `Fast` clears the status byte only; `Full` additionally zero-fills the
/// partition's byte range. An extended partition's EBR chain is torn down
/// first in either mode, so a later extended partition allocated over the
/// same bytes never picks up a stale chain.
pub fn delete_partition(path: &Path, name: &str, mode: DeleteMode) -> Result<()> {
    let mut file = open_disk(path)?;
    let mut mbr = read_mbr(&mut file)?;

    let index = match mbr.find_active(name) {
        Some((i, _)) => i,
        None => {
            return Err(DiskError::NotFound(format!(
                "partition '{name}' on disk '{}'",
                path.display()
            )));
        }
    };
    let entry = mbr.partitions[index];

    if entry.is_extended() {
        tear_down_chain(&mut file, &entry)?;
    }
    if mode == DeleteMode::Full {
        zero_fill(&mut file, entry.start, entry.size)?;
    }

    mbr.partitions[index].status = STATUS_FREE;
    write_mbr(&mut file, &mbr)
}

fn tear_down_chain(file: &mut File, extended: &PartitionEntry) -> Result<()> {
    let offsets = chain_offsets(file, extended.start)?;
    for offset in offsets {
        zero_fill(file, offset, crate::disk::consts::EBR_SIZE as i64)?;
    }
    Ok(())
}

/// The single extended partition of a disk, if one exists.
pub fn find_extended(mbr: &Mbr) -> Option<&PartitionEntry> {
    mbr.partitions.iter().find(|p| p.is_extended())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::store::create_disk;

    fn new_disk(dir: &tempfile::TempDir, size: i64) -> std::path::PathBuf {
        let path = dir.path().join("disk.vd");
        create_disk(&path, size, Fit::First).unwrap();
        path
    }

    fn read(path: &Path) -> Mbr {
        let mut file = open_disk(path).unwrap();
        read_mbr(&mut file).unwrap()
    }

    #[test]
    fn bump_allocation_packs_partitions_contiguously() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);

        let a = create_partition(&path, 1000, "a", PartKind::Primary, Fit::First).unwrap();
        let b = create_partition(&path, 2000, "b", PartKind::Primary, Fit::First).unwrap();

        assert_eq!(a.start, MBR_SIZE as i64);
        assert_eq!(b.start, a.end());
    }

    #[test]
    fn active_ranges_are_pairwise_disjoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        for (i, size) in [1000i64, 3000, 500, 2000].iter().enumerate() {
            create_partition(&path, *size, &format!("p{i}"), PartKind::Primary, Fit::First)
                .unwrap();
        }

        let mbr = read(&path);
        let active: Vec<_> = mbr.active_entries().collect();
        assert_eq!(active.len(), 4);
        for (i, a) in active.iter().enumerate() {
            assert!(a.start >= MBR_SIZE as i64);
            assert!(a.end() <= mbr.size);
            for b in active.iter().skip(i + 1) {
                assert!(a.end() <= b.start || b.end() <= a.start);
            }
        }
    }

    #[test]
    fn fifth_partition_exhausts_slots() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        for i in 0..4 {
            create_partition(&path, 1000, &format!("p{i}"), PartKind::Primary, Fit::First)
                .unwrap();
        }
        match create_partition(&path, 1000, "p4", PartKind::Primary, Fit::First) {
            Err(DiskError::OutOfSpace(_)) => {}
            other => panic!("expected OutOfSpace, got {other:?}"),
        }
    }

    #[test]
    fn second_extended_is_rejected_regardless_of_space() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        create_partition(&path, 1000, "ext1", PartKind::Extended, Fit::First).unwrap();
        match create_partition(&path, 1000, "ext2", PartKind::Extended, Fit::First) {
            Err(DiskError::Duplicate(_)) => {}
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        create_partition(&path, 1000, "same", PartKind::Primary, Fit::First).unwrap();
        match create_partition(&path, 1000, "same", PartKind::Primary, Fit::First) {
            Err(DiskError::Duplicate(_)) => {}
            other => panic!("expected Duplicate, got {other:?}"),
        }
    }

    #[test]
    fn oversize_partition_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 4096);
        match create_partition(&path, 8192, "big", PartKind::Primary, Fit::First) {
            Err(DiskError::OutOfSpace(_)) => {}
            other => panic!("expected OutOfSpace, got {other:?}"),
        }
    }

    #[test]
    fn holes_are_not_reused_after_deletion() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        create_partition(&path, 1000, "a", PartKind::Primary, Fit::First).unwrap();
        let b = create_partition(&path, 1000, "b", PartKind::Primary, Fit::First).unwrap();
        delete_partition(&path, "a", DeleteMode::Fast).unwrap();

        // The bump allocator keeps growing past the freed hole.
        let c = create_partition(&path, 500, "c", PartKind::Primary, Fit::First).unwrap();
        assert_eq!(c.start, b.end());
    }

    #[test]
    fn fast_delete_clears_status_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        create_partition(&path, 1000, "gone", PartKind::Primary, Fit::First).unwrap();
        delete_partition(&path, "gone", DeleteMode::Fast).unwrap();

        let mbr = read(&path);
        assert!(mbr.partitions[0].is_free());
        // Name bytes survive a fast delete; only the status flips.
        assert_eq!(mbr.partitions[0].name_str(), "gone");
    }

    #[test]
    fn full_delete_zeroes_the_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        let entry = create_partition(&path, 1000, "wipe", PartKind::Primary, Fit::First).unwrap();

        // Dirty the partition body first.
        {
            let mut file = open_disk(&path).unwrap();
            crate::disk::io::write_struct(&mut file, entry.start as u64, &[0xEEu8; 1000]).unwrap();
        }
        delete_partition(&path, "wipe", DeleteMode::Full).unwrap();

        let data = std::fs::read(&path).unwrap();
        let body = &data[entry.start as usize..entry.end() as usize];
        assert!(body.iter().all(|&b| b == 0));
    }

    #[test]
    fn deleting_unknown_partition_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = new_disk(&dir, 1024 * 1024);
        match delete_partition(&path, "ghost", DeleteMode::Fast) {
            Err(DiskError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
