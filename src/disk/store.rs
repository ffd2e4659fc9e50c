//! Virtual disk store: creation and removal of backing image files.

use crate::disk::io::write_mbr;
use crate::disk::layout::{Fit, Mbr};
use crate::error::{DiskError, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Create a disk image of exactly `size_bytes`, with an initial MBR whose
/// four partition slots are free. Parent directories are created as
/// needed. The file length is set once here and never changes afterwards.
pub fn create_disk(path: &Path, size_bytes: i64, fit: Fit) -> Result<Mbr> {
    if size_bytes <= 0 {
        return Err(DiskError::InvalidArgument(format!(
            "disk size must be positive, got {size_bytes}"
        )));
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.set_len(size_bytes as u64)?;

    let mbr = Mbr::new(size_bytes, fit, rand::random::<i32>());
    write_mbr(&mut file, &mbr)?;
    Ok(mbr)
}

/// Remove a disk image. The caller decides about destruction: `confirmed`
/// must already be validated (the command layer prompts, the core never
/// does interactive I/O).
pub fn delete_disk(path: &Path, confirmed: bool) -> Result<()> {
    if !path.exists() {
        return Err(DiskError::NotFound(format!(
            "disk image '{}'",
            path.display()
        )));
    }
    if !confirmed {
        return Err(DiskError::Cancelled);
    }
    fs::remove_file(path)?;
    Ok(())
}
