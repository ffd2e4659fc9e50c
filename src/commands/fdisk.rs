//! `fdisk` command: create or delete partitions.
//!
//! Usage:
//!   fdisk -size=300 [-unit=b|k|m] -path=P [-type=p|e|l] [-fit=bf|ff|wf] -name=Part1
//!   fdisk -delete=fast|full -path=P -name=Part1
//!
//! Defaults: unit=k, type=p, fit=wf. Primary and extended partitions take
//! MBR slots; logical partitions go into the extended partition's EBR
//! chain. Deletion asks for confirmation first.

use crate::commands::{confirm_destructive, parse_flags, require, size_in_bytes};
use crate::context::Context;
use crate::disk::layout::{DeleteMode, Fit, PartKind};
use crate::disk::logical::create_logical_partition;
use crate::disk::partitions::{create_partition, delete_partition};
use crate::error::{DiskError, Result};
use std::path::Path;

pub fn handle_argv(argv: &[&str], context: &Context) {
    match run(argv, context) {
        Ok(msg) => println!("{msg}"),
        Err(DiskError::Cancelled) => println!("{}", DiskError::Cancelled),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn run(argv: &[&str], _context: &Context) -> Result<String> {
    let flags = parse_flags(argv, &["size", "unit", "path", "type", "fit", "name", "delete"])?;
    let path = Path::new(require(&flags, "path")?);
    let name = require(&flags, "name")?;

    if let Some(mode) = flags.get("delete") {
        let mode: DeleteMode = mode.parse()?;
        if !confirm_destructive(&format!("delete partition '{name}'?")) {
            return Err(DiskError::Cancelled);
        }
        delete_partition(path, name, mode)?;
        return Ok(format!("partition deleted: {name}"));
    }

    let size: i64 = require(&flags, "size")?.parse().map_err(|_| {
        DiskError::InvalidArgument("size must be an integer".into())
    })?;
    let unit = flags.get("unit").map(String::as_str).unwrap_or("k");
    let kind: PartKind = flags.get("type").map(String::as_str).unwrap_or("p").parse()?;
    let fit: Fit = flags.get("fit").map(String::as_str).unwrap_or("wf").parse()?;
    let size_bytes = size_in_bytes(size, unit)?;

    match kind {
        PartKind::Logical => {
            let ebr = create_logical_partition(path, size_bytes, name, fit)?;
            Ok(format!(
                "logical partition created: {name} at offset {}",
                ebr.start
            ))
        }
        _ => {
            let entry = create_partition(path, size_bytes, name, kind, fit)?;
            Ok(format!(
                "partition created: {name} at offset {} ({size_bytes} bytes)",
                entry.start
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::io::{open_disk, read_mbr};
    use crate::disk::store::create_disk;

    #[test]
    fn fdisk_creates_primary_with_kilobyte_default() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new();
        let path = dir.path().join("d.vd");
        create_disk(&path, 1024 * 1024, Fit::First).unwrap();
        let arg = format!("-path={}", path.display());

        run(&["-size=100", &arg, "-name=Part1"], &ctx).unwrap();

        let mut file = open_disk(&path).unwrap();
        let mbr = read_mbr(&mut file).unwrap();
        let (_, entry) = mbr.find_active("Part1").unwrap();
        assert_eq!(entry.size, 100 * 1024);
        assert!(entry.is_primary());
        assert_eq!(entry.fit, b'w');
    }

    #[test]
    fn fdisk_requires_name() {
        let ctx = Context::new();
        assert!(run(&["-size=100", "-path=/tmp/x.vd"], &ctx).is_err());
    }
}
