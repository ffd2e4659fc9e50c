//! `mkdisk` command: create a virtual disk image.
//!
//! Usage:
//!   mkdisk -size=3000 [-unit=k|m] -path="/tmp/Disco1.vd" [-fit=bf|ff|wf]
//!
//! Defaults: unit=m, fit=ff. The image is sized exactly and carries a
//! fresh MBR with all four partition slots free.

use crate::commands::{parse_flags, require, size_in_bytes};
use crate::context::{Context, DiskRecord};
use crate::disk::layout::Fit;
use crate::disk::store::create_disk;
use crate::error::Result;
use std::path::PathBuf;

pub fn handle_argv(argv: &[&str], context: &Context) {
    match run(argv, context) {
        Ok((path, size)) => println!("disk created: {} ({size} bytes)", path.display()),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn run(argv: &[&str], context: &Context) -> Result<(PathBuf, i64)> {
    let flags = parse_flags(argv, &["size", "unit", "path", "fit"])?;
    let size: i64 = require(&flags, "size")?.parse().map_err(|_| {
        crate::error::DiskError::InvalidArgument("size must be an integer".into())
    })?;
    let unit = flags.get("unit").map(String::as_str).unwrap_or("m");
    let fit: Fit = flags.get("fit").map(String::as_str).unwrap_or("ff").parse()?;
    let path = PathBuf::from(require(&flags, "path")?);

    let size_bytes = size_in_bytes(size, unit)?;
    create_disk(&path, size_bytes, fit)?;

    context.registry().remember_disk(DiskRecord {
        path: path.clone(),
        size: size_bytes,
        fit,
    });
    Ok((path, size_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mkdisk_defaults_to_megabytes() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Context::new();
        let path = dir.path().join("d.vd");
        let arg = format!("-path={}", path.display());

        run(&["-size=2", &arg], &ctx).unwrap();

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 2 * 1024 * 1024);
        assert_eq!(ctx.registry().disks.len(), 1);
    }

    #[test]
    fn mkdisk_without_size_fails() {
        let ctx = Context::new();
        assert!(run(&["-path=/tmp/x.vd"], &ctx).is_err());
    }
}
