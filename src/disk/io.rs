//! Positional I/O against a disk image file.
//!
//! Every record lives at an absolute byte offset; helpers here seek and
//! read/write exactly one record. A short read means the image is
//! truncated relative to what its own structures claim, which is reported
//! as `CorruptImage` rather than a plain I/O error.

use crate::disk::consts::{EBR_SIZE, MBR_SIZE};
use crate::disk::layout::{Ebr, Mbr};
use crate::error::{DiskError, Result};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Open an existing disk image for reading and writing.
pub fn open_disk(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => {
                DiskError::NotFound(format!("disk image '{}'", path.display()))
            }
            _ => DiskError::Io(e),
        })
}

/// Open an existing disk image read-only.
pub fn open_disk_readonly(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DiskError::NotFound(format!("disk image '{}'", path.display())),
        _ => DiskError::Io(e),
    })
}

pub fn read_struct(file: &mut File, offset: u64, buf: &mut [u8], what: &str) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            DiskError::CorruptImage(format!("short read of {what} at offset {offset}"))
        }
        _ => DiskError::Io(e),
    })
}

pub fn write_struct(file: &mut File, offset: u64, buf: &[u8]) -> Result<()> {
    file.seek(SeekFrom::Start(offset))?;
    file.write_all(buf)?;
    Ok(())
}

pub fn read_mbr(file: &mut File) -> Result<Mbr> {
    let mut buf = [0u8; MBR_SIZE];
    read_struct(file, 0, &mut buf, "MBR")?;
    Ok(Mbr::deserialize(&buf))
}

pub fn write_mbr(file: &mut File, mbr: &Mbr) -> Result<()> {
    let mut buf = [0u8; MBR_SIZE];
    mbr.serialize(&mut buf);
    write_struct(file, 0, &buf)
}

pub fn read_ebr(file: &mut File, offset: i64) -> Result<Ebr> {
    let mut buf = [0u8; EBR_SIZE];
    read_struct(file, offset as u64, &mut buf, "EBR")?;
    Ok(Ebr::deserialize(&buf))
}

pub fn write_ebr(file: &mut File, offset: i64, ebr: &Ebr) -> Result<()> {
    let mut buf = [0u8; EBR_SIZE];
    ebr.serialize(&mut buf);
    write_struct(file, offset as u64, &buf)
}

/// Overwrite `len` bytes at `offset` with zeros, in bounded chunks.
pub fn zero_fill(file: &mut File, offset: i64, len: i64) -> Result<()> {
    const CHUNK: usize = 64 * 1024;
    let zeros = [0u8; CHUNK];
    file.seek(SeekFrom::Start(offset as u64))?;
    let mut remaining = len as usize;
    while remaining > 0 {
        let n = remaining.min(CHUNK);
        file.write_all(&zeros[..n])?;
        remaining -= n;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::layout::Fit;

    fn image_with_mbr(dir: &tempfile::TempDir, size: i64) -> std::path::PathBuf {
        let path = dir.path().join("disk.vd");
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)
            .unwrap();
        file.set_len(size as u64).unwrap();
        write_mbr(&mut file, &Mbr::new(size, Fit::First, 7)).unwrap();
        path
    }

    #[test]
    fn mbr_read_back_matches() {
        let dir = tempfile::tempdir().unwrap();
        let path = image_with_mbr(&dir, 4096);
        let mut file = open_disk(&path).unwrap();
        let mbr = read_mbr(&mut file).unwrap();
        assert_eq!(mbr.size, 4096);
        assert_eq!(mbr.signature, 7);
        assert!(mbr.partitions.iter().all(|p| p.is_free()));
    }

    #[test]
    fn short_image_reports_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.vd");
        std::fs::write(&path, [0u8; 10]).unwrap();
        let mut file = open_disk(&path).unwrap();
        match read_mbr(&mut file) {
            Err(DiskError::CorruptImage(_)) => {}
            other => panic!("expected CorruptImage, got {other:?}"),
        }
    }

    #[test]
    fn missing_image_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        match open_disk(&dir.path().join("absent.vd")) {
            Err(DiskError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn zero_fill_clears_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("z.vd");
        std::fs::write(&path, [0xAAu8; 256]).unwrap();
        let mut file = open_disk(&path).unwrap();
        zero_fill(&mut file, 16, 100).unwrap();

        let data = std::fs::read(&path).unwrap();
        assert!(data[..16].iter().all(|&b| b == 0xAA));
        assert!(data[16..116].iter().all(|&b| b == 0));
        assert!(data[116..].iter().all(|&b| b == 0xAA));
    }
}
