//! On-disk partition table structures and their byte-exact encoding.
//!
//! All integers are little-endian; records are packed with no padding, so
//! the serialized sizes are exactly `MBR_SIZE` / `PART_ENTRY_SIZE` /
//! `EBR_SIZE`. Offsets in `start`/`next` fields are absolute from the
//! beginning of the image file.

use crate::disk::consts::{
    EBR_END, EBR_SIZE, MBR_SIZE, PART_ENTRY_SIZE, PART_NAME_LEN, STATUS_FREE, TIMESTAMP_LEN,
};
use crate::error::{DiskError, Result};
use std::fmt;

/// Allocation-strategy tag. Stored per disk and per partition; only bump
/// allocation is implemented, the tag is carried for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fit {
    Best,
    First,
    Worst,
}

impl Fit {
    pub fn as_byte(self) -> u8 {
        match self {
            Fit::Best => b'b',
            Fit::First => b'f',
            Fit::Worst => b'w',
        }
    }

    pub fn from_byte(b: u8) -> Option<Fit> {
        match b.to_ascii_lowercase() {
            b'b' => Some(Fit::Best),
            b'f' => Some(Fit::First),
            b'w' => Some(Fit::Worst),
            _ => None,
        }
    }
}

/// Command-level fit spellings: bf, ff, wf.
impl std::str::FromStr for Fit {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "b" | "bf" => Ok(Fit::Best),
            "f" | "ff" => Ok(Fit::First),
            "w" | "wf" => Ok(Fit::Worst),
            other => Err(DiskError::InvalidArgument(format!(
                "fit must be bf, ff or wf, got '{other}'"
            ))),
        }
    }
}

/// Partition kind. Logical never occupies a top-level MBR slot; it exists
/// only inside an extended partition's EBR chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartKind {
    Primary,
    Extended,
    Logical,
}

impl PartKind {
    pub fn as_byte(self) -> u8 {
        match self {
            PartKind::Primary => b'p',
            PartKind::Extended => b'e',
            PartKind::Logical => b'l',
        }
    }

    pub fn from_byte(b: u8) -> Option<PartKind> {
        match b.to_ascii_lowercase() {
            b'p' => Some(PartKind::Primary),
            b'e' => Some(PartKind::Extended),
            b'l' => Some(PartKind::Logical),
            _ => None,
        }
    }
}

impl std::str::FromStr for PartKind {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p" => Ok(PartKind::Primary),
            "e" => Ok(PartKind::Extended),
            "l" => Ok(PartKind::Logical),
            other => Err(DiskError::InvalidArgument(format!(
                "partition type must be p, e or l, got '{other}'"
            ))),
        }
    }
}

/// Deletion mode for `fdisk -delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Clear the status byte only.
    Fast,
    /// Clear the status byte and zero-fill the partition's byte range.
    Full,
}

impl std::str::FromStr for DeleteMode {
    type Err = DiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fast" => Ok(DeleteMode::Fast),
            "full" => Ok(DeleteMode::Full),
            other => Err(DiskError::InvalidArgument(format!(
                "delete mode must be fast or full, got '{other}'"
            ))),
        }
    }
}

/// Current local time as the fixed-width on-disk stamp.
pub fn timestamp_now() -> [u8; TIMESTAMP_LEN] {
    let stamp = chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();
    let mut buf = [0u8; TIMESTAMP_LEN];
    let bytes = stamp.as_bytes();
    let n = bytes.len().min(TIMESTAMP_LEN);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

fn pack_name(name: &str) -> [u8; PART_NAME_LEN] {
    let mut buf = [0u8; PART_NAME_LEN];
    let bytes = name.as_bytes();
    let n = bytes.len().min(PART_NAME_LEN);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

fn unpack_name(name: &[u8; PART_NAME_LEN]) -> &str {
    let end = name.iter().position(|&b| b == 0).unwrap_or(PART_NAME_LEN);
    std::str::from_utf8(&name[..end]).unwrap_or("<invalid>")
}

// One slot of the MBR partition table - 43 B
#[repr(C)]
#[derive(Clone, Copy)]
pub struct PartitionEntry {
    pub status: u8,                  // 1 B (offset 0)
    pub kind: u8,                    // 1 B (offset 1)
    pub fit: u8,                     // 1 B (offset 2)
    pub start: i64,                  // 8 B (offset 3..10)
    pub size: i64,                   // 8 B (offset 11..18)
    pub name: [u8; PART_NAME_LEN],   // 16 B (offset 19..34)
    pub correlative: i32,            // 4 B (offset 35..38)
    pub id: [u8; 4],                 // 4 B (offset 39..42)
}

impl PartitionEntry {
    pub fn empty() -> Self {
        Self {
            status: STATUS_FREE,
            kind: 0,
            fit: 0,
            start: 0,
            size: 0,
            name: [0u8; PART_NAME_LEN],
            correlative: 0,
            id: [0u8; 4],
        }
    }

    pub fn is_free(&self) -> bool {
        self.status == STATUS_FREE
    }

    pub fn is_extended(&self) -> bool {
        !self.is_free() && PartKind::from_byte(self.kind) == Some(PartKind::Extended)
    }

    pub fn is_primary(&self) -> bool {
        !self.is_free() && PartKind::from_byte(self.kind) == Some(PartKind::Primary)
    }

    pub fn name_str(&self) -> &str {
        unpack_name(&self.name)
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = pack_name(name);
    }

    /// Exclusive end offset of the partition's byte range.
    pub fn end(&self) -> i64 {
        self.start + self.size
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), PART_ENTRY_SIZE);
        out[0] = self.status;
        out[1] = self.kind;
        out[2] = self.fit;
        out[3..11].copy_from_slice(&self.start.to_le_bytes());
        out[11..19].copy_from_slice(&self.size.to_le_bytes());
        out[19..35].copy_from_slice(&self.name);
        out[35..39].copy_from_slice(&self.correlative.to_le_bytes());
        out[39..43].copy_from_slice(&self.id);
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), PART_ENTRY_SIZE);
        let mut name = [0u8; PART_NAME_LEN];
        name.copy_from_slice(&inp[19..35]);
        let mut id = [0u8; 4];
        id.copy_from_slice(&inp[39..43]);
        Self {
            status: inp[0],
            kind: inp[1],
            fit: inp[2],
            start: i64::from_le_bytes(inp[3..11].try_into().unwrap()),
            size: i64::from_le_bytes(inp[11..19].try_into().unwrap()),
            name,
            correlative: i32::from_le_bytes(inp[35..39].try_into().unwrap()),
            id,
        }
    }
}

impl fmt::Debug for PartitionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_free() {
            write!(f, "PartitionEntry(<free>)")
        } else {
            write!(
                f,
                "PartitionEntry({}, type={}, start={}, size={})",
                self.name_str(),
                self.kind as char,
                self.start,
                self.size
            )
        }
    }
}

// Master Boot Record at offset 0 - 204 B
#[repr(C)]
#[derive(Clone, Debug)]
pub struct Mbr {
    pub size: i64,                        // 8 B (offset 0..7)
    pub created_at: [u8; TIMESTAMP_LEN],  // 19 B (offset 8..26)
    pub signature: i32,                   // 4 B (offset 27..30)
    pub fit: u8,                          // 1 B (offset 31)
    pub partitions: [PartitionEntry; 4],  // 172 B (offset 32..203)
}

impl Mbr {
    pub fn new(size: i64, fit: Fit, signature: i32) -> Self {
        Self {
            size,
            created_at: timestamp_now(),
            signature,
            fit: fit.as_byte(),
            partitions: [PartitionEntry::empty(); 4],
        }
    }

    pub fn created_str(&self) -> &str {
        let end = self
            .created_at
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(TIMESTAMP_LEN);
        std::str::from_utf8(&self.created_at[..end]).unwrap_or("<invalid>")
    }

    pub fn active_entries(&self) -> impl Iterator<Item = &PartitionEntry> {
        self.partitions.iter().filter(|p| !p.is_free())
    }

    /// Active entry matching `name`, with its slot index.
    pub fn find_active(&self, name: &str) -> Option<(usize, &PartitionEntry)> {
        self.partitions
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_free() && p.name_str() == name)
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), MBR_SIZE);
        out[0..8].copy_from_slice(&self.size.to_le_bytes());
        out[8..27].copy_from_slice(&self.created_at);
        out[27..31].copy_from_slice(&self.signature.to_le_bytes());
        out[31] = self.fit;
        for (i, part) in self.partitions.iter().enumerate() {
            let at = 32 + i * PART_ENTRY_SIZE;
            part.serialize(&mut out[at..at + PART_ENTRY_SIZE]);
        }
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), MBR_SIZE);
        let mut created_at = [0u8; TIMESTAMP_LEN];
        created_at.copy_from_slice(&inp[8..27]);
        let mut partitions = [PartitionEntry::empty(); 4];
        for (i, part) in partitions.iter_mut().enumerate() {
            let at = 32 + i * PART_ENTRY_SIZE;
            *part = PartitionEntry::deserialize(&inp[at..at + PART_ENTRY_SIZE]);
        }
        Self {
            size: i64::from_le_bytes(inp[0..8].try_into().unwrap()),
            created_at,
            signature: i32::from_le_bytes(inp[27..31].try_into().unwrap()),
            fit: inp[31],
            partitions,
        }
    }
}

// Extended Boot Record, written at its own `start` offset - 42 B
#[repr(C)]
#[derive(Clone)]
pub struct Ebr {
    pub mount: u8,                  // 1 B (offset 0)
    pub fit: u8,                    // 1 B (offset 1)
    pub start: i64,                 // 8 B (offset 2..9)
    pub size: i64,                  // 8 B (offset 10..17)
    pub next: i64,                  // 8 B (offset 18..25)
    pub name: [u8; PART_NAME_LEN],  // 16 B (offset 26..41)
}

impl Ebr {
    pub fn new(start: i64, size: i64, fit: Fit, name: &str) -> Self {
        Self {
            mount: crate::disk::consts::STATUS_ACTIVE,
            fit: fit.as_byte(),
            start,
            size,
            next: EBR_END,
            name: pack_name(name),
        }
    }

    pub fn name_str(&self) -> &str {
        unpack_name(&self.name)
    }

    /// Both terminator encodings observed on disk (0 and the negative
    /// sentinel) mean "no successor".
    pub fn is_tail(&self) -> bool {
        self.next <= 0
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), EBR_SIZE);
        out[0] = self.mount;
        out[1] = self.fit;
        out[2..10].copy_from_slice(&self.start.to_le_bytes());
        out[10..18].copy_from_slice(&self.size.to_le_bytes());
        out[18..26].copy_from_slice(&self.next.to_le_bytes());
        out[26..42].copy_from_slice(&self.name);
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), EBR_SIZE);
        let mut name = [0u8; PART_NAME_LEN];
        name.copy_from_slice(&inp[26..42]);
        Self {
            mount: inp[0],
            fit: inp[1],
            start: i64::from_le_bytes(inp[2..10].try_into().unwrap()),
            size: i64::from_le_bytes(inp[10..18].try_into().unwrap()),
            next: i64::from_le_bytes(inp[18..26].try_into().unwrap()),
            name,
        }
    }
}

impl fmt::Debug for Ebr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ebr({}, start={}, size={}, next={})",
            self.name_str(),
            self.start,
            self.size,
            self.next
        )
    }
}
