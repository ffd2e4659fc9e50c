//! Ext2-like on-disk filesystem structures.
//!
//! Only the superblock and the bitmaps are exercised by the formatter;
//! the inode and block records are declared for their sizes, which drive
//! the geometry computation, and for future file operations.

use crate::disk::consts::TIMESTAMP_LEN;
use crate::disk::layout::timestamp_now;

pub const SUPERBLOCK_SIZE: usize = 98; // 15 * 4 + 2 * 19
pub const INODE_SIZE: usize = 137; // 3 * 4 + 3 * 19 + 16 * 4 + 1 + 3
pub const BLOCK_SIZE: usize = 64;

pub const EXT2_MAGIC: i32 = 0xEF53;
pub const FS_TYPE_EXT2: i32 = 2;

/// Filesystem flavor requested by `mkfs`. Only ext2 is supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsKind {
    Ext2,
}

impl std::str::FromStr for FsKind {
    type Err = crate::error::DiskError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ext2" => Ok(FsKind::Ext2),
            other => Err(crate::error::DiskError::InvalidArgument(format!(
                "unsupported filesystem type '{other}'"
            ))),
        }
    }
}

// Filesystem header at the start of a formatted partition - 98 B
#[repr(C)]
#[derive(Clone, Debug)]
pub struct SuperBlock {
    pub fs_type: i32,                      // 4 B (offset 0)
    pub inodes_count: i32,                 // 4 B (offset 4)
    pub blocks_count: i32,                 // 4 B (offset 8)
    pub free_blocks: i32,                  // 4 B (offset 12)
    pub free_inodes: i32,                  // 4 B (offset 16)
    pub mount_time: [u8; TIMESTAMP_LEN],   // 19 B (offset 20)
    pub unmount_time: [u8; TIMESTAMP_LEN], // 19 B (offset 39)
    pub mount_count: i32,                  // 4 B (offset 58)
    pub magic: i32,                        // 4 B (offset 62)
    pub inode_size: i32,                   // 4 B (offset 66)
    pub block_size: i32,                   // 4 B (offset 70)
    pub first_inode: i32,                  // 4 B (offset 74)
    pub first_block: i32,                  // 4 B (offset 78)
    pub bm_inode_start: i32,               // 4 B (offset 82)
    pub bm_block_start: i32,               // 4 B (offset 86)
    pub inode_start: i32,                  // 4 B (offset 90)
    pub block_start: i32,                  // 4 B (offset 94)
}

impl SuperBlock {
    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), SUPERBLOCK_SIZE);
        out[0..4].copy_from_slice(&self.fs_type.to_le_bytes());
        out[4..8].copy_from_slice(&self.inodes_count.to_le_bytes());
        out[8..12].copy_from_slice(&self.blocks_count.to_le_bytes());
        out[12..16].copy_from_slice(&self.free_blocks.to_le_bytes());
        out[16..20].copy_from_slice(&self.free_inodes.to_le_bytes());
        out[20..39].copy_from_slice(&self.mount_time);
        out[39..58].copy_from_slice(&self.unmount_time);
        out[58..62].copy_from_slice(&self.mount_count.to_le_bytes());
        out[62..66].copy_from_slice(&self.magic.to_le_bytes());
        out[66..70].copy_from_slice(&self.inode_size.to_le_bytes());
        out[70..74].copy_from_slice(&self.block_size.to_le_bytes());
        out[74..78].copy_from_slice(&self.first_inode.to_le_bytes());
        out[78..82].copy_from_slice(&self.first_block.to_le_bytes());
        out[82..86].copy_from_slice(&self.bm_inode_start.to_le_bytes());
        out[86..90].copy_from_slice(&self.bm_block_start.to_le_bytes());
        out[90..94].copy_from_slice(&self.inode_start.to_le_bytes());
        out[94..98].copy_from_slice(&self.block_start.to_le_bytes());
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), SUPERBLOCK_SIZE);
        let le32 = |at: usize| i32::from_le_bytes(inp[at..at + 4].try_into().unwrap());
        let mut mount_time = [0u8; TIMESTAMP_LEN];
        mount_time.copy_from_slice(&inp[20..39]);
        let mut unmount_time = [0u8; TIMESTAMP_LEN];
        unmount_time.copy_from_slice(&inp[39..58]);
        Self {
            fs_type: le32(0),
            inodes_count: le32(4),
            blocks_count: le32(8),
            free_blocks: le32(12),
            free_inodes: le32(16),
            mount_time,
            unmount_time,
            mount_count: le32(58),
            magic: le32(62),
            inode_size: le32(66),
            block_size: le32(70),
            first_inode: le32(74),
            first_block: le32(78),
            bm_inode_start: le32(82),
            bm_block_start: le32(86),
            inode_start: le32(90),
            block_start: le32(94),
        }
    }
}

// One inode record - 137 B
#[repr(C)]
#[derive(Clone)]
pub struct Inode {
    pub uid: i32,                   // 4 B (offset 0)
    pub gid: i32,                   // 4 B (offset 4)
    pub size: i32,                  // 4 B (offset 8)
    pub atime: [u8; TIMESTAMP_LEN], // 19 B (offset 12)
    pub ctime: [u8; TIMESTAMP_LEN], // 19 B (offset 31)
    pub mtime: [u8; TIMESTAMP_LEN], // 19 B (offset 50)
    pub blocks: [i32; 16],          // 64 B (offset 69) | 12 direct + 3 indirect tiers + spare
    pub kind: u8,                   // 1 B (offset 133) | 0 - dir, 1 - file
    pub perms: [u8; 3],             // 3 B (offset 134)
}

impl Inode {
    pub fn new(uid: i32, gid: i32, kind: u8) -> Self {
        let now = timestamp_now();
        Self {
            uid,
            gid,
            size: 0,
            atime: now,
            ctime: now,
            mtime: now,
            blocks: [-1; 16],
            kind,
            perms: [6, 6, 4],
        }
    }

    pub fn serialize(&self, out: &mut [u8]) {
        debug_assert_eq!(out.len(), INODE_SIZE);
        out[0..4].copy_from_slice(&self.uid.to_le_bytes());
        out[4..8].copy_from_slice(&self.gid.to_le_bytes());
        out[8..12].copy_from_slice(&self.size.to_le_bytes());
        out[12..31].copy_from_slice(&self.atime);
        out[31..50].copy_from_slice(&self.ctime);
        out[50..69].copy_from_slice(&self.mtime);
        for (i, block) in self.blocks.iter().enumerate() {
            let at = 69 + i * 4;
            out[at..at + 4].copy_from_slice(&block.to_le_bytes());
        }
        out[133] = self.kind;
        out[134..137].copy_from_slice(&self.perms);
    }

    pub fn deserialize(inp: &[u8]) -> Self {
        debug_assert_eq!(inp.len(), INODE_SIZE);
        let le32 = |at: usize| i32::from_le_bytes(inp[at..at + 4].try_into().unwrap());
        let mut atime = [0u8; TIMESTAMP_LEN];
        atime.copy_from_slice(&inp[12..31]);
        let mut ctime = [0u8; TIMESTAMP_LEN];
        ctime.copy_from_slice(&inp[31..50]);
        let mut mtime = [0u8; TIMESTAMP_LEN];
        mtime.copy_from_slice(&inp[50..69]);
        let mut blocks = [0i32; 16];
        for (i, block) in blocks.iter_mut().enumerate() {
            *block = le32(69 + i * 4);
        }
        let mut perms = [0u8; 3];
        perms.copy_from_slice(&inp[134..137]);
        Self {
            uid: le32(0),
            gid: le32(4),
            size: le32(8),
            atime,
            ctime,
            mtime,
            blocks,
            kind: inp[133],
            perms,
        }
    }
}

/// One slot of a directory block: a name mapped to an inode number.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DirSlot {
    pub name: [u8; 12],
    pub inode: i32,
}

// Directory payload block: four name/inode slots - 64 B
#[repr(C)]
pub struct DirectoryBlock {
    pub slots: [DirSlot; 4],
}

// Raw file payload block - 64 B
#[repr(C)]
pub struct FileBlock {
    pub content: [u8; BLOCK_SIZE],
}
