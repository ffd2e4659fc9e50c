//! Filesystem formatter for mounted primary partitions.

use crate::context::Context;
use crate::disk::io::{open_disk, open_disk_readonly, read_struct, write_struct};
use crate::disk::layout::timestamp_now;
use crate::disk::mount::MountedPartition;
use crate::error::{DiskError, Result};
use crate::fs::layout::{
    BLOCK_SIZE, EXT2_MAGIC, FS_TYPE_EXT2, FsKind, INODE_SIZE, SUPERBLOCK_SIZE, SuperBlock,
};

/// Seed payload for the user directory: one root group line, one root
/// user line. Consumed by the login collaborator, not by the core.
pub const USERS_SEED: &str = "1,G,root\n1,U,root,root,123\n";

/// Geometry derived from a partition's size and the fixed record sizes.
///
/// `n = floor((P - S) / (4 + I + 3B))`, minimum 1: one bitmap byte plus
/// one inode record plus three block records per inode. Deterministic -
/// the same partition size always yields the same counts and offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub inodes_count: i32,
    pub blocks_count: i32,
    pub bm_inode_start: i32,
    pub bm_block_start: i32,
    pub inode_start: i32,
    pub block_start: i32,
}

pub fn compute_geometry(part_start: i64, part_size: i64) -> Geometry {
    let s = SUPERBLOCK_SIZE as i64;
    let i = INODE_SIZE as i64;
    let b = BLOCK_SIZE as i64;

    let n = ((part_size - s) / (4 + i + 3 * b)).max(1);
    let bm_inode_start = part_start + s;
    let bm_block_start = bm_inode_start + n;
    let inode_start = bm_block_start + n;
    let block_start = inode_start + n * i;

    Geometry {
        inodes_count: n as i32,
        blocks_count: (3 * n) as i32,
        bm_inode_start: bm_inode_start as i32,
        bm_block_start: bm_block_start as i32,
        inode_start: inode_start as i32,
        block_start: block_start as i32,
    }
}

/// Format the mounted partition identified by `id` with an ext2-like
/// layout.
///
/// Write order is the commit protocol: both bitmaps and the user seed go
/// out first, the superblock last. A failure part-way through leaves no
/// magic at the partition start, so a torn format is detectable and never
/// presents initialized-looking metadata over uninitialized bitmaps.
pub fn format(ctx: &Context, id: &str, kind: FsKind) -> Result<SuperBlock> {
    let mounted = lookup(ctx, id)?;
    if !mounted.entry.is_primary() {
        return Err(DiskError::InvalidArgument(format!(
            "partition '{id}' is not primary"
        )));
    }
    let FsKind::Ext2 = kind;

    let part_start = mounted.entry.start;
    let geo = compute_geometry(part_start, mounted.entry.size);
    let n = geo.inodes_count as usize;

    let mut file = open_disk(&mounted.path)?;

    let inode_bitmap = vec![0u8; n];
    write_struct(&mut file, geo.bm_inode_start as u64, &inode_bitmap)?;
    let block_bitmap = vec![0u8; 3 * n];
    write_struct(&mut file, geo.bm_block_start as u64, &block_bitmap)?;
    write_struct(&mut file, geo.block_start as u64, USERS_SEED.as_bytes())?;

    let sb = SuperBlock {
        fs_type: FS_TYPE_EXT2,
        inodes_count: geo.inodes_count,
        blocks_count: geo.blocks_count,
        free_blocks: geo.blocks_count,
        free_inodes: geo.inodes_count,
        mount_time: timestamp_now(),
        unmount_time: timestamp_now(),
        mount_count: 1,
        magic: EXT2_MAGIC,
        inode_size: INODE_SIZE as i32,
        block_size: BLOCK_SIZE as i32,
        first_inode: 0,
        first_block: 0,
        bm_inode_start: geo.bm_inode_start,
        bm_block_start: geo.bm_block_start,
        inode_start: geo.inode_start,
        block_start: geo.block_start,
    };
    let mut buf = [0u8; SUPERBLOCK_SIZE];
    sb.serialize(&mut buf);
    write_struct(&mut file, part_start as u64, &buf)?;
    Ok(sb)
}

/// Read the superblock of a mounted, formatted partition. Read-only; used
/// by reporting.
pub fn read_super_block_by_id(ctx: &Context, id: &str) -> Result<SuperBlock> {
    let mounted = lookup(ctx, id)?;
    let mut file = open_disk_readonly(&mounted.path)?;
    let mut buf = [0u8; SUPERBLOCK_SIZE];
    read_struct(&mut file, mounted.entry.start as u64, &mut buf, "superblock")?;
    Ok(SuperBlock::deserialize(&buf))
}

fn lookup(ctx: &Context, id: &str) -> Result<MountedPartition> {
    ctx.registry()
        .mounts
        .get(id)
        .cloned()
        .ok_or_else(|| DiskError::NotMounted(format!("no partition mounted as '{id}'")))
}
