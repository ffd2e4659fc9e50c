//! `info` command: inspect on-disk structures, read-only.
//!
//! Usage:
//!   info -path=P    prints the MBR, active partitions and EBR chains
//!   info -id=ID     prints the superblock of a mounted partition

use crate::commands::parse_flags;
use crate::context::Context;
use crate::disk::io::{open_disk_readonly, read_mbr};
use crate::disk::logical::read_chain;
use crate::disk::partitions::find_extended;
use crate::error::{DiskError, Result};
use crate::fs::format::read_super_block_by_id;
use std::path::Path;

pub fn handle_argv(argv: &[&str], context: &Context) {
    if let Err(e) = run(argv, context) {
        eprintln!("Error: {e}");
    }
}

fn run(argv: &[&str], context: &Context) -> Result<()> {
    let flags = parse_flags(argv, &["path", "id"])?;
    match (flags.get("path"), flags.get("id")) {
        (Some(path), None) => print_disk(Path::new(path)),
        (None, Some(id)) => print_superblock(context, id),
        _ => Err(DiskError::InvalidArgument(
            "exactly one of -path or -id is required".into(),
        )),
    }
}

fn print_disk(path: &Path) -> Result<()> {
    let mut file = open_disk_readonly(path)?;
    let mbr = read_mbr(&mut file)?;

    println!("disk '{}':", path.display());
    println!("  size={} created={}", mbr.size, mbr.created_str());
    println!("  signature={} fit={}", mbr.signature, mbr.fit as char);
    for (i, part) in mbr.partitions.iter().enumerate() {
        if part.is_free() {
            println!("  slot {i}: free");
        } else {
            println!(
                "  slot {i}: name={} type={} fit={} start={} size={}",
                part.name_str(),
                part.kind as char,
                part.fit as char,
                part.start,
                part.size
            );
        }
    }

    if let Some(extended) = find_extended(&mbr) {
        let chain = read_chain(path, extended.start)?;
        if chain.is_empty() {
            println!("  extended partition chain: empty");
        } else {
            println!("  extended partition chain:");
            for ebr in &chain {
                println!(
                    "    name={} start={} size={} next={}",
                    ebr.name_str(),
                    ebr.start,
                    ebr.size,
                    ebr.next
                );
            }
        }
    }
    Ok(())
}

fn print_superblock(context: &Context, id: &str) -> Result<()> {
    let sb = read_super_block_by_id(context, id)?;
    println!("superblock of '{id}':");
    println!("  fs_type={} magic={:#06x}", sb.fs_type, sb.magic);
    println!(
        "  inodes={} (free {})  blocks={} (free {})",
        sb.inodes_count, sb.free_inodes, sb.blocks_count, sb.free_blocks
    );
    println!(
        "  inode_size={} block_size={} mount_count={}",
        sb.inode_size, sb.block_size, sb.mount_count
    );
    println!(
        "  bm_inode_start={} bm_block_start={} inode_start={} block_start={}",
        sb.bm_inode_start, sb.bm_block_start, sb.inode_start, sb.block_start
    );
    Ok(())
}
