//! `mkfs` command: format a mounted partition.
//!
//! Usage:
//!   mkfs -id=031a [-type=ext2]

use crate::commands::{parse_flags, require};
use crate::context::Context;
use crate::error::Result;
use crate::fs::format::format;
use crate::fs::layout::{FsKind, SuperBlock};

pub fn handle_argv(argv: &[&str], context: &Context) {
    match run(argv, context) {
        Ok(sb) => println!(
            "partition formatted: {} inodes, {} blocks",
            sb.inodes_count, sb.blocks_count
        ),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn run(argv: &[&str], context: &Context) -> Result<SuperBlock> {
    let flags = parse_flags(argv, &["id", "type"])?;
    let id = require(&flags, "id")?;
    let kind: FsKind = flags.get("type").map(String::as_str).unwrap_or("ext2").parse()?;
    format(context, id, kind)
}
