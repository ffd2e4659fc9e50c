//! `rmdisk` command: remove a disk image.
//!
//! Usage:
//!   rmdisk -path="/tmp/Disco1.vd"
//!
//! Asks for confirmation before deleting; the core receives the answer
//! as a pre-validated flag and never prompts by itself.

use crate::commands::{confirm_destructive, parse_flags, require};
use crate::context::Context;
use crate::disk::store::delete_disk;
use crate::error::{DiskError, Result};
use std::path::Path;

pub fn handle_argv(argv: &[&str], context: &Context) {
    match run(argv, context) {
        Ok(path) => println!("disk removed: {path}"),
        Err(DiskError::Cancelled) => println!("{}", DiskError::Cancelled),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn run(argv: &[&str], context: &Context) -> Result<String> {
    let flags = parse_flags(argv, &["path"])?;
    let path = Path::new(require(&flags, "path")?);

    let confirmed = confirm_destructive(&format!("delete disk '{}'?", path.display()));
    delete_disk(path, confirmed)?;
    context.registry().forget_disk(path);
    Ok(path.display().to_string())
}
