//! `mount` command: mount a primary partition and print its identifier.
//!
//! Usage:
//!   mount -path="/tmp/Disco1.vd" -name=Part1

use crate::commands::{parse_flags, require};
use crate::context::Context;
use crate::disk::mount::mount;
use crate::error::Result;
use std::path::Path;

pub fn handle_argv(argv: &[&str], context: &Context) {
    match run(argv, context) {
        Ok(id) => {
            println!("partition mounted with id '{id}'");
            super::mounted::print_table(context);
        }
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn run(argv: &[&str], context: &Context) -> Result<String> {
    let flags = parse_flags(argv, &["path", "name"])?;
    let path = Path::new(require(&flags, "path")?);
    let name = require(&flags, "name")?;
    mount(context, path, name)
}
