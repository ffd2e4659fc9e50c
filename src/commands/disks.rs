//! `disks` command: list the disks created in this session.
//!
//! Usage:
//!   disks

use crate::context::Context;

pub fn handle_argv(_argv: &[&str], context: &Context) {
    let registry = context.registry();
    if registry.disks.is_empty() {
        println!("no disks created in this session");
        return;
    }
    println!("disks:");
    for d in &registry.disks {
        println!(
            "  path={} size={} fit={}",
            d.path.display(),
            d.size,
            d.fit.as_byte() as char
        );
    }
}
