//! `mounted` command: list the mount table.
//!
//! Usage:
//!   mounted

use crate::context::Context;

pub fn handle_argv(_argv: &[&str], context: &Context) {
    print_table(context);
}

pub fn print_table(context: &Context) {
    let registry = context.registry();
    if registry.mounts.is_empty() {
        println!("no mounted partitions");
        return;
    }
    println!("mounted partitions:");
    for m in registry.mounts.iter() {
        println!(
            "  id={} path={} name={} start={} size={}",
            m.id,
            m.path.display(),
            m.entry.name_str(),
            m.entry.start,
            m.entry.size
        );
    }
}
