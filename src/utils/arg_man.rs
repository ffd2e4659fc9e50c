use crate::commands::{Registry, execute_line};
use crate::context::Context;
use anyhow::Context as _;
use std::path::{Path, PathBuf};
use std::{env, process};

fn handle_help(exit: bool) {
    println!("Usage: vdisk-emu [--help] [script]");
    println!("With a script file, commands run line by line; otherwise an interactive shell starts.");
    if exit {
        process::exit(1);
    }
}

/// Program arguments: an optional script file to execute instead of the
/// interactive shell.
pub fn handle_prog_args() -> Option<PathBuf> {
    let mut script = None;
    let mut it = env::args().skip(1);

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--help" => handle_help(true),
            _ if script.is_none() => script = Some(PathBuf::from(arg)),
            _ => handle_help(true),
        }
    }
    script
}

/// Execute a command script line by line. `#` lines are echoed, blank
/// lines skipped, every other line dispatched like interactive input.
pub fn run_script(path: &Path, registry: &Registry, context: &Context) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read script '{}'", path.display()))?;
    for line in text.lines() {
        execute_line(line, registry, context);
    }
    Ok(())
}
