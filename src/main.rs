mod commands;
mod context;
mod disk;
mod error;
mod fs;
mod utils;

use commands::Registry;
use context::Context;
use utils::{arg_man, tui};

fn main() -> anyhow::Result<()> {
    let context = Context::new();
    let registry = Registry::new();

    if let Some(script) = arg_man::handle_prog_args() {
        arg_man::run_script(&script, &registry, &context)?;
        return Ok(());
    }
    tui::handle_app_loop(&registry, &context);
    Ok(())
}
