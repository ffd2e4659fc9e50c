//! `clear` command: clear the terminal screen.

use crate::context::Context;

pub fn handle_argv(_argv: &[&str], _context: &Context) {
    // ANSI: erase screen, cursor home.
    print!("\x1B[2J\x1B[H");
    let _ = std::io::Write::flush(&mut std::io::stdout());
}
