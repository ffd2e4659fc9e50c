use crate::commands::{Registry, execute_line};
use crate::context::Context;
use colored::Colorize;
use std::io;

fn write_greet() {
    println!(
        "{} - {}",
        "vdisk-emu".green(),
        env!("CARGO_PKG_VERSION").yellow()
    );
}

fn write_prefix() {
    eprint!("> ");
}

pub fn handle_app_loop(registry: &Registry, context: &Context) {
    let stdin = io::stdin();

    write_greet();
    loop {
        write_prefix();
        let mut user_input = String::new();

        // EOF ends the session like `exit`.
        match stdin.read_line(&mut user_input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }

        execute_line(&user_input, registry, context);
    }
}
