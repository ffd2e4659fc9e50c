use crate::context::Context;
use crate::error::{DiskError, Result};
use std::collections::HashMap;
use std::io::{self, BufRead, Write};

type Handler = fn(&[&str], &Context);

pub struct Registry {
    map: HashMap<&'static str, Handler>,
}

impl Registry {
    pub fn new() -> Self {
        let mut map = HashMap::new();
        map.insert("mkdisk", crate::commands::mkdisk::handle_argv as Handler);
        map.insert("rmdisk", crate::commands::rmdisk::handle_argv as Handler);
        map.insert("fdisk", crate::commands::fdisk::handle_argv as Handler);
        map.insert("mount", crate::commands::mount::handle_argv as Handler);
        map.insert("mounted", crate::commands::mounted::handle_argv as Handler);
        map.insert("disks", crate::commands::disks::handle_argv as Handler);
        map.insert("mkfs", crate::commands::mkfs::handle_argv as Handler);
        map.insert("info", crate::commands::info::handle_argv as Handler);
        map.insert("clear", crate::commands::clear::handle_argv as Handler);
        map.insert("exit", crate::commands::exit::handle_argv as Handler);

        Self { map }
    }

    pub fn dispatch(&self, name: &str, argv: &[&str], context: &Context) {
        if let Some(handler) = self.map.get(name) {
            handler(argv, context);
        } else {
            eprintln!("Unknown command: {name}");
        }
    }
}

/// Run one input line: skip blanks, echo `#` comment lines, otherwise
/// split into command word and flags and dispatch.
pub fn execute_line(line: &str, registry: &Registry, context: &Context) {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return;
    }
    if trimmed.starts_with('#') {
        println!("{trimmed}");
        return;
    }
    let mut it = trimmed.split_whitespace();
    let command = it.next().unwrap().to_lowercase();
    let argv: Vec<&str> = it.collect();
    registry.dispatch(&command, &argv, context);
}

/// Parse `-key=value` flags. Keys are case-insensitive and must be in
/// `allowed`; values keep their case, surrounding quotes stripped.
pub fn parse_flags(argv: &[&str], allowed: &[&str]) -> Result<HashMap<String, String>> {
    let mut flags = HashMap::new();
    for arg in argv {
        let body = arg.strip_prefix('-').ok_or_else(|| {
            DiskError::InvalidArgument(format!("expected -key=value parameter, got '{arg}'"))
        })?;
        let (key, value) = body.split_once('=').ok_or_else(|| {
            DiskError::InvalidArgument(format!("parameter '-{body}' is missing '=value'"))
        })?;
        let key = key.to_lowercase();
        if !allowed.contains(&key.as_str()) {
            return Err(DiskError::InvalidArgument(format!(
                "unknown parameter '-{key}'"
            )));
        }
        flags.insert(key, value.trim_matches('"').to_string());
    }
    Ok(flags)
}

/// Required flag lookup with a uniform error.
pub fn require<'a>(flags: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    flags
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| DiskError::InvalidArgument(format!("parameter '-{key}' is mandatory")))
}

/// Size in bytes from a count and a unit flag (b/k/m).
pub fn size_in_bytes(size: i64, unit: &str) -> Result<i64> {
    let mul = match unit.to_ascii_lowercase().as_str() {
        "b" => crate::disk::consts::UNIT_B,
        "k" => crate::disk::consts::UNIT_K,
        "m" => crate::disk::consts::UNIT_M,
        other => {
            return Err(DiskError::InvalidArgument(format!(
                "unit must be b, k or m, got '{other}'"
            )));
        }
    };
    Ok(size.saturating_mul(mul))
}

/// Ask the user to confirm a destructive action. Lives in the command
/// layer; the core only ever sees the resulting boolean.
pub fn confirm_destructive(prompt: &str) -> bool {
    print!("{prompt} (y/n): ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

pub mod clear;
pub mod disks;
pub mod exit;
pub mod fdisk;
pub mod info;
pub mod mkdisk;
pub mod mkfs;
pub mod mount;
pub mod mounted;
pub mod rmdisk;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse_and_strip_quotes() {
        let flags = parse_flags(
            &["-size=3000", "-path=\"/tmp/Disco1.vd\"", "-FIT=bf"],
            &["size", "path", "fit"],
        )
        .unwrap();
        assert_eq!(flags["size"], "3000");
        assert_eq!(flags["path"], "/tmp/Disco1.vd");
        assert_eq!(flags["fit"], "bf");
    }

    #[test]
    fn unknown_flag_is_rejected() {
        match parse_flags(&["-bogus=1"], &["size"]) {
            Err(DiskError::InvalidArgument(_)) => {}
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn flag_without_value_is_rejected() {
        match parse_flags(&["-size"], &["size"]) {
            Err(DiskError::InvalidArgument(_)) => {}
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn sizes_scale_by_unit() {
        assert_eq!(size_in_bytes(5, "b").unwrap(), 5);
        assert_eq!(size_in_bytes(5, "k").unwrap(), 5 * 1024);
        assert_eq!(size_in_bytes(5, "M").unwrap(), 5 * 1024 * 1024);
        assert!(size_in_bytes(5, "g").is_err());
    }
}
