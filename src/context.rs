use crate::disk::layout::Fit;
use crate::disk::mount::MountTable;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

/// A disk created during this session, for listing.
#[derive(Debug, Clone)]
pub struct DiskRecord {
    pub path: PathBuf,
    pub size: i64,
    pub fit: Fit,
}

/// In-memory registries: the mount table and the session disk list.
#[derive(Default)]
pub struct Registry {
    pub mounts: MountTable,
    pub disks: Vec<DiskRecord>,
}

impl Registry {
    pub fn remember_disk(&mut self, record: DiskRecord) {
        self.disks.retain(|d| d.path != record.path);
        self.disks.push(record);
    }

    pub fn forget_disk(&mut self, path: &std::path::Path) {
        self.disks.retain(|d| d.path != path);
    }
}

/// Service context handed to every command handler.
///
/// One process-wide lock guards the registries. It covers registry
/// mutation only; disk file I/O runs outside it so operations on
/// unrelated images never serialize on each other.
pub struct Context {
    registry: Mutex<Registry>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::default()),
        }
    }

    pub fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().expect("registry lock poisoned")
    }
}
