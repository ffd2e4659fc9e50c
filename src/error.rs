use thiserror::Error;

/// Unified error type for all disk and filesystem operations.
///
/// Command handlers print these; nothing is retried and nothing is
/// swallowed. Short positional reads surface as `CorruptImage`, every
/// other I/O failure as `Io`.
#[derive(Debug, Error)]
pub enum DiskError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate: {0}")]
    Duplicate(String),

    #[error("partition already mounted: {0}")]
    AlreadyMounted(String),

    #[error("partition not mounted: {0}")]
    NotMounted(String),

    #[error("out of space: {0}")]
    OutOfSpace(String),

    #[error("corrupt disk image: {0}")]
    CorruptImage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Destructive operation rejected because the caller did not confirm it.
    #[error("operation cancelled")]
    Cancelled,
}

/// Result alias using `DiskError`.
pub type Result<T> = std::result::Result<T, DiskError>;
