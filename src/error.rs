use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a whole operation.
///
/// Problems with a single file (unreadable, vanished, failed move) never
/// surface here; they are logged and counted by the caller instead.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("scan root is missing or not a directory: '{}'", .0.display())]
    RootUnavailable(PathBuf),

    #[error("cannot prepare trash directory '{}': {source}", .path.display())]
    TrashUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no files given to remove")]
    EmptyRequest,

    #[error("operation cancelled")]
    Cancelled,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to load config '{}': {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SweepError>;
