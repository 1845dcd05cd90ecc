//! Error taxonomy carried through `Result<T, Error>`
//!
//! Two closed categories, per the spec this runtime implements: explicit
//! user-level rejection, and failures surfaced by the asynchronous I/O
//! subsystem. There is no partial-success result and no open-ended error
//! type — callers match exhaustively.

use std::fmt;

/// Result type threaded through cells, tasks and poll sources.
pub type Result<T> = std::result::Result<T, Error>;

/// The closed error taxonomy for the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Explicit rejection via `TaskValueSource::error`.
    Rejected,
    /// A failure classification from the asynchronous read subsystem
    /// (cancellation, nonexistence, unknown OS error).
    IOError(IOErrorKind),
}

/// Finer-grained classification for `Error::IOError`, mirroring the
/// failure shapes an OS read can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IOErrorKind {
    /// The request was cancelled before completion.
    Cancelled,
    /// The target file does not exist.
    NotFound,
    /// Any other OS-level failure not otherwise classified.
    Other,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Rejected => write!(f, "rejected"),
            Error::IOError(kind) => write!(f, "io error: {kind}"),
        }
    }
}

impl fmt::Display for IOErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IOErrorKind::Cancelled => write!(f, "cancelled"),
            IOErrorKind::NotFound => write!(f, "not found"),
            IOErrorKind::Other => write!(f, "unknown OS error"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        let kind = match e.kind() {
            std::io::ErrorKind::NotFound => IOErrorKind::NotFound,
            std::io::ErrorKind::Interrupted => IOErrorKind::Cancelled,
            _ => IOErrorKind::Other,
        };
        Error::IOError(kind)
    }
}
