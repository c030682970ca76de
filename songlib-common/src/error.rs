//! Common error types for songlib
//!
//! Every catalog operation returns [`Error`]. The boundary layer matches on
//! [`Error::kind`] rather than on message text.

use thiserror::Error;

/// Common result type for songlib operations
pub type Result<T> = std::result::Result<T, Error>;

/// Closed set of outcome kinds surfaced by the catalog core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    EmptyArguments,
    InvalidArgument,
    Internal,
}

/// Common error types across songlib crates
#[derive(Error, Debug)]
pub enum Error {
    /// Requested song, page or verse window does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// (title, group) natural key already taken by another song
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Update carried no effective change
    #[error("Empty arguments: {0}")]
    EmptyArguments(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Kind of this error as seen by the HTTP boundary
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Error::EmptyArguments(_) => ErrorKind::EmptyArguments,
            Error::InvalidInput(_) => ErrorKind::InvalidArgument,
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Prefix the message with the failing operation, keeping the kind
    ///
    /// Storage-level errors (`Database`, `Io`) are folded into `Internal`
    /// so the context survives; sentinel kinds are preserved as-is.
    pub fn context(self, op: &str) -> Self {
        match self {
            Error::NotFound(msg) => Error::NotFound(format!("{}: {}", op, msg)),
            Error::AlreadyExists(msg) => Error::AlreadyExists(format!("{}: {}", op, msg)),
            Error::EmptyArguments(msg) => Error::EmptyArguments(format!("{}: {}", op, msg)),
            Error::InvalidInput(msg) => Error::InvalidInput(format!("{}: {}", op, msg)),
            Error::Config(msg) => Error::Config(format!("{}: {}", op, msg)),
            Error::Internal(msg) => Error::Internal(format!("{}: {}", op, msg)),
            Error::Database(e) => Error::Internal(format!("{}: database error: {}", op, e)),
            Error::Io(e) => Error::Internal(format!("{}: IO error: {}", op, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_keeps_sentinel_kind() {
        let err = Error::NotFound("song 7".to_string()).context("songs.delete");
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Not found: songs.delete: song 7");

        let err = Error::AlreadyExists("Muse / Uprising".to_string()).context("songs.add");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_database_error_becomes_internal() {
        let err = Error::from(sqlx::Error::PoolClosed).context("songs.get");
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(err.to_string().contains("songs.get"));
    }

    #[test]
    fn test_invalid_input_kind() {
        assert_eq!(
            Error::InvalidInput("page must be >= 1".to_string()).kind(),
            ErrorKind::InvalidArgument
        );
    }
}
