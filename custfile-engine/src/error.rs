//! Error kinds and error handling for the record store
//!
//! Every failure the store can report falls into one of a small set of
//! kinds. Callers match on the kind to decide what the user sees.

use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of store failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The backing file could not be opened, or the store is not open
    StoreUnavailable,
    /// The identifier is not a base-10 integer
    InvalidIdentifier,
    /// No complete record exists at the computed offset
    NotFound,
    /// Seek or read failed for a reason other than end of file
    IoFault,
    /// The layout or a record does not fit the layout
    Layout,
}

impl ErrorKind {
    /// Check if the caller can carry on using the store after this error
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ErrorKind::StoreUnavailable | ErrorKind::Layout)
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorKind::StoreUnavailable => "Store unavailable",
            ErrorKind::InvalidIdentifier => "Invalid identifier",
            ErrorKind::NotFound => "Not found",
            ErrorKind::IoFault => "I/O fault",
            ErrorKind::Layout => "Layout error",
        })
    }
}

/// Main error type for the record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open {}: {source}", path.display())]
    StoreUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record store is not open")]
    NotOpen,

    #[error("invalid record identifier {0:?}")]
    InvalidIdentifier(String),

    #[error("record {0} not found")]
    NotFound(i64),

    #[error("I/O error: {0}")]
    IoFault(#[from] std::io::Error),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("record block is {actual} bytes, layout expects {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("value for field {field:?} is {len} bytes, field holds {width}")]
    FieldOverflow {
        field: String,
        width: usize,
        len: usize,
    },

    #[error("field {0:?} is not part of the layout")]
    UnknownField(String),
}

impl StoreError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::StoreUnavailable { .. } | StoreError::NotOpen => {
                ErrorKind::StoreUnavailable
            }
            StoreError::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::IoFault(_) => ErrorKind::IoFault,
            StoreError::InvalidLayout(_)
            | StoreError::LengthMismatch { .. }
            | StoreError::FieldOverflow { .. }
            | StoreError::UnknownField(_) => ErrorKind::Layout,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
