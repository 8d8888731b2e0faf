use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::EodKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: i64 },

    #[error("{field} is too large: {value}")]
    OutOfRange { field: &'static str, value: i64 },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must be one of {allowed}, got {value:?}")]
    UnknownOption {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },

    #[error("{name:?} is not on the employee roster")]
    NotOnRoster { name: String },

    #[error("an alert named {name:?} already exists for this date")]
    DuplicateAlert { name: String },

    #[error("cannot resolve {requested} for alert {name:?}: only {remaining} remaining")]
    OverResolution {
        name: String,
        requested: u32,
        remaining: u32,
    },

    #[error("no {kind:?} named {name:?} exists for this date")]
    UnknownReference { kind: EodKind, name: String },

    #[error("{table} has no entry at index {index} ({len} entries)")]
    NoSuchEntry {
        table: &'static str,
        index: usize,
        len: usize,
    },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open ledger {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read table {table} from {}", path.display())]
    ReadTable {
        path: PathBuf,
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("table {table} in {} has an unreadable row: {reason}", path.display())]
    CorruptRow {
        path: PathBuf,
        table: &'static str,
        reason: String,
    },

    #[error("ledger {} belongs to {found}, not {expected}", path.display())]
    ForeignLedger {
        path: PathBuf,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("failed to write ledger {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("filesystem error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(_) => None,
        }
    }
}
