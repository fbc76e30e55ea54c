//! Journal persistence contracts and the flat-file implementation.
//!
//! # Responsibility
//! - Define the `RecordStore` contract consumed by services and front ends.
//! - Keep file layout, migration and write mechanics behind that contract.
//!
//! # Invariants
//! - Every mutating call is a complete read-modify-write of the backing file.
//! - New or changed records are validated before any write; a rejected call
//!   persists nothing. Rows already stored unchanged are not revalidated.
//! - A malformed backing file loads as an empty collection plus a warning.
//! - Single writer assumed: concurrent writers lose updates (last write wins).

use crate::model::record::{NewRecord, Record, RecordId, RecordValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

pub mod codec;
pub mod json_file;
pub(crate) mod migrator;

pub use codec::JsonFormat;
pub use json_file::JsonFileStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failures surfaced to callers.
#[derive(Debug)]
pub enum StoreError {
    /// A record failed field validation; nothing was written.
    InvalidRecord {
        id: Option<RecordId>,
        source: RecordValidationError,
    },
    /// Two records in one write share an id; nothing was written.
    DuplicateId(RecordId),
    /// Filesystem failure while touching the backing file.
    Io {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
    /// Snapshot could not be encoded.
    Encode(serde_json::Error),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: &Path, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecord { id: Some(id), source } => {
                write!(f, "invalid record `{id}`: {source}")
            }
            Self::InvalidRecord { id: None, source } => write!(f, "invalid record: {source}"),
            Self::DuplicateId(id) => write!(f, "duplicate record id: {id}"),
            Self::Io {
                action,
                path,
                source,
            } => write!(f, "failed to {action} `{}`: {source}", path.display()),
            Self::Encode(err) => write!(f, "failed to encode journal: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord { source, .. } => Some(source),
            Self::DuplicateId(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Non-fatal problem found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// The backing file exists but is not a valid journal document.
    Malformed { path: PathBuf, reason: String },
}

impl Display for LoadWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed { path, reason } => write!(
                f,
                "journal file `{}` is unreadable and was treated as empty: {reason}",
                path.display()
            ),
        }
    }
}

/// Snapshot returned by [`RecordStore::load`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LoadReport {
    /// Caller-owned copy of the stored records, in file order.
    pub records: Vec<Record>,
    /// Ids assigned by migration during this load (already written back).
    pub migrated_ids: usize,
    pub warning: Option<LoadWarning>,
}

impl LoadReport {
    pub fn is_malformed(&self) -> bool {
        matches!(self.warning, Some(LoadWarning::Malformed { .. }))
    }
}

/// Durable journal contract.
pub trait RecordStore {
    /// Reads the full collection, bootstrapping or migrating the file first.
    fn load(&self) -> StoreResult<LoadReport>;
    /// Validates and appends one record, assigning `id`/`created_at` if absent.
    fn append(&self, record: NewRecord) -> StoreResult<Record>;
    /// Overwrites the collection with exactly `records`.
    ///
    /// Only records that differ from their stored version are validated.
    fn replace_all(&self, records: &[Record]) -> StoreResult<()>;
    /// Removes the record with `id`; returns whether anything was removed.
    fn delete(&self, id: &RecordId) -> StoreResult<bool>;
}

impl<S: RecordStore + ?Sized> RecordStore for &S {
    fn load(&self) -> StoreResult<LoadReport> {
        (**self).load()
    }

    fn append(&self, record: NewRecord) -> StoreResult<Record> {
        (**self).append(record)
    }

    fn replace_all(&self, records: &[Record]) -> StoreResult<()> {
        (**self).replace_all(records)
    }

    fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        (**self).delete(id)
    }
}
