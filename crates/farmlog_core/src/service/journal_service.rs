//! Journal use-case service.
//!
//! # Responsibility
//! - Provide add/edit/remove/list/summary entry points over any `RecordStore`.
//! - Own edit reconciliation: full field replacement with id preserved.
//!
//! # Invariants
//! - Edits never change `id` or `created_at`.
//! - An edit that changes nothing performs no write.
//! - Listing and summaries work on snapshots and never mutate the store.

use crate::aggregate::{self, JournalSummary};
use crate::model::record::{normalize_notes, NewRecord, Record, RecordId};
use crate::store::{LoadReport, RecordStore, StoreError};
use chrono::NaiveDate;
use log::info;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type JournalResult<T> = Result<T, JournalServiceError>;

/// Service error for journal use cases.
#[derive(Debug)]
pub enum JournalServiceError {
    /// Target entry does not exist.
    EntryNotFound(RecordId),
    /// Persistence-layer failure.
    Store(StoreError),
}

impl Display for JournalServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntryNotFound(id) => write!(f, "journal entry not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for JournalServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::EntryNotFound(_) => None,
        }
    }
}

impl From<StoreError> for JournalServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Full replacement field set for an edit. `id` and `created_at` are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryUpdate {
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub cost: f64,
    pub notes: Option<String>,
}

impl EntryUpdate {
    /// Starts an update from the current state of `record`.
    pub fn from_record(record: &Record) -> Self {
        Self {
            date: record.date,
            category: record.category.clone(),
            description: record.description.clone(),
            cost: record.cost,
            notes: record.notes.clone(),
        }
    }

    fn apply_to(self, current: &Record) -> Record {
        Record {
            id: current.id.clone(),
            date: self.date,
            category: self.category,
            description: self.description,
            cost: self.cost,
            notes: normalize_notes(self.notes),
            created_at: current.created_at,
        }
    }
}

/// Result of an edit request.
#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Updated(Record),
    /// Submitted fields equal the stored ones; nothing was written.
    Unchanged(Record),
}

impl EditOutcome {
    pub fn record(&self) -> &Record {
        match self {
            Self::Updated(record) | Self::Unchanged(record) => record,
        }
    }
}

/// Filter options for listing entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryQuery {
    /// Exact category match.
    pub category: Option<String>,
    /// Inclusive lower date bound.
    pub from: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub to: Option<NaiveDate>,
    pub limit: Option<usize>,
}

impl EntryQuery {
    fn matches(&self, record: &Record) -> bool {
        self.category
            .as_deref()
            .map_or(true, |category| record.category == category)
            && self.from.map_or(true, |from| record.date >= from)
            && self.to.map_or(true, |to| record.date <= to)
    }
}

/// Journal facade over store implementations.
pub struct JournalService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> JournalService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Full load report, including any malformed-file warning.
    pub fn load(&self) -> JournalResult<LoadReport> {
        Ok(self.store.load()?)
    }

    /// Current records in file order.
    pub fn snapshot(&self) -> JournalResult<Vec<Record>> {
        Ok(self.store.load()?.records)
    }

    /// Appends one entry and returns it with its assigned id.
    pub fn add_entry(&self, entry: NewRecord) -> JournalResult<Record> {
        let record = self.store.append(entry)?;
        info!(
            "event=entry_add module=service status=ok id={} category_len={}",
            record.id,
            record.category.chars().count()
        );
        Ok(record)
    }

    /// Replaces all editable fields of entry `id`.
    ///
    /// # Errors
    /// - `EntryNotFound` when no entry has `id`.
    /// - `Store(InvalidRecord)` when the new field set fails validation.
    pub fn edit_entry(&self, id: &RecordId, update: EntryUpdate) -> JournalResult<EditOutcome> {
        let mut records = self.store.load()?.records;
        let index = records
            .iter()
            .position(|record| &record.id == id)
            .ok_or_else(|| JournalServiceError::EntryNotFound(id.clone()))?;

        let updated = update.apply_to(&records[index]);
        if updated == records[index] {
            return Ok(EditOutcome::Unchanged(updated));
        }

        records[index] = updated.clone();
        self.store.replace_all(&records)?;
        info!("event=entry_edit module=service status=ok id={}", id);
        Ok(EditOutcome::Updated(updated))
    }

    /// Permanently removes entry `id`. Returns `false` when it did not exist.
    pub fn remove_entry(&self, id: &RecordId) -> JournalResult<bool> {
        let removed = self.store.delete(id)?;
        info!(
            "event=entry_remove module=service status=ok id={} removed={}",
            id, removed
        );
        Ok(removed)
    }

    /// Lists matching entries, newest `date` first; ties keep file order.
    pub fn list_entries(&self, query: &EntryQuery) -> JournalResult<Vec<Record>> {
        let mut records: Vec<Record> = self
            .snapshot()?
            .into_iter()
            .filter(|record| query.matches(record))
            .collect();
        records.sort_by(|left, right| right.date.cmp(&left.date));
        if let Some(limit) = query.limit {
            records.truncate(limit);
        }
        Ok(records)
    }

    /// Distinct categories currently in use, sorted.
    pub fn categories(&self) -> JournalResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .snapshot()?
            .into_iter()
            .map(|record| record.category)
            .collect();
        Ok(categories.into_iter().collect())
    }

    /// Month-vs-all-time summary relative to `reference_date`.
    pub fn summary(&self, reference_date: NaiveDate) -> JournalResult<JournalSummary> {
        let records = self.snapshot()?;
        Ok(aggregate::summarize(&records, reference_date))
    }
}
