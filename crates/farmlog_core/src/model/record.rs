//! Journal record domain model.
//!
//! # Responsibility
//! - Define the fixed-field entry persisted by every journal store.
//! - Provide creation helpers that assign identity and creation time.
//!
//! # Invariants
//! - `id` is never blank and is never reassigned once persisted.
//! - `cost` is finite and `>= 0`; zero means no associated cost.
//! - `description` is non-empty after trimming.
//! - `created_at` is set once at creation and preserved by edits.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque, stable identifier of one journal record.
///
/// Legacy journals may carry arbitrary strings here, so this is not
/// constrained to UUID syntax. New ids are random v4 UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Generates a new globally unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing id, trimming surrounding whitespace.
    ///
    /// # Errors
    /// - Returns `RecordValidationError::BlankId` for empty input.
    pub fn parse(value: &str) -> Result<Self, RecordValidationError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(RecordValidationError::BlankId);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validation failures for journal records.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordValidationError {
    BlankId,
    EmptyDescription,
    NegativeCost(f64),
    NonFiniteCost,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankId => write!(f, "record id cannot be blank"),
            Self::EmptyDescription => write!(f, "description cannot be empty"),
            Self::NegativeCost(cost) => write!(f, "cost must be >= 0, got {cost}"),
            Self::NonFiniteCost => write!(f, "cost must be a finite number"),
        }
    }
}

impl Error for RecordValidationError {}

/// Canonical journal entry.
///
/// Fields are public so presentation layers can edit a snapshot copy freely;
/// stores call [`Record::validate`] before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: RecordId,
    /// Day the activity happened. Aggregation keys off this, not `created_at`.
    pub date: NaiveDate,
    /// Free label (activity type, waste type...). Stored verbatim.
    pub category: String,
    pub description: String,
    pub cost: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// `None` only for legacy rows written before timestamps existed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Record {
    /// Creates a validated record with a fresh id and `created_at = now`.
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        cost: f64,
    ) -> Result<Self, RecordValidationError> {
        NewRecord::new(date, category, description, cost).into_record(Utc::now())
    }

    /// Checks field-level invariants.
    ///
    /// # Errors
    /// - `EmptyDescription` when the description is blank.
    /// - `NonFiniteCost` / `NegativeCost` when the cost is NaN, infinite or < 0.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        validate_fields(&self.description, self.cost)
    }
}

/// Input shape for appending a record.
///
/// `id` and `created_at` are optional; missing values are assigned when the
/// record is materialized by a store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub id: Option<RecordId>,
    pub date: NaiveDate,
    pub category: String,
    pub description: String,
    pub cost: f64,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewRecord {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        cost: f64,
    ) -> Self {
        Self {
            id: None,
            date,
            category: category.into(),
            description: description.into(),
            cost,
            notes: None,
            created_at: None,
        }
    }

    /// Attaches optional notes. Blank notes are stored as `None`.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = normalize_notes(Some(notes.into()));
        self
    }

    /// Uses a caller-provided id, e.g. when importing from another journal.
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }

    /// Validates input and assigns missing identity fields.
    ///
    /// # Invariants
    /// - Validation runs before any id is generated.
    /// - A provided `created_at` is kept as-is.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Record, RecordValidationError> {
        validate_fields(&self.description, self.cost)?;
        Ok(Record {
            id: self.id.unwrap_or_else(RecordId::generate),
            date: self.date,
            category: self.category,
            description: self.description,
            cost: self.cost,
            notes: normalize_notes(self.notes),
            created_at: Some(self.created_at.unwrap_or(now)),
        })
    }
}

/// Collapses blank notes to `None`.
pub(crate) fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|value| !value.trim().is_empty())
}

fn validate_fields(description: &str, cost: f64) -> Result<(), RecordValidationError> {
    if description.trim().is_empty() {
        return Err(RecordValidationError::EmptyDescription);
    }
    if !cost.is_finite() {
        return Err(RecordValidationError::NonFiniteCost);
    }
    if cost < 0.0 {
        return Err(RecordValidationError::NegativeCost(cost));
    }
    Ok(())
}
