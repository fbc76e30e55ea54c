//! On-disk encoding for journal files.
//!
//! # Responsibility
//! - Decode the JSON array written by current and legacy journal pages.
//! - Encode record snapshots with canonical field names.
//!
//! # Invariants
//! - Writes always use canonical names (`date`, `category`, `description`,
//!   `cost`, `notes`, `created_at`).
//! - Reads accept the legacy Indonesian names and loose date formats.
//! - An empty or whitespace-only file decodes to an empty collection.

use crate::model::record::Record;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";
const LEGACY_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// JSON layout used when writing a journal file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Indented output, friendly to hand edits.
    #[default]
    Pretty,
    Compact,
}

/// Record shape as found on disk, before migration.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct StoredRecord {
    #[serde(default, deserialize_with = "deserialize_loose_id")]
    pub id: Option<String>,
    #[serde(alias = "tanggal", deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(default, alias = "kategori")]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub judul: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    /// Legacy free text: the description when nothing title-like exists,
    /// otherwise the notes.
    #[serde(default)]
    pub catatan: Option<String>,
    #[serde(default, alias = "biaya")]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(
        default,
        alias = "timestamp",
        alias = "waktu",
        deserialize_with = "deserialize_timestamp"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    /// Resolves `(description, notes)` across canonical and legacy fields.
    ///
    /// Precedence for the description is `description`, `judul`, `title`,
    /// then `catatan`. When `catatan` is not used as the description it fills
    /// `notes` if those are absent.
    pub fn resolve_text(&mut self) -> (String, Option<String>) {
        let catatan = self.catatan.take();
        let notes = self.notes.take();
        let primary = self
            .description
            .take()
            .or_else(|| self.judul.take())
            .or_else(|| self.title.take());
        match primary {
            Some(description) => (description, notes.or(catatan)),
            None => (catatan.unwrap_or_default(), notes),
        }
    }
}

/// Decodes a journal file body.
pub(crate) fn decode(bytes: &[u8]) -> serde_json::Result<Vec<StoredRecord>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
}

/// Encodes a snapshot, terminated by a newline.
pub(crate) fn encode(records: &[Record], format: JsonFormat) -> serde_json::Result<Vec<u8>> {
    let mut bytes = match format {
        JsonFormat::Pretty => serde_json::to_vec_pretty(records)?,
        JsonFormat::Compact => serde_json::to_vec(records)?,
    };
    bytes.push(b'\n');
    Ok(bytes)
}

/// Parses a calendar date, dropping any time-of-day component.
pub(crate) fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }
    // Keep the wall-clock day the entry was written in, not its UTC day.
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.date_naive());
    }
    parse_naive_datetime(trimmed).map(|naive| naive.date())
}

/// Parses RFC 3339 or a naive datetime (read as UTC).
pub(crate) fn parse_loose_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(timestamp.with_timezone(&Utc));
    }
    parse_naive_datetime(trimmed).map(|naive| naive.and_utc())
}

fn parse_naive_datetime(raw: &str) -> Option<NaiveDateTime> {
    LEGACY_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
}

fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_loose_date(&raw).ok_or_else(|| de::Error::custom(format!("invalid date `{raw}`")))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_loose_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{raw}`"))),
    }
}

// Older pages wrote row indexes as numeric ids.
fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        Value::Number(value) => Ok(Some(value.to_string())),
        other => Err(de::Error::custom(format!("invalid record id `{other}`"))),
    }
}
