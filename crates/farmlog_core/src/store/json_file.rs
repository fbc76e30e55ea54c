//! JSON-file-backed journal store.
//!
//! # Responsibility
//! - Persist one journal as a JSON array in a single file.
//! - Bootstrap missing files, run id migration on load, quarantine corrupt
//!   files before they are overwritten.
//!
//! # Invariants
//! - No in-memory cache: each call observes the latest on-disk state.
//! - Writes land in a sibling temp file first and replace the target in one
//!   rename, so a crash mid-write leaves the previous contents intact.
//! - Migration writes back at most once per load, and only when ids changed.
//! - Quarantine never overwrites an earlier quarantined file.

use super::codec::{self, JsonFormat};
use super::migrator::migrate;
use super::{LoadReport, LoadWarning, RecordStore, StoreError, StoreResult};
use crate::model::record::{NewRecord, Record, RecordId};
use chrono::Utc;
use log::{error, info, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;

const CORRUPT_SUFFIX: &str = "corrupt";

/// Journal store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    format: JsonFormat,
}

impl JsonFileStore {
    /// Creates a store for `path`. Nothing touches the disk until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: JsonFormat::default(),
        }
    }

    pub fn with_format(mut self, format: JsonFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Quarantined copies of malformed journals, oldest first.
    ///
    /// Names are `<file>.corrupt`, `<file>.corrupt.1`, `<file>.corrupt.2`...;
    /// listing stops at the first missing name.
    pub fn quarantine_files(&self) -> Vec<PathBuf> {
        (0_usize..)
            .map(|attempt| self.quarantine_candidate(attempt))
            .take_while(|path| path.exists())
            .collect()
    }

    fn quarantine_candidate(&self, attempt: usize) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(CORRUPT_SUFFIX);
        if attempt > 0 {
            name.push(format!(".{attempt}"));
        }
        self.path.with_file_name(name)
    }

    fn write_records(&self, records: &[Record]) -> StoreResult<()> {
        let bytes = codec::encode(records, self.format)?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent)
            .map_err(|err| StoreError::io("create directory", parent, err))?;

        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|err| StoreError::io("create temp file in", parent, err))?;
        temp.write_all(&bytes)
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|err| StoreError::io("write", temp.path(), err))?;
        temp.persist(&self.path)
            .map_err(|err| StoreError::io("replace", &self.path, err.error))?;
        Ok(())
    }

    fn write_logged(&self, op: &str, records: &[Record]) -> StoreResult<()> {
        let started_at = Instant::now();
        match self.write_records(records) {
            Ok(()) => {
                info!(
                    "event=journal_write module=store status=ok op={} path={} records={} duration_ms={}",
                    op,
                    self.path.display(),
                    records.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=journal_write module=store status=error op={} path={} duration_ms={} error={}",
                    op,
                    self.path.display(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Moves a malformed journal to the first unused quarantine name.
    ///
    /// Earlier quarantined files are never overwritten.
    fn quarantine(&self) -> StoreResult<PathBuf> {
        let mut attempt = 0;
        let target = loop {
            let candidate = self.quarantine_candidate(attempt);
            if !candidate.exists() {
                break candidate;
            }
            attempt += 1;
        };
        fs::rename(&self.path, &target)
            .map_err(|err| StoreError::io("quarantine", &self.path, err))?;
        warn!(
            "event=journal_quarantine module=store status=ok path={} moved_to={}",
            self.path.display(),
            target.display()
        );
        Ok(target)
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> StoreResult<LoadReport> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                self.write_logged("bootstrap", &[])?;
                return Ok(LoadReport::default());
            }
            Err(err) => return Err(StoreError::io("read", &self.path, err)),
        };

        let rows = match codec::decode(&bytes) {
            Ok(rows) => rows,
            Err(err) => {
                warn!(
                    "event=journal_load module=store status=malformed path={} error={}",
                    self.path.display(),
                    err
                );
                return Ok(LoadReport {
                    warning: Some(LoadWarning::Malformed {
                        path: self.path.clone(),
                        reason: err.to_string(),
                    }),
                    ..LoadReport::default()
                });
            }
        };

        let migration = migrate(rows);
        if migration.changed() {
            self.write_logged("migrate", &migration.records)?;
            info!(
                "event=journal_migrate module=store status=ok path={} assigned_ids={}",
                self.path.display(),
                migration.assigned_ids
            );
        }

        Ok(LoadReport {
            migrated_ids: migration.assigned_ids,
            records: migration.records,
            warning: None,
        })
    }

    fn append(&self, record: NewRecord) -> StoreResult<Record> {
        let record = record
            .into_record(Utc::now())
            .map_err(|source| StoreError::InvalidRecord { id: None, source })?;

        let report = self.load()?;
        if report.records.iter().any(|existing| existing.id == record.id) {
            return Err(StoreError::DuplicateId(record.id));
        }
        if report.is_malformed() {
            self.quarantine()?;
        }

        let mut records = report.records;
        records.push(record.clone());
        self.write_logged("append", &records)?;
        Ok(record)
    }

    fn replace_all(&self, records: &[Record]) -> StoreResult<()> {
        let report = self.load()?;
        // Rows identical to what is already stored are not revalidated, so one
        // legacy row cannot block edits to the others.
        let stored: HashMap<&RecordId, &Record> = report
            .records
            .iter()
            .map(|record| (&record.id, record))
            .collect();

        let mut seen: HashSet<&RecordId> = HashSet::with_capacity(records.len());
        for record in records {
            if !seen.insert(&record.id) {
                return Err(StoreError::DuplicateId(record.id.clone()));
            }
            if stored.get(&record.id) != Some(&record) {
                record.validate().map_err(|source| StoreError::InvalidRecord {
                    id: Some(record.id.clone()),
                    source,
                })?;
            }
        }

        if report.is_malformed() {
            self.quarantine()?;
        }
        self.write_logged("replace_all", records)
    }

    fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        let mut records = self.load()?.records;
        let before = records.len();
        records.retain(|record| &record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_logged("delete", &records)?;
        Ok(true)
    }
}
