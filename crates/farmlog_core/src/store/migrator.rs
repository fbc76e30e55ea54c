//! Identity backfill for journal data written before ids existed.
//!
//! # Responsibility
//! - Turn decoded on-disk rows into `Record`s with unique ids.
//! - Report how many ids were assigned so the store can write back once.
//!
//! # Invariants
//! - Rows with a usable, unseen id keep it unchanged.
//! - Missing, blank and duplicate ids get a fresh id; the first occurrence
//!   of a duplicate keeps the original.
//! - Migrating already-migrated rows assigns nothing.

use super::codec::StoredRecord;
use crate::model::record::{Record, RecordId};
use std::collections::HashSet;

/// Result of one migration pass.
#[derive(Debug)]
pub(crate) struct Migration {
    pub records: Vec<Record>,
    pub assigned_ids: usize,
}

impl Migration {
    pub fn changed(&self) -> bool {
        self.assigned_ids > 0
    }
}

/// Runs the id backfill over decoded rows, preserving order.
pub(crate) fn migrate(rows: Vec<StoredRecord>) -> Migration {
    let mut seen: HashSet<RecordId> = HashSet::with_capacity(rows.len());
    let mut assigned_ids = 0;
    let mut records = Vec::with_capacity(rows.len());

    for mut row in rows {
        let (description, notes) = row.resolve_text();
        let existing = row
            .id
            .as_deref()
            .and_then(|raw| RecordId::parse(raw).ok())
            .filter(|id| !seen.contains(id));
        let id = match existing {
            Some(id) => id,
            None => {
                assigned_ids += 1;
                RecordId::generate()
            }
        };
        seen.insert(id.clone());

        records.push(Record {
            id,
            date: row.date,
            category: row.category,
            description,
            cost: row.cost.unwrap_or(0.0),
            notes,
            created_at: row.created_at,
        });
    }

    Migration {
        records,
        assigned_ids,
    }
}
