//! Delimited-text export of journal snapshots.
//!
//! Produces RFC 4180 CSV with a header row, for download buttons and
//! spreadsheet hand-off.

use crate::model::record::Record;
use chrono::SecondsFormat;

const CSV_HEADER: [&str; 7] = [
    "id",
    "date",
    "category",
    "description",
    "cost",
    "notes",
    "created_at",
];

/// Renders `records` as CSV, one line per record, CRLF-terminated.
pub fn to_csv(records: &[Record]) -> String {
    let mut out = String::new();
    push_row(&mut out, CSV_HEADER.iter().map(|field| field.to_string()));
    for record in records {
        push_row(
            &mut out,
            [
                record.id.to_string(),
                record.date.format("%Y-%m-%d").to_string(),
                record.category.clone(),
                record.description.clone(),
                record.cost.to_string(),
                record.notes.clone().unwrap_or_default(),
                record
                    .created_at
                    .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
                    .unwrap_or_default(),
            ],
        );
    }
    out
}

fn push_row(out: &mut String, fields: impl IntoIterator<Item = String>) {
    for (index, field) in fields.into_iter().enumerate() {
        if index > 0 {
            out.push(',');
        }
        out.push_str(&quote_field(&field));
    }
    out.push_str("\r\n");
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
