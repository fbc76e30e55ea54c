use chrono::{NaiveDate, TimeZone, Utc};
use farmlog_core::{
    JsonFileStore, JsonFormat, LoadWarning, NewRecord, Record, RecordId, RecordStore,
    RecordValidationError, StoreError,
};
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date")
}

fn store_in(dir: &TempDir) -> JsonFileStore {
    JsonFileStore::new(dir.path().join("activity_log.json"))
}

fn entry(description: &str, cost: f64) -> NewRecord {
    NewRecord::new(day(2025, 1, 5), "Pemupukan", description, cost)
}

#[test]
fn load_bootstraps_missing_file_as_empty_collection() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = JsonFileStore::new(dir.path().join("nested").join("growth_log.json"));

    let report = store.load().unwrap();
    assert!(report.records.is_empty());
    assert!(report.warning.is_none());

    let body = fs::read_to_string(store.path()).unwrap();
    assert_eq!(body.trim(), "[]");
}

#[test]
fn load_recovers_from_malformed_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    fs::write(store.path(), "{ this is not a journal").expect("seed malformed journal");

    let report = store.load().unwrap();
    assert!(report.records.is_empty());
    assert!(report.is_malformed());
    match report.warning {
        Some(LoadWarning::Malformed { path, .. }) => assert_eq!(path, store.path()),
        other => panic!("unexpected warning: {other:?}"),
    }
    // Loading alone never rewrites a malformed file.
    assert_eq!(
        fs::read_to_string(store.path()).unwrap(),
        "{ this is not a journal"
    );
}

#[test]
fn append_after_malformed_load_quarantines_old_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    fs::write(store.path(), "[{\"date\": 12}]").expect("seed malformed journal");

    let record = store
        .append(entry("first entry after repair", 10.0))
        .expect("append should succeed over a malformed file");

    let quarantined = store.quarantine_files();
    assert_eq!(quarantined.len(), 1);
    assert_eq!(
        fs::read_to_string(&quarantined[0]).expect("quarantined file should be readable"),
        "[{\"date\": 12}]"
    );
    let report = store.load().unwrap();
    assert!(report.warning.is_none());
    assert_eq!(report.records, vec![record]);
}

#[test]
fn append_assigns_distinct_ids() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);

    for index in 0..25 {
        store
            .append(entry(&format!("entry {index}"), f64::from(index)))
            .unwrap();
    }

    let records = store.load().unwrap().records;
    assert_eq!(records.len(), 25);
    let ids: HashSet<_> = records.iter().map(|record| record.id.clone()).collect();
    assert_eq!(ids.len(), 25);
    assert!(records.iter().all(|record| record.created_at.is_some()));
}

#[test]
fn append_rejects_negative_cost_without_touching_file() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    store.append(entry("baseline", 100.0)).unwrap();
    let before = fs::read(store.path()).expect("journal should exist");

    let err = store.append(entry("refund?", -50.0)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRecord {
            source: RecordValidationError::NegativeCost(_),
            ..
        }
    ));
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn append_rejects_empty_description() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);

    let err = store.append(entry("", 0.0)).unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRecord {
            source: RecordValidationError::EmptyDescription,
            ..
        }
    ));
    assert!(!store.path().exists());
}

#[test]
fn append_rejects_existing_id() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    let first = store.append(entry("first", 1.0)).unwrap();

    let err = store
        .append(entry("second", 2.0).with_id(first.id.clone()))
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId(id) if id == first.id));
    assert_eq!(store.load().unwrap().records.len(), 1);
}

#[test]
fn replace_all_then_load_round_trips_in_order() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    let created = Utc.with_ymd_and_hms(2025, 2, 1, 6, 45, 12).unwrap();

    let mut records: Vec<Record> = ["plough", "seed", "irrigate"]
        .iter()
        .enumerate()
        .map(|(index, description)| {
            NewRecord::new(day(2025, 2, 3 - index as u32), "Tanam", *description, 0.1 * index as f64)
                .into_record(created)
                .unwrap()
        })
        .collect();
    records[1].notes = Some("north plot".to_string());
    records[2].created_at = None;

    store.replace_all(&records).unwrap();
    assert_eq!(store.load().unwrap().records, records);

    let compact = JsonFileStore::new(dir.path().join("compact.json")).with_format(JsonFormat::Compact);
    compact.replace_all(&records).unwrap();
    assert_eq!(compact.load().unwrap().records, records);
}

#[test]
fn replace_all_validates_changed_records_before_writing() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    let good = store.append(entry("good", 5.0)).unwrap();
    let before = fs::read(store.path()).expect("journal should exist");

    let mut bad = good.clone();
    bad.id = RecordId::generate();
    bad.description = " ".to_string();
    let err = store.replace_all(&[good.clone(), bad.clone()]).unwrap_err();
    assert!(matches!(err, StoreError::InvalidRecord { id: Some(id), .. } if id == bad.id));

    let err = store.replace_all(&[good.clone(), good.clone()]).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateId(id) if id == good.id));

    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn delete_removes_only_matching_record() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    let a = store.append(entry("a", 1.0)).unwrap();
    let b = store.append(entry("b", 2.0)).unwrap();
    let c = store.append(entry("c", 3.0)).unwrap();

    assert!(store.delete(&b.id).unwrap());

    let records = store.load().unwrap().records;
    assert_eq!(records, vec![a, c]);
    assert!(records.iter().all(|record| record.id != b.id));
}

#[test]
fn delete_unknown_id_returns_false_and_leaves_file_untouched() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    store.append(entry("keep me", 1.0)).unwrap();
    let before = fs::read(store.path()).expect("journal should exist");

    let missing = RecordId::parse("does-not-exist").unwrap();
    assert!(!store.delete(&missing).unwrap());
    assert_eq!(fs::read(store.path()).unwrap(), before);
}

#[test]
fn load_migrates_missing_ids_once() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    fs::write(
        store.path(),
        r#"[
            {"tanggal": "2025-01-05", "kategori": "Penyiangan", "catatan": "weeding", "biaya": 1000},
            {"id": "kept", "date": "2025-01-20 00:00:00", "category": "Panen", "description": "harvest", "cost": 2000}
        ]"#,
    )
    .unwrap();

    let first = store.load().unwrap();
    assert_eq!(first.migrated_ids, 1);
    assert_eq!(first.records.len(), 2);
    assert_eq!(first.records[1].id.as_str(), "kept");
    assert_eq!(first.records[0].description, "weeding");
    assert_eq!(first.records[1].date, day(2025, 1, 20));
    let migrated_body = fs::read(store.path()).unwrap();

    let second = store.load().unwrap();
    assert_eq!(second.migrated_ids, 0);
    assert_eq!(second.records, first.records);
    assert_eq!(fs::read(store.path()).unwrap(), migrated_body);

    let body = String::from_utf8(migrated_body).unwrap();
    assert!(body.contains("\"description\""));
    assert!(!body.contains("catatan"));
}

#[test]
fn every_operation_observes_latest_file_state() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    let other_handle = store_in(&dir);

    let record = store.append(entry("written by first handle", 7.0)).unwrap();
    assert_eq!(other_handle.load().unwrap().records, vec![record.clone()]);
    assert!(other_handle.delete(&record.id).unwrap());
    assert!(store.load().unwrap().records.is_empty());
}

#[test]
fn repeated_corruption_keeps_every_quarantined_copy() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);

    fs::write(store.path(), "FIRST hand-edited broken journal").expect("seed first corruption");
    store.append(entry("after first repair", 1.0)).expect("first append");
    fs::write(store.path(), "SECOND broken").expect("seed second corruption");
    store.append(entry("after second repair", 2.0)).expect("second append");

    let quarantined = store.quarantine_files();
    assert_eq!(quarantined.len(), 2);
    assert_ne!(quarantined[0], quarantined[1]);
    assert_eq!(
        fs::read_to_string(&quarantined[0]).expect("first copy readable"),
        "FIRST hand-edited broken journal"
    );
    assert_eq!(
        fs::read_to_string(&quarantined[1]).expect("second copy readable"),
        "SECOND broken"
    );
}

#[test]
fn replace_all_over_malformed_file_quarantines_it() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    fs::write(store.path(), "not json").expect("seed corruption");

    let record = NewRecord::new(day(2025, 1, 5), "Panen", "harvest", 0.0)
        .into_record(Utc::now())
        .expect("valid record");
    store.replace_all(&[record.clone()]).expect("replace_all should succeed");

    assert_eq!(store.quarantine_files().len(), 1);
    assert_eq!(store.load().expect("load").records, vec![record]);
}

#[test]
fn load_reads_legacy_rows_with_title_and_catatan() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    fs::write(
        store.path(),
        r#"[{"id":"a","tanggal":"2025-01-05","kategori":"Pupuk","judul":"NPK","catatan":"north plot","biaya":1000}]"#,
    )
    .expect("seed legacy journal");

    let report = store.load().expect("legacy journal should load");
    assert!(report.warning.is_none());
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].description, "NPK");
    assert_eq!(report.records[0].notes.as_deref(), Some("north plot"));
    assert_eq!(report.records[0].cost, 1000.0);

    store.append(entry("top dressing", 500.0)).expect("append after legacy load");
    assert!(store.quarantine_files().is_empty());
    assert_eq!(store.load().expect("reload").records.len(), 2);
}

#[test]
fn replace_all_does_not_revalidate_unchanged_legacy_rows() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let store = store_in(&dir);
    fs::write(
        store.path(),
        r#"[
            {"id":"legacy","date":"2025-01-02","category":"Lainnya","description":"","cost":0},
            {"id":"ok","date":"2025-01-03","category":"Panen","description":"harvest","cost":10}
        ]"#,
    )
    .expect("seed journal with a legacy row");

    let mut records = store.load().expect("load").records;
    records[1].cost = 25.0;
    store
        .replace_all(&records)
        .expect("editing a valid row should not be blocked by the legacy row");
    assert_eq!(store.load().expect("reload").records, records);

    records[0].category = "Penyiangan".to_string();
    let err = store.replace_all(&records).unwrap_err();
    assert!(matches!(
        err,
        StoreError::InvalidRecord { id: Some(id), source: RecordValidationError::EmptyDescription }
            if id.as_str() == "legacy"
    ));
}
