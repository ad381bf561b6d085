//! Tests for key-value persistence, legacy migration, and recovery from
//! malformed stored data.

use chrono::{NaiveDate, TimeZone, Utc};
use chore_engine::store::{
    FileStore, KeyValueStore, MemoryStore, Storage, CHORES_KEY, COMPLETION_KEY, LEGACY_KEY,
};
use chore_engine::{NewChore, Recurrence, Snapshot, Tracker};

fn d(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_tracker() -> Tracker {
    let mut tracker = Tracker::new();
    let id = tracker
        .add_chore(
            NewChore::new("Bins", "2024-04-01").with_recurrence(Recurrence::Weekly),
            Utc.timestamp_millis_opt(1_711_958_400_000).unwrap(),
        )
        .unwrap()
        .id
        .clone();
    tracker.set_completed(&id, d(2024, 4, 8), true).unwrap();
    tracker
}

// ---------------------------------------------------------------------------
// Save / load
// ---------------------------------------------------------------------------

#[test]
fn empty_store_loads_empty_snapshot() {
    let storage = Storage::new(MemoryStore::new());
    assert_eq!(storage.load().unwrap(), Snapshot::default());
}

#[test]
fn save_then_load_in_memory() {
    let storage = Storage::new(MemoryStore::new());
    let snapshot = sample_tracker().snapshot();

    storage.save(&snapshot).unwrap();
    assert_eq!(storage.load().unwrap(), snapshot);
}

#[test]
fn saved_documents_use_the_storage_keys_and_wire_format() {
    let storage = Storage::new(MemoryStore::new());
    storage.save(&sample_tracker().snapshot()).unwrap();

    let chores = storage.kv().get(CHORES_KEY).unwrap().unwrap();
    assert!(chores.starts_with('['));
    assert!(chores.contains(r#""startDate":"2024-04-01""#));
    assert!(chores.contains(r#""recurrence":"weekly""#));

    let completions = storage.kv().get(COMPLETION_KEY).unwrap().unwrap();
    assert_eq!(completions, r#"{"1711958400000|2024-04-08":true}"#);
}

#[test]
fn file_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::new(FileStore::new(dir.path().join("data")));
    let snapshot = sample_tracker().snapshot();

    storage.save(&snapshot).unwrap();
    assert!(dir.path().join("data").join("mhct_chores.json").exists());
    assert!(dir.path().join("data").join("mhct_completion.json").exists());

    let reopened = Storage::new(FileStore::new(dir.path().join("data")));
    assert_eq!(reopened.load().unwrap(), snapshot);
}

#[test]
fn file_store_missing_directory_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("does-not-exist"));
    assert_eq!(store.get(CHORES_KEY).unwrap(), None);
}

// ---------------------------------------------------------------------------
// Legacy migration
// ---------------------------------------------------------------------------

#[test]
fn legacy_key_is_migrated_when_current_key_absent() {
    let kv = MemoryStore::new();
    kv.set(
        LEGACY_KEY,
        r#"[
            {"id":"1","title":"Dishes","date":"2024-04-01"},
            {"id":"2","title":"Rent","startDate":"2024-01-31","recurrence":"monthly","notes":"landlord","createdAt":"2024-01-01T00:00:00.000Z"}
        ]"#,
    )
    .unwrap();

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let snapshot = Storage::new(kv).load_at(now).unwrap();

    assert_eq!(snapshot.chores.len(), 2);
    let dishes = &snapshot.chores[0];
    assert_eq!(dishes.start_date, "2024-04-01");
    assert_eq!(dishes.notes, "");
    assert_eq!(dishes.recurrence, Recurrence::None);
    assert_eq!(dishes.created_at, "2024-05-01T12:00:00.000Z");

    let rent = &snapshot.chores[1];
    assert_eq!(rent.start_date, "2024-01-31");
    assert_eq!(rent.recurrence, Recurrence::Monthly);
    assert_eq!(rent.notes, "landlord");
    assert_eq!(rent.created_at, "2024-01-01T00:00:00.000Z");
}

#[test]
fn current_key_wins_over_legacy_key() {
    let kv = MemoryStore::new();
    kv.set(LEGACY_KEY, r#"[{"id":"old","title":"Old","date":"2024-04-01"}]"#)
        .unwrap();
    kv.set(CHORES_KEY, r#"[{"id":"new","title":"New","startDate":"2024-04-01"}]"#)
        .unwrap();

    let snapshot = Storage::new(kv).load().unwrap();
    assert_eq!(snapshot.chores.len(), 1);
    assert_eq!(snapshot.chores[0].id, "new");
}

// ---------------------------------------------------------------------------
// Malformed data
// ---------------------------------------------------------------------------

#[test]
fn malformed_chores_document_resets_to_empty() {
    let kv = MemoryStore::new();
    kv.set(CHORES_KEY, "{not json").unwrap();
    kv.set(COMPLETION_KEY, r#"{"1|2024-04-01":true}"#).unwrap();

    let snapshot = Storage::new(kv).load().unwrap();
    assert_eq!(snapshot, Snapshot::default());
}

#[test]
fn malformed_completion_document_resets_to_empty() {
    let kv = MemoryStore::new();
    kv.set(CHORES_KEY, r#"[{"id":"1","title":"Bins","startDate":"2024-04-01"}]"#)
        .unwrap();
    kv.set(COMPLETION_KEY, "[1,2,3]").unwrap();

    let snapshot = Storage::new(kv).load().unwrap();
    assert_eq!(snapshot, Snapshot::default());
}

#[test]
fn corrupt_start_date_survives_a_load_save_cycle() {
    let kv = MemoryStore::new();
    kv.set(CHORES_KEY, r#"[{"id":"1","title":"Bins","startDate":"someday","recurrence":"daily"}]"#)
        .unwrap();
    let storage = Storage::new(kv);

    let snapshot = storage.load().unwrap();
    assert_eq!(snapshot.chores[0].start_date, "someday");
    assert!(snapshot.chores[0].start().is_none());

    storage.save(&snapshot).unwrap();
    let again = storage.load().unwrap();
    assert_eq!(again.chores[0].start_date, "someday");

    let tracker = Tracker::from_snapshot(again);
    assert!(tracker.upcoming(d(2024, 4, 1), 60).is_empty());
}

#[test]
fn one_broken_chore_entry_does_not_discard_the_others() {
    let kv = MemoryStore::new();
    kv.set(
        CHORES_KEY,
        r#"[
            {"id":"1","title":"A","startDate":"2024-01-01","recurrence":"daily"},
            {"id":"2","title":"B","startDate":{"bad":1}},
            {"title":"No id","startDate":"2024-01-01"},
            42
        ]"#,
    )
    .unwrap();
    kv.set(COMPLETION_KEY, r#"{"1|2024-01-02":true}"#).unwrap();
    let storage = Storage::new(kv);

    let snapshot = storage.load().unwrap();
    let ids: Vec<&str> = snapshot.chores.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2"]);
    assert_eq!(snapshot.chores[1].start_date, "");
    assert_eq!(snapshot.completions.len(), 1);

    // The bad entry never occurs; the good one still does.
    let tracker = Tracker::from_snapshot(snapshot.clone());
    let upcoming = tracker.upcoming(d(2024, 1, 1), 3);
    assert_eq!(upcoming.len(), 3);
    assert!(upcoming.iter().all(|e| e.chore.id == "1"));

    // And nothing valid is lost on the next save.
    storage.save(&snapshot).unwrap();
    assert_eq!(storage.load().unwrap().chores.len(), 2);
}

#[test]
fn broken_legacy_entries_are_skipped_during_migration() {
    let kv = MemoryStore::new();
    kv.set(
        LEGACY_KEY,
        r#"[{"id":"1","title":"Dishes","date":"2024-04-01"},{"title":"No id"},"junk"]"#,
    )
    .unwrap();

    let snapshot = Storage::new(kv).load().unwrap();
    assert_eq!(snapshot.chores.len(), 1);
    assert_eq!(snapshot.chores[0].start_date, "2024-04-01");
}

#[test]
fn chores_document_that_is_not_a_list_resets_to_empty() {
    let kv = MemoryStore::new();
    kv.set(CHORES_KEY, r#"{"id":"1"}"#).unwrap();

    let snapshot = Storage::new(kv).load().unwrap();
    assert_eq!(snapshot, Snapshot::default());
}

#[test]
fn malformed_completion_keys_are_dropped_individually() {
    let kv = MemoryStore::new();
    kv.set(COMPLETION_KEY, r#"{"1|2024-04-01":true,"broken":true,"2|2024-13-01":true}"#)
        .unwrap();

    let snapshot = Storage::new(kv).load().unwrap();
    assert_eq!(snapshot.completions.len(), 1);
    assert!(snapshot.completions.contains("1", d(2024, 4, 1)));
}
