//! Persistence over a key-value string store.
//!
//! Chores and completion records are stored as two JSON documents under
//! [`CHORES_KEY`] and [`COMPLETION_KEY`]. Data written by the older
//! single-key format ([`LEGACY_KEY`]) is migrated on load when the current
//! key is absent.
//!
//! Loading never fails on bad data. A chore entry that does not decode is
//! skipped on its own; a document that is not a JSON list or map at all
//! resets the whole snapshot to empty. Both log a warning. Only I/O failures
//! from the underlying store surface as errors.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::chore::{decode_chores, decode_each, lenient_string, Chore, Recurrence};
use crate::completion::CompletionSet;
use crate::error::{ChoreError, Result};
use crate::tracker::Snapshot;

pub const CHORES_KEY: &str = "mhct_chores";
pub const COMPLETION_KEY: &str = "mhct_completion";
pub const LEGACY_KEY: &str = "choreTracker";

/// A string key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write through a temp file and rename so a crash never leaves a
    /// half-written document behind.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// Chore entry as written by the single-key format.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyChore {
    #[serde(deserialize_with = "lenient_string")]
    id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    notes: String,
    #[serde(default, deserialize_with = "lenient_string")]
    date: String,
    #[serde(default, deserialize_with = "lenient_string")]
    start_date: String,
    #[serde(default)]
    recurrence: Recurrence,
    #[serde(default, deserialize_with = "lenient_string")]
    created_at: String,
}

impl LegacyChore {
    fn migrate(self, now: &str) -> Chore {
        let start_date = if self.date.is_empty() {
            self.start_date
        } else {
            self.date
        };
        let created_at = if self.created_at.is_empty() {
            now.to_string()
        } else {
            self.created_at
        };
        Chore {
            id: self.id,
            title: self.title,
            notes: self.notes,
            start_date,
            recurrence: self.recurrence,
            created_at,
        }
    }
}

/// Loads and saves [`Snapshot`]s through a [`KeyValueStore`].
#[derive(Debug)]
pub struct Storage<K> {
    kv: K,
}

impl<K: KeyValueStore> Storage<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    /// Load the stored snapshot, stamping migrated legacy chores that lack a
    /// creation time with the current time.
    pub fn load(&self) -> Result<Snapshot> {
        self.load_at(Utc::now())
    }

    /// [`Storage::load`] with an explicit migration timestamp.
    pub fn load_at(&self, now: DateTime<Utc>) -> Result<Snapshot> {
        match self.decode(now) {
            Ok(snapshot) => Ok(snapshot),
            Err(ChoreError::MalformedStoredData { key, message }) => {
                tracing::warn!(%key, %message, "stored data is malformed, starting fresh");
                Ok(Snapshot::default())
            }
            Err(e) => Err(e),
        }
    }

    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.kv
            .set(CHORES_KEY, &serde_json::to_string(&snapshot.chores)?)?;
        self.kv
            .set(COMPLETION_KEY, &serde_json::to_string(&snapshot.completions)?)?;
        tracing::debug!(
            chores = snapshot.chores.len(),
            completions = snapshot.completions.len(),
            "saved snapshot"
        );
        Ok(())
    }

    fn decode(&self, now: DateTime<Utc>) -> Result<Snapshot> {
        let chores = match self.kv.get(CHORES_KEY)? {
            Some(raw) => {
                decode_chores(parse_document::<Vec<serde_json::Value>>(CHORES_KEY, &raw)?)
            }
            None => match self.kv.get(LEGACY_KEY)? {
                Some(raw) => {
                    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
                    let entries = parse_document::<Vec<serde_json::Value>>(LEGACY_KEY, &raw)?;
                    let legacy: Vec<LegacyChore> = decode_each(entries);
                    tracing::info!(chores = legacy.len(), "migrating legacy chore storage");
                    legacy
                        .into_iter()
                        .filter(|c| !c.id.is_empty())
                        .map(|c| c.migrate(&stamp))
                        .collect()
                }
                None => Vec::new(),
            },
        };

        let completions = match self.kv.get(COMPLETION_KEY)? {
            Some(raw) => parse_document::<CompletionSet>(COMPLETION_KEY, &raw)?,
            None => CompletionSet::new(),
        };

        Ok(Snapshot {
            chores,
            completions,
        })
    }
}

fn parse_document<T: for<'de> Deserialize<'de>>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| ChoreError::MalformedStoredData {
        key: key.to_string(),
        message: e.to_string(),
    })
}
