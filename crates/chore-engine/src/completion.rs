//! Completion records -- which occurrences have been marked done.
//!
//! In memory a record is a structured [`CompletionKey`]. On the wire and in
//! storage the set is a flat JSON object mapping `"<choreId>|<YYYY-MM-DD>"` to
//! `true`; absence means not done.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::date::{format_date, parse_date};

/// Separator between chore id and date in the wire key.
pub const KEY_SEPARATOR: char = '|';

/// One completed occurrence: a chore id and the occurrence date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompletionKey {
    pub chore_id: String,
    pub date: NaiveDate,
}

impl CompletionKey {
    pub fn new(chore_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            chore_id: chore_id.into(),
            date,
        }
    }

    /// Encode as `"<choreId>|<YYYY-MM-DD>"`.
    pub fn to_wire(&self) -> String {
        format!("{}{}{}", self.chore_id, KEY_SEPARATOR, format_date(self.date))
    }

    /// Decode a wire key. The split happens at the last separator, so an id
    /// containing `|` still round-trips. Returns `None` for an empty id or an
    /// unparseable date.
    pub fn parse_wire(raw: &str) -> Option<Self> {
        let (chore_id, date) = raw.rsplit_once(KEY_SEPARATOR)?;
        if chore_id.is_empty() {
            return None;
        }
        Some(Self::new(chore_id, parse_date(date)?))
    }
}

impl fmt::Display for CompletionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_wire())
    }
}

/// The set of completed occurrences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionSet {
    keys: BTreeSet<CompletionKey>,
}

impl CompletionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn contains(&self, chore_id: &str, date: NaiveDate) -> bool {
        self.keys.contains(&CompletionKey::new(chore_id, date))
    }

    /// Returns `true` if the key was not already present.
    pub fn insert(&mut self, key: CompletionKey) -> bool {
        self.keys.insert(key)
    }

    /// Returns `true` if the key was present.
    pub fn remove(&mut self, key: &CompletionKey) -> bool {
        self.keys.remove(key)
    }

    /// Mark (`done = true`) or unmark one occurrence.
    pub fn set(&mut self, chore_id: &str, date: NaiveDate, done: bool) {
        let key = CompletionKey::new(chore_id, date);
        if done {
            self.keys.insert(key);
        } else {
            self.keys.remove(&key);
        }
    }

    /// Drop every record for `chore_id`, returning how many were removed.
    pub fn remove_chore(&mut self, chore_id: &str) -> usize {
        let before = self.keys.len();
        self.keys.retain(|k| k.chore_id != chore_id);
        before - self.keys.len()
    }

    /// Keep only records whose chore id satisfies `keep`.
    pub fn retain_chores(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.keys.retain(|k| keep(&k.chore_id));
    }

    /// Remove everything, returning how many records were cleared.
    pub fn clear(&mut self) -> usize {
        let cleared = self.keys.len();
        self.keys.clear();
        cleared
    }

    /// Records in `(chore_id, date)` order.
    pub fn iter(&self) -> impl Iterator<Item = &CompletionKey> {
        self.keys.iter()
    }

    /// Build from a decoded wire object. Entries whose value is not `true` are
    /// treated as absent; keys that do not decode are dropped with a warning.
    pub fn from_wire_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        let mut keys = BTreeSet::new();
        for (raw, value) in map {
            if value.as_bool() != Some(true) {
                continue;
            }
            match CompletionKey::parse_wire(raw) {
                Some(key) => {
                    keys.insert(key);
                }
                None => tracing::warn!(key = %raw, "dropping malformed completion key"),
            }
        }
        Self { keys }
    }
}

impl FromIterator<CompletionKey> for CompletionSet {
    fn from_iter<I: IntoIterator<Item = CompletionKey>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

impl Serialize for CompletionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.keys.iter().map(|k| (k.to_wire(), true)))
    }
}

impl<'de> Deserialize<'de> for CompletionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_wire_map(&map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn wire_key_format() {
        let key = CompletionKey::new("1712000000000", d(2024, 4, 1));
        assert_eq!(key.to_wire(), "1712000000000|2024-04-01");
        assert_eq!(key.to_string(), "1712000000000|2024-04-01");
    }

    #[test]
    fn parse_wire_splits_at_last_separator() {
        let key = CompletionKey::parse_wire("a|b|2024-04-01").unwrap();
        assert_eq!(key.chore_id, "a|b");
        assert_eq!(key.date, d(2024, 4, 1));
    }

    #[test]
    fn parse_wire_rejects_malformed_keys() {
        assert!(CompletionKey::parse_wire("no-separator").is_none());
        assert!(CompletionKey::parse_wire("|2024-04-01").is_none());
        assert!(CompletionKey::parse_wire("id|2024-02-30").is_none());
        assert!(CompletionKey::parse_wire("id|").is_none());
    }

    #[test]
    fn set_and_unset() {
        let mut set = CompletionSet::new();
        set.set("a", d(2024, 4, 1), true);
        set.set("a", d(2024, 4, 1), true);
        assert_eq!(set.len(), 1);
        assert!(set.contains("a", d(2024, 4, 1)));

        set.set("a", d(2024, 4, 1), false);
        assert!(set.is_empty());
        // Unmarking something never marked is a no-op.
        set.set("a", d(2024, 4, 2), false);
        assert!(set.is_empty());
    }

    #[test]
    fn remove_chore_only_touches_that_chore() {
        let mut set: CompletionSet = [
            CompletionKey::new("a", d(2024, 4, 1)),
            CompletionKey::new("a", d(2024, 4, 2)),
            CompletionKey::new("ab", d(2024, 4, 1)),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.remove_chore("a"), 2);
        assert_eq!(set.len(), 1);
        assert!(set.contains("ab", d(2024, 4, 1)));
    }

    #[test]
    fn serializes_as_flat_map_of_true() {
        let set: CompletionSet = [
            CompletionKey::new("b", d(2024, 4, 1)),
            CompletionKey::new("a", d(2024, 4, 2)),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"{"a|2024-04-02":true,"b|2024-04-01":true}"#);
    }

    #[test]
    fn deserialize_ignores_false_and_malformed_entries() {
        let json = r#"{"a|2024-04-01":true,"b|2024-04-01":false,"garbage":true,"c|2024-04-03":1}"#;
        let set: CompletionSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains("a", d(2024, 4, 1)));
    }
}
