//! Chore definitions and recurrence rules.
//!
//! A [`Chore`] is the stored form: string fields are kept as they were
//! loaded, so a corrupted entry (for example an unparseable start date)
//! survives a load/save cycle instead of being silently dropped. Fields of
//! the wrong JSON type read as empty. [`NewChore`] is the validated input
//! used to create or replace a chore.

use std::fmt;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::date::{format_date, parse_date};
use crate::error::{ChoreError, Result};

/// How often a chore repeats.
///
/// On the wire this is a bare string: `""` for a one-off chore, otherwise
/// `"daily"`, `"weekly"` or `"monthly"`. Unrecognized strings are kept in
/// [`Recurrence::Other`] and behave like [`Recurrence::None`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Recurrence {
    /// Occurs once, on the start date.
    #[default]
    None,
    /// Every day from the start date on.
    Daily,
    /// Every week on the start date's weekday.
    Weekly,
    /// Every month on the start date's day-of-month. Months without that day
    /// are skipped.
    Monthly,
    /// A value this version does not understand.
    Other(String),
}

impl Recurrence {
    /// Wire form of the rule.
    pub fn as_str(&self) -> &str {
        match self {
            Recurrence::None => "",
            Recurrence::Daily => "daily",
            Recurrence::Weekly => "weekly",
            Recurrence::Monthly => "monthly",
            Recurrence::Other(raw) => raw,
        }
    }

    /// Parse user input. Unlike the lenient wire conversion this rejects
    /// unknown rule names; `"none"` and `""` both mean a one-off chore.
    pub fn parse_input(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "once" => Ok(Recurrence::None),
            "daily" => Ok(Recurrence::Daily),
            "weekly" => Ok(Recurrence::Weekly),
            "monthly" => Ok(Recurrence::Monthly),
            other => Err(ChoreError::InvalidInput(format!(
                "unknown recurrence '{}': expected none, daily, weekly or monthly",
                other
            ))),
        }
    }
}

impl From<&str> for Recurrence {
    fn from(raw: &str) -> Self {
        match raw {
            "" => Recurrence::None,
            "daily" => Recurrence::Daily,
            "weekly" => Recurrence::Weekly,
            "monthly" => Recurrence::Monthly,
            other => Recurrence::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::None => f.pad("none"),
            other => f.pad(other.as_str()),
        }
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = lenient_string(deserializer)?;
        Ok(Recurrence::from(raw.as_str()))
    }
}

/// A stored chore definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chore {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: String,
    /// Raw `YYYY-MM-DD` string. Use [`Chore::start`] for the parsed date.
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: String,
    #[serde(default)]
    pub recurrence: Recurrence,
    /// RFC 3339 creation timestamp. Informational only.
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: String,
}

impl Chore {
    /// The parsed start date, or `None` when the stored value is corrupt.
    pub fn start(&self) -> Option<NaiveDate> {
        parse_date(&self.start_date)
    }
}

/// Validated input for creating or replacing a chore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChore {
    pub title: String,
    pub notes: Option<String>,
    pub start_date: String,
    pub recurrence: Recurrence,
}

impl NewChore {
    pub fn new(title: impl Into<String>, start_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            notes: None,
            start_date: start_date.into(),
            recurrence: Recurrence::None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Check the required fields and build the stored chore.
    ///
    /// # Errors
    /// Returns `ChoreError::InvalidInput` when the trimmed title is empty or
    /// the start date is missing or not a valid `YYYY-MM-DD` date.
    pub(crate) fn into_chore(self, id: String, created_at: String) -> Result<Chore> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(ChoreError::InvalidInput("title is required".to_string()));
        }

        let raw_date = self.start_date.trim();
        if raw_date.is_empty() {
            return Err(ChoreError::InvalidInput("start date is required".to_string()));
        }
        let start = parse_date(raw_date).ok_or_else(|| {
            ChoreError::InvalidInput(format!(
                "invalid start date '{}': expected YYYY-MM-DD",
                raw_date
            ))
        })?;

        Ok(Chore {
            id,
            title: title.to_string(),
            notes: self.notes.as_deref().map(str::trim).unwrap_or("").to_string(),
            start_date: format_date(start),
            recurrence: self.recurrence,
            created_at,
        })
    }
}

/// Accept a JSON string, number, bool or null where a string is expected.
/// Objects and arrays read as an empty string.
///
/// Spreadsheet-backed endpoints hand numeric-looking ids back as numbers, and
/// older entries may carry nulls.
pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => {
            tracing::debug!(value = %other, "non-scalar field read as empty string");
            Ok(String::new())
        }
    }
}

/// Decode a list of stored entries one at a time, skipping the ones that do
/// not decode instead of failing the whole list.
pub(crate) fn decode_each<T: DeserializeOwned>(entries: Vec<serde_json::Value>) -> Vec<T> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping undecodable chore entry");
                None
            }
        })
        .collect()
}

/// Decode chore entries individually. Entries that are not objects or have
/// no id are skipped with a warning; fields of the wrong type read as empty,
/// so such a chore never occurs rather than taking its neighbours down.
pub fn decode_chores(entries: Vec<serde_json::Value>) -> Vec<Chore> {
    decode_each::<Chore>(entries)
        .into_iter()
        .filter(|chore| {
            if chore.id.is_empty() {
                tracing::warn!(title = %chore.title, "skipping chore entry without an id");
            }
            !chore.id.is_empty()
        })
        .collect()
}

/// `deserialize_with` adapter for chore lists in documents and payloads.
pub(crate) fn lenient_chores<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<Chore>, D::Error> {
    Vec::<serde_json::Value>::deserialize(deserializer).map(decode_chores)
}
