//! In-process model of the spreadsheet-backed sync endpoint.
//!
//! The endpoint keeps two tables, chores keyed by `id` and completions keyed
//! by `(choreId, occurrenceDate)`, plus an append-only activity log. Uploads
//! overwrite both tables. The log gains one row the first time each
//! `"<title>|<date>"` string is seen and is never rewritten.
//!
//! [`RemoteSheet`] implements [`SyncTransport`] directly, so it can stand in
//! for the network endpoint.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::chore::{decode_chores, Chore};
use crate::completion::{CompletionSet, KEY_SEPARATOR};
use crate::date::{format_date, week_start_monday};
use crate::error::Result;
use crate::sync::{DownloadResponse, SyncTransport, UploadPayload, UploadResponse, UPLOAD_ACTION};

/// One activity log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    /// Chore title, or the chore id when the chore was not in the upload.
    pub title: String,
    /// Occurrence date, `YYYY-MM-DD`.
    pub date: String,
    /// Monday of the occurrence's ISO week, `YYYY-MM-DD`.
    pub week_start: String,
    /// Wall-clock time the row was appended, `HH:MM:SS`.
    pub time_of_day: String,
}

impl ActivityEntry {
    fn dedupe_key(&self) -> String {
        format!("{}{}{}", self.title, KEY_SEPARATOR, self.date)
    }
}

#[derive(Debug, Default)]
struct SheetState {
    chores: Vec<Chore>,
    completions: CompletionSet,
    activity: Vec<ActivityEntry>,
}

#[derive(Debug, Default)]
pub struct RemoteSheet {
    state: Mutex<SheetState>,
}

impl RemoteSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn chores(&self) -> Vec<Chore> {
        self.state().chores.clone()
    }

    pub fn completions(&self) -> CompletionSet {
        self.state().completions.clone()
    }

    pub fn activity_log(&self) -> Vec<ActivityEntry> {
        self.state().activity.clone()
    }

    /// Handle a raw POST body the way the endpoint does: every failure comes
    /// back as `ok: false` with a message, never as an error.
    ///
    /// A missing `action` means upload. A `chores` value that is not an array,
    /// or a `completionMap` that is not an object, counts as empty; chore
    /// entries that do not decode or lack an id are skipped.
    pub fn handle_post(&self, body: &str, now: NaiveDateTime) -> UploadResponse {
        if body.trim().is_empty() {
            return UploadResponse::failure("No payload");
        }

        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(value) => value,
            Err(e) => return UploadResponse::failure(e.to_string()),
        };

        let action = value
            .get("action")
            .and_then(|a| a.as_str())
            .unwrap_or(UPLOAD_ACTION);
        if action != UPLOAD_ACTION {
            return UploadResponse::failure("Unknown action");
        }

        let chores: Vec<Chore> = value
            .get("chores")
            .and_then(|c| c.as_array())
            .map(|items| decode_chores(items.clone()))
            .unwrap_or_default();

        let completions = value
            .get("completionMap")
            .and_then(|m| m.as_object())
            .map(CompletionSet::from_wire_map)
            .unwrap_or_default();

        self.apply_upload(chores, completions, now)
    }

    /// Overwrite both tables and append unseen completions to the activity log.
    pub fn apply_upload(
        &self,
        chores: Vec<Chore>,
        completions: CompletionSet,
        now: NaiveDateTime,
    ) -> UploadResponse {
        let mut state = self.state();
        let time_of_day = now.format("%H:%M:%S").to_string();

        let mut logged: HashSet<String> =
            state.activity.iter().map(ActivityEntry::dedupe_key).collect();
        let mut appended = Vec::new();
        for key in completions.iter() {
            let title = chores
                .iter()
                .find(|c| c.id == key.chore_id && !c.title.is_empty())
                .map(|c| c.title.clone())
                .unwrap_or_else(|| key.chore_id.clone());
            let entry = ActivityEntry {
                title,
                date: format_date(key.date),
                week_start: format_date(week_start_monday(key.date)),
                time_of_day: time_of_day.clone(),
            };
            if logged.insert(entry.dedupe_key()) {
                appended.push(entry);
            }
        }
        state.activity.extend(appended);

        let response = UploadResponse::success(chores.len(), completions.len());
        state.chores = chores;
        state.completions = completions;
        response
    }

    /// The full remote state, stamped with `now`.
    pub fn download_at(&self, now: DateTime<Utc>) -> DownloadResponse {
        let state = self.state();
        DownloadResponse {
            chores: state.chores.clone(),
            completions: state.completions.clone(),
            synced_at: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
            error: None,
        }
    }

    fn state(&self) -> MutexGuard<'_, SheetState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SyncTransport for RemoteSheet {
    fn upload(&self, payload: &UploadPayload) -> Result<UploadResponse> {
        if payload.action != UPLOAD_ACTION {
            return Ok(UploadResponse::failure("Unknown action"));
        }
        Ok(self.apply_upload(
            payload.chores.clone(),
            payload.completions.clone(),
            Local::now().naive_local(),
        ))
    }

    fn download(&self) -> Result<DownloadResponse> {
        Ok(self.download_at(Utc::now()))
    }
}
