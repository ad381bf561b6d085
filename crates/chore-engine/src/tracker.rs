//! The tracker -- the explicit store object that owns chores and completion
//! state and applies the lifecycle rules to them.
//!
//! Views go through the pure expander; the tracker only joins the result with
//! completion state.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::chore::{lenient_chores, Chore, NewChore};
use crate::completion::CompletionSet;
use crate::date::format_date;
use crate::error::{ChoreError, Result};
use crate::expander::{expand_window, DateWindow};
use crate::occurrence::occurs_on_date;

/// Everything that is persisted or synced: chore definitions plus completion
/// records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient_chores")]
    pub chores: Vec<Chore>,
    #[serde(default, rename = "completionMap")]
    pub completions: CompletionSet,
}

/// An occurrence joined with its completion state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgendaEntry<'a> {
    pub chore: &'a Chore,
    pub date: NaiveDate,
    pub done: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tracker {
    chores: Vec<Chore>,
    completions: CompletionSet,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tracker from loaded or downloaded data. Later chores that reuse
    /// an earlier id are dropped.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut chores: Vec<Chore> = Vec::with_capacity(snapshot.chores.len());
        for chore in snapshot.chores {
            if chores.iter().any(|c| c.id == chore.id) {
                tracing::warn!(chore_id = %chore.id, "dropping chore with duplicate id");
                continue;
            }
            chores.push(chore);
        }
        Self {
            chores,
            completions: snapshot.completions,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            chores: self.chores.clone(),
            completions: self.completions.clone(),
        }
    }

    pub fn into_snapshot(self) -> Snapshot {
        Snapshot {
            chores: self.chores,
            completions: self.completions,
        }
    }

    pub fn chores(&self) -> &[Chore] {
        &self.chores
    }

    pub fn completions(&self) -> &CompletionSet {
        &self.completions
    }

    pub fn chore(&self, id: &str) -> Option<&Chore> {
        self.chores.iter().find(|c| c.id == id)
    }

    /// Create a chore from user input.
    ///
    /// The id is the creation time in epoch milliseconds, bumped until it is
    /// unique within the tracker.
    ///
    /// # Errors
    /// Returns `ChoreError::InvalidInput` when the title or start date is
    /// missing or the date is not `YYYY-MM-DD`.
    pub fn add_chore(&mut self, input: NewChore, created_at: DateTime<Utc>) -> Result<&Chore> {
        let id = self.next_id(created_at);
        let chore = input.into_chore(
            id,
            created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        )?;
        tracing::debug!(chore_id = %chore.id, title = %chore.title, "added chore");
        self.chores.push(chore);
        Ok(&self.chores[self.chores.len() - 1])
    }

    /// Edit-as-replace: swap in new fields while keeping the id and creation
    /// timestamp. Completion records are left as they are.
    pub fn replace_chore(&mut self, id: &str, input: NewChore) -> Result<&Chore> {
        let index = self.index_of(id)?;
        let existing = &self.chores[index];
        let replacement = input.into_chore(existing.id.clone(), existing.created_at.clone())?;
        self.chores[index] = replacement;
        Ok(&self.chores[index])
    }

    /// Remove a chore and every completion record that references it.
    pub fn delete_chore(&mut self, id: &str) -> Result<Chore> {
        let index = self.index_of(id)?;
        let removed = self.chores.remove(index);
        let pruned = self.completions.remove_chore(id);
        tracing::debug!(chore_id = %id, pruned, "deleted chore");
        Ok(removed)
    }

    /// Mark (`done = true`) or unmark one occurrence.
    ///
    /// # Errors
    /// Returns `ChoreError::ChoreNotFound` for an unknown id and
    /// `ChoreError::NotAnOccurrence` when marking a date the chore does not
    /// fall on.
    pub fn set_completed(&mut self, id: &str, date: NaiveDate, done: bool) -> Result<()> {
        let chore = self
            .chore(id)
            .ok_or_else(|| ChoreError::ChoreNotFound(id.to_string()))?;
        if done && !occurs_on_date(chore, date) {
            return Err(ChoreError::NotAnOccurrence {
                chore_id: id.to_string(),
                date: format_date(date),
            });
        }
        self.completions.set(id, date, done);
        Ok(())
    }

    pub fn is_completed(&self, id: &str, date: NaiveDate) -> bool {
        self.completions.contains(id, date)
    }

    /// Clear all completion state. Chores are kept.
    pub fn clear_completed(&mut self) -> usize {
        self.completions.clear()
    }

    /// Occurrences in an arbitrary window, with completion state.
    pub fn agenda(&self, window: DateWindow) -> Vec<AgendaEntry<'_>> {
        expand_window(&self.chores, window)
            .into_iter()
            .map(|occ| AgendaEntry {
                chore: occ.chore,
                date: occ.date,
                done: self.completions.contains(&occ.chore.id, occ.date),
            })
            .collect()
    }

    /// The upcoming list: `days` dates starting at `today`.
    pub fn upcoming(&self, today: NaiveDate, days: u32) -> Vec<AgendaEntry<'_>> {
        self.agenda(DateWindow::horizon(today, days))
    }

    /// The calendar view for one month. `None` for an invalid month.
    pub fn month(&self, year: i32, month: u32) -> Option<Vec<AgendaEntry<'_>>> {
        DateWindow::month(year, month).map(|window| self.agenda(window))
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.chores
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ChoreError::ChoreNotFound(id.to_string()))
    }

    fn next_id(&self, created_at: DateTime<Utc>) -> String {
        let mut candidate = created_at.timestamp_millis();
        while self.chores.iter().any(|c| c.id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }
}
