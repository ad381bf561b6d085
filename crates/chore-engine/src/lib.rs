//! # chore-engine
//!
//! Deterministic recurrence expansion for a personal habit/chore tracker.
//!
//! A chore has a start date and a recurrence rule (none, daily, weekly, or
//! monthly by day-of-month). The engine answers one question, "does this
//! chore occur on this calendar date?", and builds finite, sorted windows of
//! occurrences on top of it. Around that pure core sit the tracker (chores
//! plus completion records), JSON storage, and best-effort remote sync.
//!
//! ## Modules
//!
//! - [`occurrence`]: `(chore, date) → bool`
//! - [`expander`]: date window → sorted `(chore, date)` occurrences
//! - [`chore`]: `Chore`, `Recurrence`, validated `NewChore` input
//! - [`completion`]: `CompletionKey` and its `"id|date"` wire form
//! - [`tracker`]: the store object, with lifecycle rules and views
//! - [`store`]: key-value persistence with legacy migration
//! - [`sync`]: upload/download payloads and the `SyncTransport` trait
//! - [`remote`]: in-process model of the spreadsheet endpoint
//! - [`date`]: calendar-date parsing and month/week helpers
//! - [`error`]: Error types

pub mod chore;
pub mod completion;
pub mod date;
pub mod error;
pub mod expander;
pub mod occurrence;
pub mod remote;
pub mod store;
pub mod sync;
pub mod tracker;

pub use chore::{Chore, NewChore, Recurrence};
pub use completion::{CompletionKey, CompletionSet};
pub use error::ChoreError;
pub use expander::{expand_occurrences, DateWindow, Occurrence};
pub use occurrence::occurs_on_date;
pub use tracker::{AgendaEntry, Snapshot, Tracker};
