//! Error types for chore-engine operations.
//!
//! The occurrence predicate and expansion never fail; these errors come from
//! the tracker, storage, and sync layers around them.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChoreError {
    /// Rejected user input (missing title, missing or invalid date).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Chore not found: {0}")]
    ChoreNotFound(String),

    #[error("Chore {chore_id} has no occurrence on {date}")]
    NotAnOccurrence { chore_id: String, date: String },

    /// Stored data could not be decoded. Storage recovers from this by
    /// resetting to an empty snapshot.
    #[error("Malformed stored data under '{key}': {message}")]
    MalformedStoredData { key: String, message: String },

    /// Network or endpoint failure during sync. Non-fatal and retryable;
    /// local state is never touched when this is returned.
    #[error("Sync failed: {0}")]
    SyncTransport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChoreError>;
