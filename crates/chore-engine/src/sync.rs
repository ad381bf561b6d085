//! Best-effort sync with a remote endpoint.
//!
//! The endpoint has full-overwrite semantics: an upload replaces everything it
//! holds, a download returns everything it holds, and the last writer wins.
//! There is no merge and no conflict detection. A failed sync never touches
//! local state; callers apply a pulled snapshot only after it arrived intact.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::chore::{lenient_chores, Chore};
use crate::completion::CompletionSet;
use crate::error::{ChoreError, Result};
use crate::tracker::Snapshot;

/// The only action the endpoint understands.
pub const UPLOAD_ACTION: &str = "upload";

/// Body of an upload request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPayload {
    pub action: String,
    pub chores: Vec<Chore>,
    #[serde(rename = "completionMap")]
    pub completions: CompletionSet,
    pub exported_at: String,
}

impl UploadPayload {
    pub fn from_snapshot(snapshot: &Snapshot, exported_at: DateTime<Utc>) -> Self {
        Self {
            action: UPLOAD_ACTION.to_string(),
            chores: snapshot.chores.clone(),
            completions: snapshot.completions.clone(),
            exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Structured endpoint reply to an upload. Failures are reported as
/// `ok: false` with an `error` message rather than as a transport error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chores_written: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completions_written: Option<usize>,
}

impl UploadResponse {
    pub fn success(chores_written: usize, completions_written: usize) -> Self {
        Self {
            ok: true,
            error: None,
            chores_written: Some(chores_written),
            completions_written: Some(completions_written),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Endpoint reply to a download: the full remote state, or an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    #[serde(default, deserialize_with = "lenient_chores")]
    pub chores: Vec<Chore>,
    #[serde(default, rename = "completionMap")]
    pub completions: CompletionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A way to reach the remote endpoint.
pub trait SyncTransport {
    fn upload(&self, payload: &UploadPayload) -> Result<UploadResponse>;
    fn download(&self) -> Result<DownloadResponse>;
}

/// Outcome of a successful push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReport {
    pub chores_written: usize,
    pub completions_written: usize,
}

/// Outcome of a successful pull.
#[derive(Debug, Clone, PartialEq)]
pub struct PullResult {
    pub snapshot: Snapshot,
    pub synced_at: Option<String>,
}

/// Upload `snapshot`, overwriting the remote copy.
///
/// # Errors
/// Returns `ChoreError::SyncTransport` when the transport fails or the
/// endpoint answers `ok: false`.
pub fn push<T: SyncTransport + ?Sized>(
    transport: &T,
    snapshot: &Snapshot,
    now: DateTime<Utc>,
) -> Result<PushReport> {
    let payload = UploadPayload::from_snapshot(snapshot, now);
    let response = transport.upload(&payload).map_err(into_sync_error)?;

    if !response.ok {
        let message = response
            .error
            .unwrap_or_else(|| "endpoint rejected the upload".to_string());
        return Err(ChoreError::SyncTransport(message));
    }

    let report = PushReport {
        chores_written: response.chores_written.unwrap_or(payload.chores.len()),
        completions_written: response
            .completions_written
            .unwrap_or(payload.completions.len()),
    };
    tracing::debug!(
        chores = report.chores_written,
        completions = report.completions_written,
        "pushed snapshot"
    );
    Ok(report)
}

/// Download the remote snapshot. The caller decides whether to replace local
/// state with it.
///
/// # Errors
/// Returns `ChoreError::SyncTransport` when the transport fails or the
/// endpoint answers with an `error`.
pub fn pull<T: SyncTransport + ?Sized>(transport: &T) -> Result<PullResult> {
    let response = transport.download().map_err(into_sync_error)?;

    if let Some(error) = response.error {
        return Err(ChoreError::SyncTransport(error));
    }

    tracing::debug!(
        chores = response.chores.len(),
        completions = response.completions.len(),
        synced_at = ?response.synced_at,
        "pulled snapshot"
    );
    Ok(PullResult {
        snapshot: Snapshot {
            chores: response.chores,
            completions: response.completions,
        },
        synced_at: response.synced_at,
    })
}

fn into_sync_error(err: ChoreError) -> ChoreError {
    match err {
        ChoreError::SyncTransport(_) => err,
        other => ChoreError::SyncTransport(other.to_string()),
    }
}
