//! Blocking HTTP transport for the sync endpoint.
//!
//! Uploads are a JSON `POST`, downloads a `GET`, both against the same URL.
//! Script-hosted endpoints answer through a redirect, which the client follows.

use std::time::Duration;

use anyhow::{Context, Result};
use chore_engine::error::{ChoreError, Result as ChoreResult};
use chore_engine::sync::{DownloadResponse, SyncTransport, UploadPayload, UploadResponse};
use reqwest::blocking::{Client, Response};

pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl SyncTransport for HttpTransport {
    fn upload(&self, payload: &UploadPayload) -> ChoreResult<UploadResponse> {
        tracing::debug!(url = %self.url, "uploading snapshot");
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(transport_error)?;
        check_status(response)?.json().map_err(transport_error)
    }

    fn download(&self) -> ChoreResult<DownloadResponse> {
        tracing::debug!(url = %self.url, "downloading snapshot");
        let response = self.client.get(&self.url).send().map_err(transport_error)?;
        check_status(response)?.json().map_err(transport_error)
    }
}

fn check_status(response: Response) -> ChoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ChoreError::SyncTransport(format!(
            "endpoint returned HTTP {}",
            status
        )))
    }
}

fn transport_error(err: reqwest::Error) -> ChoreError {
    ChoreError::SyncTransport(err.to_string())
}
