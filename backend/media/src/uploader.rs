//! Pomf file-host uploader.
//!
//! Pushes raw media to a Pomf-compatible host and returns the public URL.

use bytes::Bytes;
use chrono::Utc;
use reqwest::header::USER_AGENT;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::MediaError;
use crate::mime_detect::sniff;
use crate::BROWSER_USER_AGENT;

/// Default Pomf upload endpoint.
pub const POMF_UPLOAD_URL: &str = "https://pomf.lain.la/upload.php";

#[derive(Debug, Deserialize)]
struct PomfResponse {
    #[serde(default)]
    files: Vec<PomfFile>,
}

#[derive(Debug, Deserialize)]
struct PomfFile {
    url: String,
}

pub struct PomfUploader {
    client: Client,
    endpoint: String,
}

impl PomfUploader {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: POMF_UPLOAD_URL.to_string(),
        }
    }

    /// Point the uploader at another Pomf-compatible host.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Upload `media` and return the URL of the hosted file.
    ///
    /// The file type is sniffed from the bytes; unknown payloads are rejected
    /// before any request is made.
    pub async fn upload(&self, media: Bytes) -> Result<String, MediaError> {
        let kind = sniff(&media).ok_or(MediaError::UnknownFileType)?;
        let file_name = format!("file-{}.{}", Utc::now().timestamp_millis(), kind.ext);
        info!(endpoint = %self.endpoint, file_name = %file_name, bytes = media.len(), "Uploading media");

        let result = self.send(media, file_name, kind.mime).await;
        if let Err(e) = &result {
            warn!(endpoint = %self.endpoint, "Media upload failed: {}", e);
        }
        result
    }

    async fn send(&self, media: Bytes, file_name: String, mime: &str) -> Result<String, MediaError> {
        let part = Part::bytes(media.to_vec()).file_name(file_name).mime_str(mime)?;
        let form = Form::new().part("files[]", part);

        let response: PomfResponse = self
            .client
            .post(&self.endpoint)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .files
            .into_iter()
            .next()
            .map(|f| f.url)
            .ok_or(MediaError::MissingUploadUrl)
    }
}
