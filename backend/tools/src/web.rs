//! Web helpers: buffer/JSON fetch and HEAD lookups for bot commands.
use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};
use wakit_media::{extension_for_mime, mime_from_filename, sniff, BROWSER_USER_AGENT};

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const FALLBACK_MIME: &str = "application/octet-stream";
const FALLBACK_EXT: &str = "bin";

static FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"filename=(?:(?:"|')(.*?)(?:"|')|([^"'\s]+))"#).unwrap());

#[derive(Debug, Error)]
pub enum WebError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Per-request overrides for [`fetch_buffer`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Extra headers; these replace the browser defaults with the same name.
    pub headers: HashMap<String, String>,
    pub timeout: Option<Duration>,
}

/// A downloaded file with its best-guess type.
#[derive(Debug, Clone)]
pub struct FetchedBuffer {
    pub data: Bytes,
    /// From `Content-Disposition`, percent-decoded.
    pub filename: Option<String>,
    pub mimetype: String,
    pub ext: String,
}

/// Download `url` into memory.
///
/// The MIME type comes from the served file name when there is one, then
/// from the leading bytes, then falls back to `application/octet-stream`.
pub async fn fetch_buffer(client: &Client, url: &str, options: FetchOptions) -> Result<FetchedBuffer, WebError> {
    let mut request = client.get(url).headers(request_headers(&options.headers)?);
    if let Some(timeout) = options.timeout {
        request = request.timeout(timeout);
    }

    let response = request.send().await?.error_for_status()?;
    let filename = response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(disposition_filename);
    let data = response.bytes().await?;

    let sniffed = sniff(&data);
    let mimetype = filename
        .as_deref()
        .and_then(mime_from_filename)
        .or(sniffed.map(|s| s.mime))
        .unwrap_or(FALLBACK_MIME)
        .to_string();
    let ext = extension_for_mime(&mimetype)
        .or(sniffed.map(|s| s.ext))
        .unwrap_or(FALLBACK_EXT)
        .to_string();

    info!(url, bytes = data.len(), mimetype = %mimetype, "Fetched buffer");
    Ok(FetchedBuffer { data, filename, mimetype, ext })
}

/// GET `url` and decode the body as JSON.
pub async fn fetch_json(client: &Client, url: &str) -> Result<serde_json::Value, WebError> {
    let value = client.get(url).send().await?.error_for_status()?.json().await?;
    debug!(url, "Fetched JSON");
    Ok(value)
}

// ---------------------------------------------------------------------------
// HEAD lookups
// ---------------------------------------------------------------------------

/// Size in bytes reported by `Content-Length`, if the server sends one.
pub async fn get_size(client: &Client, url: &str) -> Result<Option<u64>, WebError> {
    let headers = head(client, url).await?;
    Ok(content_length(&headers))
}

/// Raw `Content-Type` reported by the server.
pub async fn get_mime(client: &Client, url: &str) -> Result<Option<String>, WebError> {
    let headers = head(client, url).await?;
    Ok(headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string))
}

async fn head(client: &Client, url: &str) -> Result<HeaderMap, WebError> {
    let response = client.head(url).send().await?.error_for_status()?;
    Ok(response.headers().clone())
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

fn request_headers(overrides: &HashMap<String, String>) -> Result<HeaderMap, WebError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert("upgrade-insecure-requests", HeaderValue::from_static("1"));
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

    for (name, value) in overrides {
        let invalid = |reason: String| WebError::InvalidHeader { name: name.clone(), reason };
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        headers.insert(header, value);
    }
    Ok(headers)
}

/// File name from a `Content-Disposition` value.
fn disposition_filename(disposition: &str) -> Option<String> {
    let caps = FILENAME_RE.captures(disposition)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    if raw.is_empty() {
        return None;
    }
    Some(
        urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_string()),
    )
}
