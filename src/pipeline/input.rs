//! Input resolution for the CLI: turn a path or URL into an [`UploadedDocument`].
//!
//! The HTTP service receives documents as multipart uploads; the `plan`
//! subcommand instead takes a local path or an HTTP(S) URL. Either way the
//! pipeline sees the same [`UploadedDocument`], so size and type checks are
//! identical. The declared content type comes from the `Content-Type`
//! response header for URLs and stays empty for local files, letting the
//! validator fall back to the extension.

use crate::error::StudyPlanError;
use crate::pipeline::validate::{check_size, UploadedDocument};
use std::path::Path;
use tracing::{debug, info};

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load `input` into memory, refusing anything larger than `max_file_size`.
pub async fn resolve_input(
    input: &str,
    max_file_size: u64,
    timeout_secs: u64,
) -> Result<UploadedDocument, StudyPlanError> {
    if is_url(input) {
        download_url(input, max_file_size, timeout_secs).await
    } else {
        read_local(input, max_file_size).await
    }
}

/// Read a local file after checking its size from metadata.
async fn read_local(
    path_str: &str,
    max_file_size: u64,
) -> Result<UploadedDocument, StudyPlanError> {
    let path = Path::new(path_str);
    let not_found = || StudyPlanError::FileNotFound {
        path: path_str.to_string(),
    };

    let meta = tokio::fs::metadata(path).await.map_err(|_| not_found())?;
    if !meta.is_file() {
        return Err(not_found());
    }
    check_size(meta.len(), max_file_size)?;

    let bytes = tokio::fs::read(path).await.map_err(|_| not_found())?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.to_string());

    debug!("Read local document '{}' ({} bytes)", name, bytes.len());
    Ok(UploadedDocument::new(name, "", bytes))
}

/// Download a URL into memory.
async fn download_url(
    url: &str,
    max_file_size: u64,
    timeout_secs: u64,
) -> Result<UploadedDocument, StudyPlanError> {
    info!("Downloading document from: {}", url);

    let failed = |reason: String| StudyPlanError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            failed(format!("timed out after {}s", timeout_secs))
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    if let Some(len) = response.content_length() {
        check_size(len, max_file_size)?;
    }

    let mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let name = filename_from_url(url);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    check_size(bytes.len() as u64, max_file_size)?;

    info!("Downloaded '{}' ({} bytes, {})", name, bytes.len(), mime);
    Ok(UploadedDocument::new(name, mime, bytes.to_vec()))
}

/// Last non-empty URL path segment, or `downloaded` when there is none.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded".to_string()
}
