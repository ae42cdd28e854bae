//! Retrieval of the raw dataset bytes from a local path or an HTTP URL.

mod basic;
mod client;

pub use basic::BasicClient;
pub use client::HttpClient;

use anyhow::{Context, Result};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Where the dataset CSV is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Path(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// `http://` and `https://` locations are URLs; anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DatasetSource::Url(location.to_string())
        } else {
            DatasetSource::Path(PathBuf::from(location))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, DatasetSource::Url(_))
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::Path(p) => write!(f, "{}", p.display()),
            DatasetSource::Url(u) => f.write_str(u),
        }
    }
}

/// GETs `url` and returns the body, failing on a non-success status.
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: &str) -> Result<Vec<u8>> {
    let req = reqwest::Request::new(reqwest::Method::GET, url.parse()?);

    let resp = client.execute(req).await?.error_for_status()?;
    Ok(resp.bytes().await?.to_vec())
}

/// Reads the dataset bytes from `source`.
///
/// # Errors
///
/// Fails if the file cannot be read or the download fails; the error names
/// the source.
#[tracing::instrument(skip_all, fields(source = %source))]
pub async fn load_bytes<C: HttpClient>(client: &C, source: &DatasetSource) -> Result<Vec<u8>> {
    let bytes = match source {
        DatasetSource::Url(url) => fetch_bytes(client, url)
            .await
            .with_context(|| format!("Failed to download dataset from {url}"))?,
        DatasetSource::Path(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read dataset '{}'", path.display()))?,
    };
    debug!(bytes = bytes.len(), "Dataset bytes loaded");
    Ok(bytes)
}
