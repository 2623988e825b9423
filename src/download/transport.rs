//! Fetching a URL into a local file.

use std::fmt::Debug;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::utils::HttpClient;

/// A failed fetch of one link; recovered by skipping the link
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request for {url} failed: {message}")]
    Network { url: String, message: String },

    #[error("{url} returned HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Downloads a URL to a path
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Fetch `url` and store the body at `path`, returning the number of bytes written.
    ///
    /// On error no file may be left at `path` that was not there before.
    async fn fetch(&self, url: &str, path: &Path) -> Result<u64, TransportError>;
}

/// [`Transport`] backed by the shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, path: &Path) -> Result<u64, TransportError> {
        let network = |e: reqwest::Error| TransportError::Network {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self.client.get(url).send().await.map_err(network)?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(network)?;

        write_atomically(path, &bytes).map_err(|source| TransportError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(bytes.len() as u64)
    }
}

/// Write `bytes` to a temporary file next to `path`, then rename it into place.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
