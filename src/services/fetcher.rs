//! Source playlist fetching
//!
//! One GET per source, no retries. Every failure comes back as a
//! [`FetchError`] so the caller can skip the source and move on.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::models::SourceDescriptor;

/// Fetch error types
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request did not finish within the configured timeout
    #[error("Timed out after {0}ms")]
    Timeout(u64),
    /// Non-2xx status
    #[error("HTTP {0}")]
    Http(u16),
    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),
    /// Body larger than the configured limit
    #[error("Playlist too large: {size_mb:.1}MB (limit {limit_mb}MB)")]
    TooLarge { size_mb: f64, limit_mb: usize },
    /// Body could not be read or decoded
    #[error("Failed to read body: {0}")]
    Body(String),
}

/// Retrieves the raw text of one source playlist
#[async_trait]
pub trait PlaylistFetcher: Send + Sync {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<String, FetchError>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
    timeout_ms: u64,
    max_size_mb: usize,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout_ms: u64, max_size_mb: usize) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            timeout_ms,
            max_size_mb,
            max_bytes: (max_size_mb as u64).saturating_mul(1024 * 1024),
        })
    }

    fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    fn too_large(&self, len: u64) -> FetchError {
        FetchError::TooLarge {
            size_mb: len as f64 / 1024f64 / 1024f64,
            limit_mb: self.max_size_mb,
        }
    }

    fn map_reqwest(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_ms)
        } else if err.is_body() || err.is_decode() {
            FetchError::Body(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl PlaylistFetcher for HttpFetcher {
    async fn fetch(&self, source: &SourceDescriptor) -> Result<String, FetchError> {
        debug!(source = %source.label, url = %source.url, "Fetching playlist");

        let mut response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| self.map_reqwest(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes() {
                return Err(self.too_large(len));
            }
        }

        // Chunked responses carry no Content-Length, so the limit is enforced while reading
        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.map_reqwest(e))? {
            let received = (body.len() + chunk.len()) as u64;
            if received > self.max_bytes() {
                return Err(self.too_large(received));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8(body)
            .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
    }
}
