//! Minimal HTTP GET transport for catalog and descriptor documents.
//!
//! The web build goes through `gloo-net`; the native build uses a
//! blocking `reqwest` client, which is fine because every job is driven
//! on its own worker thread.

use super::{Error, Result};
use serde::de::DeserializeOwned;
use std::future::Future;

/// Fetches a URL and returns the body as text.
///
/// Non-2xx responses are reported as [`Error::Network`].
pub trait HttpFetch {
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String>>;
}

/// GETs `url` and decodes the body as JSON.
pub async fn fetch_json<T, F>(fetcher: &F, url: &str) -> Result<T>
where
    T: DeserializeOwned,
    F: HttpFetch + ?Sized,
{
    let body = fetcher.get_text(url).await?;
    Ok(serde_json::from_str(&body)?)
}

/// Browser fetch transport.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct GlooFetcher;

#[cfg(target_arch = "wasm32")]
impl GlooFetcher {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(target_arch = "wasm32")]
impl HttpFetch for GlooFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        use gloo_net::http::Request;

        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !response.ok() {
            return Err(Error::Network(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

/// Native transport backed by `reqwest::blocking`.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct BlockingFetcher {
    client: reqwest::blocking::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl BlockingFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpFetch for BlockingFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Network(format!("HTTP {} from {}", status, url)));
        }

        response.text().map_err(|e| Error::Network(e.to_string()))
    }
}

/// Canned-response transport for tests.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct MockFetcher {
    responses: std::collections::HashMap<String, Result<String>>,
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

#[cfg(test)]
impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, url: &str, body: impl Into<String>) -> Self {
        self.responses.insert(url.to_string(), Ok(body.into()));
        self
    }

    pub fn with_error(mut self, url: &str, error: Error) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }

    /// Number of requests issued so far, across clones.
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl HttpFetch for MockFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(Error::Network(format!("HTTP 404 from {}", url))))
    }
}
