//! HTTP client abstraction for testability

use super::types::{HttpResponse, ProviderError};
use tracing::trace;

/// Trait for synchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// Non-2xx responses are returned as `Ok`; only transport failures are
    /// errors, so callers can inspect error bodies.
    fn get(&self, url: &str) -> Result<HttpResponse, ProviderError>;
}

/// Real HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

/// Default User-Agent string for HTTP requests.
const DEFAULT_USER_AGENT: &str = concat!("tilegen/", env!("CARGO_PKG_VERSION"));

impl ReqwestClient {
    /// Creates a new ReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(60)
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str) -> Result<HttpResponse, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ProviderError::HttpError(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        trace!(status, "GET response");

        let body = response
            .bytes()
            .map_err(|e| ProviderError::HttpError(format!("Failed to read response: {}", e)))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
