//! HTTP transport for the asset service.

use super::OpenCloudError;
use crate::provider::HttpResponse;
use reqwest::blocking::multipart::{Form, Part};
use std::path::Path;
use std::time::Duration;

/// The two requests the asset client makes.
///
/// Non-2xx answers come back as `Ok` so the client can decide whether to
/// retry.
pub trait OpenCloudTransport: Send + Sync {
    /// Multipart POST with a `request` JSON field and a `fileContent` file part.
    fn post_asset(
        &self,
        url: &str,
        api_key: &str,
        request: &str,
        file: &Path,
        mime: &str,
    ) -> Result<HttpResponse, OpenCloudError>;

    fn get(&self, url: &str, api_key: &str) -> Result<HttpResponse, OpenCloudError>;
}

/// Transport over `reqwest::blocking`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, OpenCloudError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| OpenCloudError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

fn into_response(
    response: reqwest::Result<reqwest::blocking::Response>,
) -> Result<HttpResponse, OpenCloudError> {
    let response = response.map_err(|e| OpenCloudError::Transport(e.to_string()))?;
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|e| OpenCloudError::Transport(format!("Failed to read response: {}", e)))?;
    Ok(HttpResponse::new(status, body.to_vec()))
}

impl OpenCloudTransport for ReqwestTransport {
    fn post_asset(
        &self,
        url: &str,
        api_key: &str,
        request: &str,
        file: &Path,
        mime: &str,
    ) -> Result<HttpResponse, OpenCloudError> {
        let part = Part::file(file)
            .map_err(|e| OpenCloudError::Transport(format!("{}: {}", file.display(), e)))?
            .mime_str(mime)
            .map_err(|e| OpenCloudError::Transport(e.to_string()))?;
        let form = Form::new()
            .text("request", request.to_string())
            .part("fileContent", part);

        into_response(
            self.client
                .post(url)
                .header("x-api-key", api_key)
                .multipart(form)
                .send(),
        )
    }

    fn get(&self, url: &str, api_key: &str) -> Result<HttpResponse, OpenCloudError> {
        into_response(self.client.get(url).header("x-api-key", api_key).send())
    }
}
