//! Asset service client.

use super::transport::OpenCloudTransport;
use super::types::{CreateAssetResponse, OperationResponse};
use super::{AssetType, ContentType, OpenCloudError};
use crate::assets::{CollaboratorError, OperationPoller};
use crate::provider::HttpResponse;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Create Asset endpoint.
pub const ASSETS_URL: &str = "https://apis.roblox.com/assets/v1/assets";

/// Operation status endpoint; the operation id is appended.
pub const OPERATIONS_URL: &str = "https://apis.roblox.com/assets/v1/operations";

/// HTTP status the service uses when the rate limit is exhausted.
const RESOURCE_EXHAUSTED: u16 = 429;

/// Prefix of a resolved asset reference.
pub const ASSET_URI_PREFIX: &str = "rbxassetid://";

/// Waits between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDelays {
    /// Pause after a rate-limited or unanswered request.
    pub rate_limit: Duration,
    /// Base pause between operation polls, multiplied by the attempt index.
    pub poll_interval: Duration,
}

impl Default for RetryDelays {
    fn default() -> Self {
        Self {
            rate_limit: Duration::from_secs(60),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl RetryDelays {
    /// No waiting at all.
    pub fn none() -> Self {
        Self {
            rate_limit: Duration::ZERO,
            poll_interval: Duration::ZERO,
        }
    }
}

/// Creates a remote asset from a local file.
///
/// Implemented by [`OpenCloudClient`]; the upload strategies depend on this
/// trait so they can be exercised without a network.
pub trait AssetCreator: Send + Sync {
    /// Returns the id of the remote create operation.
    fn create_asset(
        &self,
        file: &Path,
        asset_type: AssetType,
        content_type: ContentType,
        display_name: &str,
    ) -> Result<String, OpenCloudError>;
}

/// Client for the asset and operation endpoints.
pub struct OpenCloudClient<T: OpenCloudTransport> {
    transport: T,
    api_key: String,
    user_id: String,
    max_retries: u32,
    delays: RetryDelays,
}

impl<T: OpenCloudTransport> OpenCloudClient<T> {
    pub fn new(
        transport: T,
        api_key: impl Into<String>,
        user_id: impl Into<String>,
        max_retries: u32,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            user_id: user_id.into(),
            max_retries: max_retries.max(1),
            delays: RetryDelays::default(),
        }
    }

    pub fn with_delays(mut self, delays: RetryDelays) -> Self {
        self.delays = delays;
        self
    }

    /// Sends a Create Asset request for `file` and returns the operation id.
    pub fn create_asset(
        &self,
        file: &Path,
        asset_type: AssetType,
        content_type: ContentType,
        display_name: &str,
    ) -> Result<String, OpenCloudError> {
        let request = json!({
            "assetType": asset_type.as_str(),
            "displayName": display_name,
            "description": "",
            "creationContext": {
                "creator": { "userId": self.user_id }
            }
        })
        .to_string();

        let mut last_body = String::new();
        for attempt in 1..=self.max_retries {
            let result = self.transport.post_asset(
                ASSETS_URL,
                &self.api_key,
                &request,
                file,
                content_type.mime(),
            );

            match result {
                Ok(response) if response.is_success() => {
                    let created: CreateAssetResponse = serde_json::from_slice(&response.body)
                        .map_err(|e| OpenCloudError::InvalidResponse(e.to_string()))?;
                    debug!(operation_id = %created.operation_id, "Create asset {} accepted", display_name);
                    return Ok(created.operation_id);
                }
                Ok(response) => {
                    last_body = response.text();
                    if is_rate_limited(&response) {
                        warn!("Exhausted rate limit for Create Asset, waiting before retry");
                        self.pause(self.delays.rate_limit, attempt);
                    } else {
                        warn!(
                            attempt,
                            status = response.status,
                            "Create asset {} rejected", display_name
                        );
                    }
                }
                Err(e) => {
                    warn!(attempt, "Create asset {} got no response: {}", display_name, e);
                    last_body = e.to_string();
                    self.pause(self.delays.rate_limit, attempt);
                }
            }
        }

        Err(OpenCloudError::RetriesExhausted {
            request: format!("Create asset {} ({})", display_name, file.display()),
            attempts: self.max_retries,
            body: last_body,
        })
    }

    /// Polls an operation until it is done and returns the bare asset id.
    pub fn get_operation(&self, operation_id: &str) -> Result<String, OpenCloudError> {
        let url = format!("{}/{}", OPERATIONS_URL, operation_id);

        let mut last_body = String::new();
        for attempt in 0..self.max_retries {
            match self.transport.get(&url, &self.api_key) {
                Ok(response) if response.is_success() => {
                    let operation: OperationResponse = serde_json::from_slice(&response.body)
                        .map_err(|e| OpenCloudError::InvalidResponse(e.to_string()))?;

                    if let Some(error) = operation.error {
                        return Err(OpenCloudError::OperationFailed {
                            operation_id: operation_id.to_string(),
                            error: error.to_string(),
                        });
                    }

                    if operation.done {
                        return operation
                            .response
                            .as_ref()
                            .and_then(|r| r.asset_id())
                            .ok_or_else(|| {
                                OpenCloudError::InvalidResponse(format!(
                                    "operation {} done without assetId",
                                    operation_id
                                ))
                            });
                    }

                    debug!(attempt, "Operation {} still pending", operation_id);
                    last_body = response.text();
                }
                Ok(response) => {
                    last_body = response.text();
                    if is_rate_limited(&response) {
                        warn!("Exhausted rate limit for Get Operation, waiting before retry");
                        self.pause(self.delays.rate_limit, attempt + 1);
                    } else {
                        warn!(
                            attempt,
                            status = response.status,
                            "Get operation {} rejected", operation_id
                        );
                    }
                }
                Err(e) => {
                    warn!(attempt, "Get operation {} got no response: {}", operation_id, e);
                    last_body = e.to_string();
                    self.pause(self.delays.rate_limit, attempt + 1);
                }
            }

            self.pause(self.delays.poll_interval * attempt, attempt + 1);
        }

        Err(OpenCloudError::RetriesExhausted {
            request: format!("Get operation {}", operation_id),
            attempts: self.max_retries,
            body: last_body,
        })
    }

    /// Sleeps unless `attempt` was the last one.
    fn pause(&self, delay: Duration, attempt: u32) {
        if attempt < self.max_retries && !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

fn is_rate_limited(response: &HttpResponse) -> bool {
    response.status == RESOURCE_EXHAUSTED || response.status == 0
}

impl<T: OpenCloudTransport> AssetCreator for OpenCloudClient<T> {
    fn create_asset(
        &self,
        file: &Path,
        asset_type: AssetType,
        content_type: ContentType,
        display_name: &str,
    ) -> Result<String, OpenCloudError> {
        OpenCloudClient::create_asset(self, file, asset_type, content_type, display_name)
    }
}

impl<T: OpenCloudTransport> OperationPoller for OpenCloudClient<T> {
    fn get_operation(&self, handle: &str) -> Result<String, CollaboratorError> {
        let asset_id = OpenCloudClient::get_operation(self, handle)?;
        Ok(format!("{}{}", ASSET_URI_PREFIX, asset_id))
    }
}
