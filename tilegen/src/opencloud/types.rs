//! Asset service types

use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors from the asset service.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OpenCloudError {
    /// Every attempt was used up without a usable answer.
    #[error("{request} failed after {attempts} attempts: {body}")]
    RetriesExhausted {
        request: String,
        attempts: u32,
        body: String,
    },

    /// The service reported the operation as failed.
    #[error("Error while processing Operation: {operation_id}: {error}")]
    OperationFailed { operation_id: String, error: String },

    /// A 2xx response whose body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be sent.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Kind of asset to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Image,
    Mesh,
}

impl AssetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetType::Image => "Image",
            AssetType::Mesh => "Mesh",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MIME type of the uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    Jpeg,
    Fbx,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Jpeg => "image/jpeg",
            ContentType::Fbx => "model/fbx",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreateAssetResponse {
    #[serde(rename = "operationId")]
    pub operation_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationResponse {
    #[serde(default)]
    pub done: bool,
    pub error: Option<serde_json::Value>,
    pub response: Option<OperationResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OperationResult {
    #[serde(rename = "assetId")]
    pub asset_id: serde_json::Value,
}

impl OperationResult {
    /// The asset id, whether the service sent it as a string or a number.
    pub fn asset_id(&self) -> Option<String> {
        match &self.asset_id {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}
