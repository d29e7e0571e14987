//! Provider types

use std::fmt;

/// Errors that can occur during provider operations.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// HTTP request failed
    HttpError(String),
    /// Zoom level not supported by this provider
    UnsupportedZoom(u8),
    /// Every attempt to fetch the tile failed
    TileUnavailable { x: u32, y: u32, zoom: u8 },
    /// Fetched data could not be written to disk
    Io(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::HttpError(msg) => write!(f, "HTTP error: {}", msg),
            ProviderError::UnsupportedZoom(zoom) => {
                write!(f, "Zoom level {} not supported by provider", zoom)
            }
            ProviderError::TileUnavailable { x, y, zoom } => {
                write!(f, "Failed to get image tile at: X:{} Y:{} ZOOM:{}", x, y, zoom)
            }
            ProviderError::Io(msg) => write!(f, "Failed to save tile: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Raw HTTP response: status code and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
