//! Raster tile providers
//!
//! Downloads imagery and terrain tiles to disk for the upload strategies.
//!
//! ```ignore
//! use tilegen::provider::{MapboxClient, ReqwestClient, SATELLITE_TILESET};
//!
//! let client = MapboxClient::new(ReqwestClient::new()?, "pk.token", 15);
//! client.fetch_tile(SATELLITE_TILESET, tile, ".jpg", &path)?;
//! ```

mod http;
mod mapbox;
mod types;

pub use http::{HttpClient, ReqwestClient};
pub use mapbox::{MapboxClient, SATELLITE_TILESET, TERRAIN_DEM_TILESET};
pub use types::{HttpResponse, ProviderError};

#[cfg(test)]
pub use http::tests::MockHttpClient;
