//! Remote asset service.
//!
//! Creates image and mesh assets from local files and waits for the
//! resulting operations to finish. Requests are authenticated with an API
//! key and retried on rate limiting.

mod client;
mod transport;
mod types;

pub use client::{
    AssetCreator, OpenCloudClient, RetryDelays, ASSETS_URL, ASSET_URI_PREFIX, OPERATIONS_URL,
};
pub use transport::{OpenCloudTransport, ReqwestTransport};
pub use types::{AssetType, ContentType, OpenCloudError};

#[cfg(test)]
pub use client::tests::MockAssetCreator;
