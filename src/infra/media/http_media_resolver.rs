use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use crate::domain::ports::MediaAssetResolver;

#[derive(Deserialize)]
struct AssetResponse {
    url: String,
}

/// Resolves asset ids against the media service. Any failure (network,
/// timeout, unknown asset, malformed body) degrades to the placeholder URL.
pub struct HttpMediaResolver {
    client: reqwest::Client,
    base_url: String,
    placeholder_url: String,
}

impl HttpMediaResolver {
    pub fn new(base_url: String, placeholder_url: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build media HTTP client");

        Self {
            client,
            base_url,
            placeholder_url,
        }
    }
}

#[async_trait]
impl MediaAssetResolver for HttpMediaResolver {
    async fn resolve_url(&self, asset_id: &str) -> String {
        let url = format!("{}/{}", self.base_url, asset_id);

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("Media service unreachable for asset {}: {}", asset_id, e);
                return self.placeholder_url.clone();
            }
        };

        if !response.status().is_success() {
            warn!(
                "Media service returned {} for asset {}",
                response.status(),
                asset_id
            );
            return self.placeholder_url.clone();
        }

        match response.json::<AssetResponse>().await {
            Ok(asset) => asset.url,
            Err(e) => {
                warn!("Malformed media service response for asset {}: {}", asset_id, e);
                self.placeholder_url.clone()
            }
        }
    }
}
