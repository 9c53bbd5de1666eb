//! Chain-facing seam for token price lookups, mirroring `balance::reader`.

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::{CoreError, CoreResult};

#[async_trait]
pub trait PriceFetcher: Send + Sync {
    /// Price of one unit of `mint`, denominated in SOL.
    async fn fetch_price(&self, mint: &str) -> CoreResult<f64>;
}

#[derive(Debug, Deserialize)]
struct JupiterPriceResponse {
    data: std::collections::HashMap<String, JupiterPriceEntry>,
}

#[derive(Debug, Deserialize)]
struct JupiterPriceEntry {
    price: f64,
}

/// Production fetcher backed by Jupiter's public price API. One HTTP
/// round trip per cache miss — the `PriceCache`'s single-flight coalescing
/// is what keeps this from being hit once per strategy per mint.
pub struct JupiterPriceFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl JupiterPriceFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: "https://price.jup.ag/v4/price".to_string(),
        }
    }
}

impl Default for JupiterPriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceFetcher for JupiterPriceFetcher {
    async fn fetch_price(&self, mint: &str) -> CoreResult<f64> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("ids", mint)])
            .send()
            .await
            .map_err(|e| CoreError::TransientRpc(e.to_string()))?
            .json::<JupiterPriceResponse>()
            .await
            .map_err(|e| CoreError::TransientRpc(format!("malformed price response: {e}")))?;

        response
            .data
            .get(mint)
            .map(|entry| entry.price)
            .ok_or_else(|| CoreError::InvalidInput {
                reason: format!("no price quoted for mint {mint}"),
            })
    }
}
