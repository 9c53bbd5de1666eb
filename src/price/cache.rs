//! Shared Price Cache (C3, §4.3).
//!
//! Every strategy reads through this cache rather than the chain directly,
//! so price lookups are shared across tenants. The interesting property is
//! single-flight coalescing (§4.3 P12/edge case: "N strategies requesting
//! the same mint in the same instant must produce one fetch, not N"):
//! concurrent misses for the same mint share one in-flight fetch via a
//! `Shared` future instead of stampeding the upstream source.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;

use crate::cache::{CacheConfig as CacheManagerConfig, CacheManager};
use crate::core::{CoreError, CoreResult};

use super::fetcher::PriceFetcher;

type InFlight = Shared<BoxFuture<'static, Result<f64, String>>>;

pub struct PriceCache {
    fetcher: Arc<dyn PriceFetcher>,
    cache: CacheManager<String, f64>,
    inflight: Mutex<HashMap<String, InFlight>>,
}

impl PriceCache {
    pub fn new(fetcher: Arc<dyn PriceFetcher>, ttl_secs: u64) -> Self {
        Self {
            fetcher,
            cache: CacheManager::new(CacheManagerConfig::custom(ttl_secs, 50_000)),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get_price(&self, mint: &str) -> CoreResult<f64> {
        if let Some(price) = self.cache.get(&mint.to_string()) {
            return Ok(price);
        }

        let shared = {
            let mut inflight = self.inflight.lock().await;
            if let Some(existing) = inflight.get(mint) {
                existing.clone()
            } else {
                let fetcher = self.fetcher.clone();
                let mint_owned = mint.to_string();
                let fut: BoxFuture<'static, Result<f64, String>> = async move {
                    fetcher
                        .fetch_price(&mint_owned)
                        .await
                        .map_err(|e| e.to_string())
                }
                .boxed();
                let shared = fut.shared();
                inflight.insert(mint.to_string(), shared.clone());
                shared
            }
        };

        let result = shared.await;
        self.inflight.lock().await.remove(mint);

        match result {
            Ok(price) => {
                self.cache.insert(mint.to_string(), price);
                Ok(price)
            }
            Err(msg) => Err(CoreError::TransientRpc(msg)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct SlowFetcher {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceFetcher for SlowFetcher {
        async fn fetch_price(&self, _mint: &str) -> CoreResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok(1.23)
        }
    }

    #[tokio::test]
    async fn concurrent_misses_for_the_same_mint_coalesce_into_one_fetch() {
        let fetcher = Arc::new(SlowFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(PriceCache::new(fetcher.clone(), 60));

        let a = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_price("MINT1").await })
        };
        let b = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get_price("MINT1").await })
        };

        let (ra, rb) = tokio::join!(a, b);
        assert_eq!(ra.unwrap().unwrap(), 1.23);
        assert_eq!(rb.unwrap().unwrap(), 1.23);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn subsequent_call_after_completion_hits_cache_not_fetcher() {
        let fetcher = Arc::new(SlowFetcher {
            calls: AtomicUsize::new(0),
        });
        let cache = PriceCache::new(fetcher.clone(), 60);
        cache.get_price("MINT2").await.unwrap();
        cache.get_price("MINT2").await.unwrap();
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }
}
