//! Shared Balance Oracle (C2, §4.2).
//!
//! A per-pubkey TTL cache sits in front of the chain reader, gated by the
//! shared `RpcGate` (C9) so balance reads and trade submissions compete
//! fairly for the same rate budget. On a chain read failure the oracle
//! falls back to the last value it successfully observed rather than
//! failing the caller outright (§4.2 edge case: "a transient RPC failure
//! must not make a funded user look unfunded").

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::cache::{CacheConfig as CacheManagerConfig, CacheManager};
use crate::core::{CoreError, CoreResult};
use crate::logger::{self, LogTag};
use crate::rpc::RpcGate;

use super::reader::ChainBalanceReader;

pub struct BalanceOracle {
    reader: Arc<dyn ChainBalanceReader>,
    rpc_gate: Arc<RpcGate>,
    cache: CacheManager<String, u64>,
    last_known: RwLock<HashMap<String, u64>>,
    batch_size: usize,
}

impl BalanceOracle {
    pub fn new(
        reader: Arc<dyn ChainBalanceReader>,
        rpc_gate: Arc<RpcGate>,
        ttl_secs: u64,
        batch_size: usize,
    ) -> Self {
        Self {
            reader,
            rpc_gate,
            cache: CacheManager::new(CacheManagerConfig::custom(ttl_secs, 100_000)),
            last_known: RwLock::new(HashMap::new()),
            batch_size: batch_size.max(1),
        }
    }

    /// Fetches the balance (in lamports) for `pubkey`, consulting the cache
    /// first (§4.2 P12: "repeated reads for the same pubkey within the TTL
    /// window must not reach the chain twice").
    pub async fn get_balance(&self, pubkey: &str) -> CoreResult<u64> {
        if let Some(cached) = self.cache.get(&pubkey.to_string()) {
            return Ok(cached);
        }

        self.rpc_gate.acquire().await;
        match self.reader.get_balance(pubkey).await {
            Ok(balance) => {
                self.rpc_gate.report_success();
                self.remember(pubkey, balance);
                Ok(balance)
            }
            Err(err) => self.fallback_or_err(pubkey, err).await,
        }
    }

    /// Batched variant, chunked by `rpcBatchSize` (§4.8 step 2). Returns one
    /// result per input pubkey, in input order.
    pub async fn batch_get_balances(&self, pubkeys: &[String]) -> Vec<(String, CoreResult<u64>)> {
        let mut results: Vec<Option<CoreResult<u64>>> = pubkeys.iter().map(|_| None).collect();
        let mut misses = Vec::new();
        for (i, pk) in pubkeys.iter().enumerate() {
            if let Some(cached) = self.cache.get(pk) {
                results[i] = Some(Ok(cached));
            } else {
                misses.push(i);
            }
        }

        for chunk in misses.chunks(self.batch_size) {
            let chunk_keys: Vec<String> = chunk.iter().map(|&i| pubkeys[i].clone()).collect();
            self.rpc_gate.acquire().await;
            match self.reader.get_balances(&chunk_keys).await {
                Ok(values) => {
                    self.rpc_gate.report_success();
                    for (&i, result) in chunk.iter().zip(values.into_iter()) {
                        results[i] = Some(match result {
                            Ok(balance) => {
                                self.remember(&pubkeys[i], balance);
                                Ok(balance)
                            }
                            Err(err) => self.fallback_or_err(&pubkeys[i], err).await,
                        });
                    }
                }
                Err(err) => {
                    for &i in chunk {
                        let retry_err = CoreError::TransientRpc(err.to_string());
                        results[i] = Some(self.fallback_or_err(&pubkeys[i], retry_err).await);
                    }
                }
            }
        }

        pubkeys
            .iter()
            .cloned()
            .zip(results.into_iter().map(|r| r.unwrap()))
            .collect()
    }

    fn remember(&self, pubkey: &str, balance: u64) {
        self.cache.insert(pubkey.to_string(), balance);
        self.last_known
            .write()
            .unwrap()
            .insert(pubkey.to_string(), balance);
    }

    async fn fallback_or_err(&self, pubkey: &str, err: CoreError) -> CoreResult<u64> {
        if err.is_retryable() {
            self.rpc_gate.report_rate_limited(err.retry_after()).await;
        }
        if let Some(&stale) = self.last_known.read().unwrap().get(pubkey) {
            logger::warning(
                LogTag::BalanceOracle,
                &format!("chain read failed for {pubkey}, serving last known balance: {err}"),
            );
            return Ok(stale);
        }
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeReader {
        balance: std::sync::Mutex<u64>,
        calls: AtomicUsize,
        fail_next: std::sync::Mutex<bool>,
    }

    impl FakeReader {
        fn new(balance: u64) -> Self {
            Self {
                balance: std::sync::Mutex::new(balance),
                calls: AtomicUsize::new(0),
                fail_next: std::sync::Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl ChainBalanceReader for FakeReader {
        async fn get_balance(&self, _pubkey: &str) -> CoreResult<u64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if *self.fail_next.lock().unwrap() {
                return Err(CoreError::TransientRpc("simulated outage".to_string()));
            }
            Ok(*self.balance.lock().unwrap())
        }

        async fn get_balances(&self, pubkeys: &[String]) -> CoreResult<Vec<CoreResult<u64>>> {
            let mut out = Vec::new();
            for pk in pubkeys {
                out.push(self.get_balance(pk).await);
            }
            Ok(out)
        }
    }

    fn oracle(reader: Arc<FakeReader>) -> BalanceOracle {
        BalanceOracle::new(reader, Arc::new(RpcGate::new(1000, 1000)), 60, 10)
    }

    #[tokio::test]
    async fn repeated_reads_within_ttl_hit_cache_not_chain() {
        let reader = Arc::new(FakeReader::new(5_000_000_000));
        let o = oracle(reader.clone());
        o.get_balance("PK1").await.unwrap();
        o.get_balance("PK1").await.unwrap();
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn falls_back_to_last_known_on_chain_failure() {
        let reader = Arc::new(FakeReader::new(3_000_000_000));
        let o = BalanceOracle::new(reader.clone(), Arc::new(RpcGate::new(1000, 1000)), 0, 10);
        let first = o.get_balance("PK2").await.unwrap();
        assert_eq!(first, 3_000_000_000);

        *reader.fail_next.lock().unwrap() = true;
        let second = o.get_balance("PK2").await.unwrap();
        assert_eq!(second, 3_000_000_000);
    }

    #[tokio::test]
    async fn first_read_with_no_history_propagates_the_error() {
        let reader = Arc::new(FakeReader::new(0));
        *reader.fail_next.lock().unwrap() = true;
        let o = oracle(reader);
        assert!(o.get_balance("PK3").await.is_err());
    }
}
