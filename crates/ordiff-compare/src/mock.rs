//! Mock indexer endpoint for testing

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{CompareError, CompareResult};
use crate::traits::IndexerApiAdapter;
use crate::types::ChainInfo;

/// In-memory [`IndexerApiAdapter`] with scripted fixtures and failure
/// injection.
#[derive(Clone)]
pub struct MockIndexerApi {
    endpoint: String,
    chain_info: Arc<RwLock<ChainInfo>>,
    block_hashes: Arc<RwLock<HashMap<u32, String>>>,
    receipts: Arc<RwLock<HashMap<String, Value>>>,
    connected: Arc<RwLock<bool>>,
    // remaining injected fetch failures per block hash
    fetch_failures: Arc<RwLock<HashMap<String, u32>>>,
    fetch_calls: Arc<AtomicU64>,
    hash_calls: Arc<AtomicU64>,
    latency: Arc<RwLock<Option<Duration>>>,
}

impl MockIndexerApi {
    pub fn new(endpoint: &str, network: &str, latest_height: u32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            chain_info: Arc::new(RwLock::new(ChainInfo {
                network: network.to_string(),
                latest_height,
            })),
            block_hashes: Arc::new(RwLock::new(HashMap::new())),
            receipts: Arc::new(RwLock::new(HashMap::new())),
            connected: Arc::new(RwLock::new(true)),
            fetch_failures: Arc::new(RwLock::new(HashMap::new())),
            fetch_calls: Arc::new(AtomicU64::new(0)),
            hash_calls: Arc::new(AtomicU64::new(0)),
            latency: Arc::new(RwLock::new(None)),
        }
    }

    /// Deterministic placeholder hash for a height.
    pub fn hash_for(height: u32) -> String {
        format!("{:064x}", height)
    }

    /// Register a block with its receipt payload.
    pub fn add_block(&self, height: u32, receipts: Value) {
        let hash = Self::hash_for(height);
        self.block_hashes.write().unwrap().insert(height, hash.clone());
        self.receipts.write().unwrap().insert(hash, receipts);
    }

    /// Register a block height whose receipt lookup returns nothing.
    pub fn add_empty_block(&self, height: u32) {
        self.block_hashes
            .write()
            .unwrap()
            .insert(height, Self::hash_for(height));
    }

    pub fn set_connected(&self, connected: bool) {
        *self.connected.write().unwrap() = connected;
    }

    /// Make the next `times` receipt fetches for `block_hash` fail.
    pub fn fail_fetches(&self, block_hash: &str, times: u32) {
        self.fetch_failures
            .write()
            .unwrap()
            .insert(block_hash.to_string(), times);
    }

    /// Add an artificial delay to hash and receipt lookups.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.write().unwrap() = Some(latency);
    }

    pub fn fetch_calls(&self) -> u64 {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn hash_calls(&self) -> u64 {
        self.hash_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let latency = *self.latency.read().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl IndexerApiAdapter for MockIndexerApi {
    async fn get_node_info(&self) -> CompareResult<ChainInfo> {
        if !*self.connected.read().unwrap() {
            return Err(CompareError::Network("endpoint not connected".to_string()));
        }
        Ok(self.chain_info.read().unwrap().clone())
    }

    async fn get_block_hash(&self, height: u32) -> CompareResult<String> {
        self.simulate_latency().await;
        self.hash_calls.fetch_add(1, Ordering::SeqCst);
        if !*self.connected.read().unwrap() {
            return Err(CompareError::Network("endpoint not connected".to_string()));
        }
        self.block_hashes
            .read()
            .unwrap()
            .get(&height)
            .cloned()
            .ok_or_else(|| CompareError::Api(format!("block {} not found", height)))
    }

    async fn fetch_block_receipts(&self, block_hash: &str) -> CompareResult<Value> {
        self.simulate_latency().await;
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if !*self.connected.read().unwrap() {
            return Err(CompareError::Network("endpoint not connected".to_string()));
        }
        {
            let mut failures = self.fetch_failures.write().unwrap();
            if let Some(remaining) = failures.get_mut(block_hash) {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(CompareError::Network(format!(
                        "injected failure for {}",
                        block_hash
                    )));
                }
            }
        }
        // An unregistered hash mirrors an endpoint with no data for the block.
        Ok(self
            .receipts
            .read()
            .unwrap()
            .get(block_hash)
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
