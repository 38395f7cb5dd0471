//! Adapter trait over an indexer endpoint.
//!
//! The comparison engine only talks to endpoints through this trait, so the
//! HTTP transport stays pluggable and tests can run against in-memory mocks.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::CompareResult;
use crate::types::ChainInfo;

/// Read-only query interface of one indexer endpoint.
///
/// Implementations perform a single attempt per call; retry is the caller's
/// responsibility. All methods may be invoked concurrently from many tasks.
#[async_trait]
pub trait IndexerApiAdapter: Send + Sync {
    /// Fetch the endpoint's chain metadata (network identity, latest
    /// fully-indexed height).
    async fn get_node_info(&self) -> CompareResult<ChainInfo>;

    /// Resolve the block hash for a height on the endpoint's active chain.
    async fn get_block_hash(&self, height: u32) -> CompareResult<String>;

    /// Fetch the raw, un-normalized receipt tree for a block.
    async fn fetch_block_receipts(&self, block_hash: &str) -> CompareResult<Value>;

    /// Endpoint identity used for log context.
    fn endpoint(&self) -> &str;
}
