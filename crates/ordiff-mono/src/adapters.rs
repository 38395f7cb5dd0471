//! HTTP adapter implementing the engine's endpoint contract.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use ordiff_compare::{ChainInfo, CompareError, CompareResult, IndexerApiAdapter, Protocol};

const NODE_INFO_TIMEOUT: Duration = Duration::from_secs(10);
const BLOCK_HASH_TIMEOUT: Duration = Duration::from_secs(5);
const RECEIPTS_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct NodeInfoResponse {
    #[serde(default)]
    data: NodeInfoData,
}

#[derive(Deserialize, Default)]
struct NodeInfoData {
    #[serde(rename = "chainInfo")]
    chain_info: Option<ChainInfo>,
}

#[derive(Deserialize)]
struct ReceiptsResponse {
    // Null when the endpoint has no data for the block.
    #[serde(default)]
    data: Value,
}

/// Indexer endpoint client over the REST surface shared by ordinals/BRC20
/// indexer deployments.
#[derive(Clone)]
pub struct HttpIndexerApi {
    base_url: String,
    protocol: Protocol,
    client: Client,
}

impl HttpIndexerApi {
    pub fn new(base_url: &str, protocol: Protocol) -> CompareResult<Self> {
        // Indexer deployments frequently sit behind self-signed TLS, so
        // certificate verification is skipped.
        let client = Client::builder()
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|err| {
                CompareError::Config(format!("failed to build HTTP client: {}", err))
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            protocol,
            client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
        desc: &str,
    ) -> CompareResult<T> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| {
                debug!("request error fetching {}: {}, URL: {}", desc, err, url);
                CompareError::Network(format!("request error fetching {}: {}", desc, err))
            })?
            .error_for_status()
            .map_err(|err| {
                debug!("HTTP error fetching {}: {}, URL: {}", desc, err, url);
                CompareError::Api(format!("HTTP error fetching {}: {}", desc, err))
            })?;
        response.json::<T>().await.map_err(|err| {
            CompareError::Serialization(format!("invalid JSON fetching {}: {}", desc, err))
        })
    }
}

#[async_trait]
impl IndexerApiAdapter for HttpIndexerApi {
    async fn get_node_info(&self) -> CompareResult<ChainInfo> {
        let url = format!("{}/api/v1/node/info", self.base_url);
        let response: NodeInfoResponse =
            self.get_json(&url, NODE_INFO_TIMEOUT, "node info").await?;
        let mut info = response.data.chain_info.ok_or_else(|| {
            CompareError::Api(format!("node info response missing chainInfo, URL: {}", url))
        })?;
        // Some deployments report "mainnet" where the chain name is expected.
        if info.network == "mainnet" {
            info.network = "bitcoin".to_string();
        }
        Ok(info)
    }

    async fn get_block_hash(&self, height: u32) -> CompareResult<String> {
        let url = format!("{}/blockhash/{}", self.base_url, height);
        let response = self
            .client
            .get(&url)
            .timeout(BLOCK_HASH_TIMEOUT)
            .send()
            .await
            .map_err(|err| {
                debug!(
                    "error fetching block hash for height {}: {}, URL: {}",
                    height, err, url
                );
                CompareError::Network(format!(
                    "request error fetching block hash for height {}: {}",
                    height, err
                ))
            })?
            .error_for_status()
            .map_err(|err| {
                CompareError::Api(format!(
                    "HTTP error fetching block hash for height {}: {}",
                    height, err
                ))
            })?;
        let text = response.text().await.map_err(|err| {
            CompareError::Network(format!(
                "error reading block hash for height {}: {}",
                height, err
            ))
        })?;
        Ok(text.trim().to_string())
    }

    async fn fetch_block_receipts(&self, block_hash: &str) -> CompareResult<Value> {
        let url = format!(
            "{}/api/v1/{}/block/{}/events",
            self.base_url,
            self.protocol.receipt_path_segment(),
            block_hash
        );
        let desc = format!("{} block receipts", self.protocol);
        let response: ReceiptsResponse = self.get_json(&url, RECEIPTS_TIMEOUT, &desc).await?;
        Ok(response.data)
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}
