//! DAS (Digital Asset Standard) indexer client
//!
//! JSON-RPC 2.0 over HTTP. Only the three read methods the engine consumes
//! are modeled: `getAssetsByOwner`, `getAssetProof`, `getAsset`. The
//! [`DasApi`] trait is the seam the oracle, resolver and reconciler are
//! written against, so tests substitute scripted fakes.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{ChainError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct AssetOwnership {
    pub owner: String,
    #[serde(default)]
    pub delegate: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetCompression {
    #[serde(default)]
    pub compressed: bool,
    #[serde(default)]
    pub tree: Option<String>,
    #[serde(default)]
    pub data_hash: Option<String>,
    #[serde(default)]
    pub creator_hash: Option<String>,
    #[serde(default)]
    pub leaf_id: u64,
}

/// One asset as the indexer reports it. Transient: fetched on demand and
/// never cached beyond a single request or reconciliation pass.
#[derive(Debug, Clone, Deserialize)]
pub struct AssetItem {
    pub id: String,
    pub ownership: AssetOwnership,
    pub compression: AssetCompression,
    #[serde(default)]
    pub burnt: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetPage {
    #[serde(default)]
    pub total: u64,
    pub limit: u64,
    pub page: u64,
    pub items: Vec<AssetItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetProof {
    pub root: String,
    pub proof: Vec<String>,
    #[serde(default)]
    pub node_index: u64,
    #[serde(default)]
    pub leaf: String,
    pub tree_id: String,
}

/// Narrow read interface over the indexer.
#[async_trait]
pub trait DasApi: Send + Sync {
    async fn assets_by_owner(&self, owner: &str, page: u64, limit: u64) -> Result<AssetPage>;
    async fn asset_proof(&self, asset_id: &str) -> Result<AssetProof>;
    async fn asset(&self, asset_id: &str) -> Result<AssetItem>;
}

#[derive(Debug, Clone, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

pub struct DasClient {
    url: String,
    client: reqwest::Client,
}

impl DasClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        debug!("DAS request {} -> {}", method, self.url);
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Das(format!("{method}: {e}")))?;

        let parsed: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| ChainError::Das(format!("{method}: invalid response: {e}")))?;

        if let Some(err) = parsed.error {
            return Err(ChainError::Das(format!(
                "{method}: indexer error {}: {}",
                err.code, err.message
            )));
        }
        parsed
            .result
            .ok_or_else(|| ChainError::Das(format!("{method}: empty result")))
    }
}

#[async_trait]
impl DasApi for DasClient {
    async fn assets_by_owner(&self, owner: &str, page: u64, limit: u64) -> Result<AssetPage> {
        self.call(
            "getAssetsByOwner",
            json!({ "ownerAddress": owner, "page": page, "limit": limit }),
        )
        .await
    }

    async fn asset_proof(&self, asset_id: &str) -> Result<AssetProof> {
        self.call("getAssetProof", json!({ "id": asset_id })).await
    }

    async fn asset(&self, asset_id: &str) -> Result<AssetItem> {
        self.call("getAsset", json!({ "id": asset_id })).await
    }
}
