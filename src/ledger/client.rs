use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{AppResult, NodeError};
use crate::ledger::models::{PromoteOptions, SpamTransfer, Transaction};

/// Remote ledger node operations consumed by the promoter.
///
/// Implementations must be safe to share across the run; the orchestrator
/// switches the endpoint between bundles via `switch_endpoint`.
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// All transactions belonging to a bundle hash.
    async fn find_transaction_objects(&self, bundle_hash: &str) -> AppResult<Vec<Transaction>>;

    /// Inclusion states aligned by position with the input hashes.
    async fn get_latest_inclusion(&self, tail_hashes: &[String]) -> AppResult<Vec<bool>>;

    /// Whether the tail is consistent with the node's current consensus view.
    async fn is_promotable(&self, tail_hash: &str) -> AppResult<bool>;

    /// Attach a zero-value transfer referencing the tail.
    async fn promote(
        &self,
        tail_hash: &str,
        depth: u8,
        min_weight_magnitude: u8,
        transfer: &SpamTransfer,
        options: PromoteOptions,
    ) -> AppResult<()>;

    /// Re-issue the whole bundle as a fresh attachment.
    async fn replay(&self, tail_hash: &str, depth: u8, min_weight_magnitude: u8) -> AppResult<()>;

    /// Point subsequent calls at a different node.
    fn switch_endpoint(&self, url: &str);

    fn endpoint(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct InclusionResponse {
    states: Vec<bool>,
}

#[derive(Debug, Deserialize)]
struct ConsistencyResponse {
    state: bool,
}

#[derive(Debug, Deserialize)]
struct EmptyResponse {}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// `NodeClient` speaking the node's JSON command API over HTTP.
pub struct HttpNodeClient {
    http: reqwest::Client,
    endpoint: RwLock<String>,
}

impl HttpNodeClient {
    pub fn new(endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: RwLock::new(endpoint),
        }
    }

    async fn call<R: DeserializeOwned>(
        &self,
        command: &str,
        body: serde_json::Value,
    ) -> Result<R, NodeError> {
        let endpoint = self.endpoint.read().clone();
        debug!("→ {} {}", endpoint, command);

        let response = self
            .http
            .post(&endpoint)
            .header("X-IOTA-API-Version", "1")
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            response
                .json::<R>()
                .await
                .map_err(|e| NodeError::BadResponse {
                    command: command.to_string(),
                    message: e.to_string(),
                })
        } else {
            let message = match response.json::<ApiErrorBody>().await {
                Ok(body) => body.error,
                Err(e) => format!("undecodable error body: {}", e),
            };
            Err(NodeError::Api {
                command: command.to_string(),
                message,
            })
        }
    }
}

#[async_trait]
impl NodeClient for HttpNodeClient {
    async fn find_transaction_objects(&self, bundle_hash: &str) -> AppResult<Vec<Transaction>> {
        let response: TransactionsResponse = self
            .call(
                "findTransactionObjects",
                json!({
                    "command": "findTransactionObjects",
                    "bundles": [bundle_hash],
                }),
            )
            .await?;
        Ok(response.transactions)
    }

    async fn get_latest_inclusion(&self, tail_hashes: &[String]) -> AppResult<Vec<bool>> {
        let response: InclusionResponse = self
            .call(
                "getLatestInclusion",
                json!({
                    "command": "getLatestInclusion",
                    "hashes": tail_hashes,
                }),
            )
            .await?;
        Ok(response.states)
    }

    async fn is_promotable(&self, tail_hash: &str) -> AppResult<bool> {
        let response: ConsistencyResponse = self
            .call(
                "checkConsistency",
                json!({
                    "command": "checkConsistency",
                    "tails": [tail_hash],
                }),
            )
            .await?;
        Ok(response.state)
    }

    async fn promote(
        &self,
        tail_hash: &str,
        depth: u8,
        min_weight_magnitude: u8,
        transfer: &SpamTransfer,
        options: PromoteOptions,
    ) -> AppResult<()> {
        let _: EmptyResponse = self
            .call(
                "promoteTransaction",
                json!({
                    "command": "promoteTransaction",
                    "tail": tail_hash,
                    "depth": depth,
                    "minWeightMagnitude": min_weight_magnitude,
                    "transfers": [transfer],
                    "delay": options.delay,
                    "interrupt": options.interrupt,
                }),
            )
            .await?;
        Ok(())
    }

    async fn replay(&self, tail_hash: &str, depth: u8, min_weight_magnitude: u8) -> AppResult<()> {
        let _: EmptyResponse = self
            .call(
                "replayBundle",
                json!({
                    "command": "replayBundle",
                    "tail": tail_hash,
                    "depth": depth,
                    "minWeightMagnitude": min_weight_magnitude,
                }),
            )
            .await?;
        Ok(())
    }

    fn switch_endpoint(&self, url: &str) {
        *self.endpoint.write() = url.to_string();
    }

    fn endpoint(&self) -> String {
        self.endpoint.read().clone()
    }
}

/// Serialize-only sanity checks; wire behavior is covered by the scripted
/// mock in `ledger::testing`.
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_switch_is_visible_to_subsequent_calls() {
        let client = HttpNodeClient::new("https://node-a.example".to_string());
        assert_eq!(client.endpoint(), "https://node-a.example");

        client.switch_endpoint("https://node-b.example");
        assert_eq!(client.endpoint(), "https://node-b.example");
    }

    #[test]
    fn promotion_transfer_serializes_with_zero_value() {
        let transfer = SpamTransfer::promotion();
        let value = serde_json::to_value(&transfer).unwrap();
        assert_eq!(value["value"], 0);
        assert_eq!(value["message"], "");
        assert_eq!(value["address"].as_str().unwrap().len(), 81);
    }
}
