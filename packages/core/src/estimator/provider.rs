//! Fee History Provider Interface
//!
//! Abstracts the single `eth_feeHistory` call so the engine can run against
//! a live node or a scripted mock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::estimator::error::ProviderError;

/// The `result` object of an `eth_feeHistory` response, as sent by the node.
///
/// Fields are kept as raw JSON values; `fetcher::normalize` is the only place
/// that decides whether they are well-formed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFeeHistory {
    #[serde(default)]
    pub oldest_block: Option<Value>,
    #[serde(default)]
    pub base_fee_per_gas: Vec<Value>,
    #[serde(default)]
    pub gas_used_ratio: Vec<Value>,
    #[serde(default)]
    pub reward: Option<Vec<Vec<Value>>>,
}

/// Parameters of one fee history query
#[derive(Debug, Clone, PartialEq)]
pub struct FeeHistoryRequest {
    pub block_count: u64,
    pub reference_block: String,
    pub reward_percentiles: Vec<f64>,
}

/// Trait for fee history sources
#[async_trait]
pub trait FeeHistoryProvider {
    /// Issue one fee history query. Implementations must not retry; the
    /// fetcher owns the retry policy.
    async fn fee_history(
        &self,
        request: &FeeHistoryRequest,
    ) -> Result<RawFeeHistory, ProviderError>;

    /// Get the name of this provider for logging/debugging
    fn provider_name(&self) -> &str;
}

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;
