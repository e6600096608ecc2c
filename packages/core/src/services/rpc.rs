use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use crate::estimator::{
    error::ProviderError,
    provider::{FeeHistoryProvider, FeeHistoryRequest, ProviderResult, RawFeeHistory},
};

/// JSON-RPC code some providers use for request throttling.
const RPC_LIMIT_EXCEEDED: i64 = -32005;

/// Minimal JSON-RPC client for an EVM node.
#[derive(Clone)]
pub struct RpcClient {
    url: String,
    http: Client,
}

impl RpcClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::NetworkError {
                message: format!("failed to build HTTP client: {}", err),
            })?;

        Ok(Self { url, http })
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<RawFeeHistory>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcClient {
    async fn fetch_fee_history(
        &self,
        request: &FeeHistoryRequest,
    ) -> ProviderResult<RawFeeHistory> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": "eth_feeHistory",
            "params": [
                format!("{:#x}", request.block_count),
                request.reference_block,
                request.reward_percentiles,
            ],
            "id": 1
        });

        let response = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimitExceeded);
        }
        if status.is_server_error() {
            return Err(ProviderError::ServiceUnavailable { status: status.as_u16() });
        }
        if !status.is_success() {
            return Err(ProviderError::HttpError { status: status.as_u16() });
        }

        let body = response
            .json::<RpcResponse>()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::FormatError { message: err.to_string() }
                }
            })?;

        if let Some(error) = body.error {
            if error.code == RPC_LIMIT_EXCEEDED {
                return Err(ProviderError::RateLimitExceeded);
            }
            return Err(ProviderError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        body.result.ok_or_else(|| ProviderError::FormatError {
            message: "response has neither result nor error".to_string(),
        })
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::NetworkError { message: err.to_string() }
    }
}

#[async_trait]
impl FeeHistoryProvider for RpcClient {
    async fn fee_history(&self, request: &FeeHistoryRequest) -> ProviderResult<RawFeeHistory> {
        self.fetch_fee_history(request).await
    }

    fn provider_name(&self) -> &str {
        "JSON-RPC"
    }
}
