//! History Fetcher
//!
//! Issues the fee history query through a [`FeeHistoryProvider`], retries
//! transient transport failures with jittered exponential backoff, and turns
//! the raw response into a validated [`FeeHistoryBatch`].

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde_json::Value;

use crate::estimator::{
    config::{HistoryConfig, RetryConfig},
    error::{EstimationError, ProviderError},
    provider::{FeeHistoryProvider, FeeHistoryRequest, RawFeeHistory},
    types::{FeeHistoryBatch, FeeHistorySample},
};

/// Fetches and validates one fee history batch per call
pub struct HistoryFetcher {
    provider: Arc<dyn FeeHistoryProvider + Send + Sync>,
    history: HistoryConfig,
    retry: RetryConfig,
}

impl HistoryFetcher {
    pub fn new(
        provider: Arc<dyn FeeHistoryProvider + Send + Sync>,
        history: HistoryConfig,
        retry: RetryConfig,
    ) -> Self {
        Self {
            provider,
            history,
            retry,
        }
    }

    pub fn request(&self) -> FeeHistoryRequest {
        FeeHistoryRequest {
            block_count: self.history.block_count,
            reference_block: self.history.reference_block.clone(),
            reward_percentiles: self.history.reward_percentiles.clone(),
        }
    }

    /// Fetch a batch, retrying only transient transport failures.
    pub async fn fetch(&self) -> Result<FeeHistoryBatch, EstimationError> {
        let request = self.request();
        let raw = self.fetch_raw(&request).await?;
        normalize(raw, &request)
    }

    async fn fetch_raw(
        &self,
        request: &FeeHistoryRequest,
    ) -> Result<RawFeeHistory, EstimationError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.provider.fee_history(request).await {
                Ok(raw) => {
                    tracing::debug!(
                        "{} returned fee history on attempt {}",
                        self.provider.provider_name(),
                        attempt
                    );
                    return Ok(raw);
                }
                Err(ProviderError::FormatError { message }) => {
                    return Err(EstimationError::data_integrity(message));
                }
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    let delay =
                        self.retry.backoff_delay(attempt) + jitter(self.retry.base_delay_ms);
                    tracing::warn!(
                        "Fee history attempt {}/{} against {} failed: {}; retrying in {}ms",
                        attempt,
                        max_attempts,
                        self.provider.provider_name(),
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    return Err(EstimationError::transport(err.to_string(), attempt));
                }
            }
        }
    }
}

fn jitter(base_delay_ms: u64) -> Duration {
    if base_delay_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..base_delay_ms))
}

/// Validate a raw response against the request that produced it.
pub fn normalize(
    raw: RawFeeHistory,
    request: &FeeHistoryRequest,
) -> Result<FeeHistoryBatch, EstimationError> {
    let requested = usize::try_from(request.block_count)
        .map_err(|_| EstimationError::data_integrity("block count does not fit in memory"))?;
    let returned = raw.gas_used_ratio.len();

    if returned < requested {
        return Err(EstimationError::data_integrity(format!(
            "node returned {} blocks but {} were requested",
            returned, requested
        )));
    }
    if returned > requested {
        return Err(EstimationError::data_integrity(format!(
            "node returned {} gas used ratios for {} requested blocks",
            returned, requested
        )));
    }
    if raw.base_fee_per_gas.len() != requested + 1 {
        return Err(EstimationError::data_integrity(format!(
            "expected {} base fees (block count + 1), got {}",
            requested + 1,
            raw.base_fee_per_gas.len()
        )));
    }

    let percentile_count = request.reward_percentiles.len();
    let rewards = match raw.reward {
        Some(rows) => rows,
        None if percentile_count == 0 => vec![Vec::new(); requested],
        None => return Err(EstimationError::data_integrity("reward field is missing")),
    };
    if rewards.len() != requested {
        return Err(EstimationError::data_integrity(format!(
            "expected {} reward rows, got {}",
            requested,
            rewards.len()
        )));
    }

    let oldest_block = match raw.oldest_block {
        Some(ref value) => parse_quantity(value, "oldestBlock")?,
        None => return Err(EstimationError::data_integrity("oldestBlock is missing")),
    };
    let oldest_block = u64::try_from(oldest_block)
        .map_err(|_| EstimationError::data_integrity("oldestBlock exceeds u64"))?;

    let mut base_fees = Vec::with_capacity(raw.base_fee_per_gas.len());
    for (i, value) in raw.base_fee_per_gas.iter().enumerate() {
        base_fees.push(parse_quantity(value, &format!("baseFeePerGas[{}]", i))?);
    }

    let mut samples = Vec::with_capacity(requested);
    for (i, (ratio, row)) in raw.gas_used_ratio.iter().zip(rewards.iter()).enumerate() {
        if row.len() != percentile_count {
            return Err(EstimationError::data_integrity(format!(
                "reward row {} has {} entries, expected {}",
                i,
                row.len(),
                percentile_count
            )));
        }
        let rewards = row
            .iter()
            .enumerate()
            .map(|(j, v)| parse_quantity(v, &format!("reward[{}][{}]", i, j)))
            .collect::<Result<Vec<_>, _>>()?;

        let block_number = oldest_block
            .checked_add(i as u64)
            .ok_or_else(|| EstimationError::data_integrity("block number overflow"))?;

        samples.push(FeeHistorySample {
            block_number,
            base_fee_per_gas: base_fees[i],
            gas_used_ratio: parse_ratio(ratio, i)?,
            rewards,
        });
    }

    Ok(FeeHistoryBatch {
        samples,
        pending_base_fee: base_fees[requested],
        percentiles: request.reward_percentiles.clone(),
    })
}

/// Parse a wei quantity sent either as a `0x` hex string or a JSON integer.
fn parse_quantity(value: &Value, field: &str) -> Result<u128, EstimationError> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if s.starts_with('-') {
                return Err(EstimationError::data_integrity(format!(
                    "{} is negative: {}",
                    field, s
                )));
            }
            let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => (hex, 16),
                None => (s, 10),
            };
            // from_str_radix tolerates a leading '+'; quantities are bare digits.
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return Err(EstimationError::data_integrity(format!(
                    "{} is not a quantity: '{}'",
                    field, s
                )));
            }
            u128::from_str_radix(digits, radix).map_err(|e| {
                EstimationError::data_integrity(format!(
                    "{} is not a quantity ('{}'): {}",
                    field, s, e
                ))
            })
        }
        Value::Number(n) => {
            if let Some(v) = n.as_u64() {
                Ok(v as u128)
            } else if n.as_i64().is_some() {
                Err(EstimationError::data_integrity(format!("{} is negative: {}", field, n)))
            } else {
                Err(EstimationError::data_integrity(format!(
                    "{} is not an integer: {}",
                    field, n
                )))
            }
        }
        Value::Null => Err(EstimationError::data_integrity(format!("{} is missing", field))),
        other => Err(EstimationError::data_integrity(format!(
            "{} has unexpected type: {}",
            field, other
        ))),
    }
}

fn parse_ratio(value: &Value, index: usize) -> Result<f64, EstimationError> {
    let ratio = value.as_f64().ok_or_else(|| {
        EstimationError::data_integrity(format!(
            "gasUsedRatio[{}] is not a number: {}",
            index, value
        ))
    })?;
    if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
        return Err(EstimationError::data_integrity(format!(
            "gasUsedRatio[{}] out of range: {}",
            index, ratio
        )));
    }
    Ok(ratio)
}
