//! Configuration for the fee estimation engine

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::estimator::{error::EstimationError, types::TierDefinition};

/// Configuration for the fee estimation engine.
///
/// Passed to the engine at construction; engines pointed at different
/// networks each own their copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub rpc: RpcConfig,
    pub history: HistoryConfig,
    pub congestion: CongestionConfig,
    pub panic: PanicConfig,
    /// Ordered by increasing urgency.
    pub tiers: Vec<TierDefinition>,
}

/// Node endpoint and transport policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub retry: RetryConfig,
}

/// Bounded exponential backoff for transient transport failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

/// What to ask `eth_feeHistory` for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub block_count: u64,
    pub reference_block: String,
    /// Ascending, each in `[0, 100]`.
    pub reward_percentiles: Vec<f64>,
}

/// Utilisation thresholds (exclusive) and the multipliers they select
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CongestionConfig {
    pub discount_threshold: f64,
    pub surge_threshold: f64,
    pub discount_multiplier: f64,
    pub surge_multiplier: f64,
}

/// Consecutive base-fee spike detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanicConfig {
    /// Fractional block-to-block increase that counts as a spike (0.10 = 10%).
    pub increase_threshold: f64,
    pub consecutive_blocks: usize,
    /// Minimum tier selected while in panic.
    pub floor_tier: String,
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), without jitter.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl EstimatorConfig {
    /// Default configuration pointed at `url`.
    pub fn for_endpoint(url: impl Into<String>) -> Self {
        Self {
            rpc: RpcConfig {
                url: url.into(),
                ..RpcConfig::default()
            },
            ..Self::default()
        }
    }

    pub fn tier_position(&self, name: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Reject configurations the engine cannot compute over.
    pub fn validate(&self) -> Result<(), EstimationError> {
        let history = &self.history;
        if history.block_count == 0 {
            return Err(EstimationError::config_error("block count must be at least 1"));
        }
        if history.reward_percentiles.is_empty() {
            return Err(EstimationError::config_error("reward percentile list is empty"));
        }
        if history
            .reward_percentiles
            .iter()
            .any(|p| !p.is_finite() || *p < 0.0 || *p > 100.0)
        {
            return Err(EstimationError::config_error(
                "reward percentiles must be within [0, 100]",
            ));
        }
        if history.reward_percentiles.windows(2).any(|w| w[0] > w[1]) {
            return Err(EstimationError::config_error(
                "reward percentiles must be in ascending order",
            ));
        }

        let congestion = &self.congestion;
        for threshold in [congestion.discount_threshold, congestion.surge_threshold] {
            if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
                return Err(EstimationError::config_error(format!(
                    "congestion threshold {} must be within [0, 1]",
                    threshold
                )));
            }
        }
        if congestion.discount_threshold > congestion.surge_threshold {
            return Err(EstimationError::config_error(format!(
                "discount threshold {} exceeds surge threshold {}",
                congestion.discount_threshold, congestion.surge_threshold
            )));
        }
        if [congestion.discount_multiplier, congestion.surge_multiplier]
            .iter()
            .any(|m| !m.is_finite() || *m <= 0.0)
        {
            return Err(EstimationError::config_error(
                "congestion multipliers must be positive and finite",
            ));
        }

        if self.tiers.is_empty() {
            return Err(EstimationError::config_error("at least one tier is required"));
        }
        let mut seen = HashSet::new();
        for tier in &self.tiers {
            if !seen.insert(tier.name.to_ascii_lowercase()) {
                return Err(EstimationError::config_error(format!(
                    "duplicate tier name '{}'",
                    tier.name
                )));
            }
            if tier.surge_blocks == 0 {
                return Err(EstimationError::config_error(format!(
                    "tier '{}' must hedge at least one surge block",
                    tier.name
                )));
            }
            if tier.percentile_index >= history.reward_percentiles.len() {
                return Err(EstimationError::config_error(format!(
                    "tier '{}' uses percentile index {} but only {} percentiles are requested",
                    tier.name,
                    tier.percentile_index,
                    history.reward_percentiles.len()
                )));
            }
        }

        let increase = self.panic.increase_threshold;
        if !increase.is_finite() || increase < 0.0 {
            return Err(EstimationError::config_error(format!(
                "panic increase threshold {} must be a non-negative number",
                increase
            )));
        }
        if self.panic.consecutive_blocks == 0 {
            return Err(EstimationError::config_error(
                "panic run length must be at least 1",
            ));
        }
        if self.tier_position(&self.panic.floor_tier).is_none() {
            return Err(EstimationError::config_error(format!(
                "panic floor tier '{}' is not a configured tier",
                self.panic.floor_tier
            )));
        }
        if self.rpc.retry.max_attempts == 0 {
            return Err(EstimationError::config_error("retry attempts must be at least 1"));
        }

        Ok(())
    }
}

/// The stock four-tier ladder over percentiles 30/60/75/90.
pub fn default_tiers() -> Vec<TierDefinition> {
    vec![
        TierDefinition::new("Saver", 0, 2, "~3 mins"),
        TierDefinition::new("Standard", 1, 4, "<30 secs"),
        TierDefinition::new("Recommended", 2, 6, "<10 secs"),
        TierDefinition::new("Urgent", 3, 10, "<5 secs"),
    ]
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            rpc: RpcConfig::default(),
            history: HistoryConfig::default(),
            congestion: CongestionConfig::default(),
            panic: PanicConfig::default(),
            tiers: default_tiers(),
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8545".to_string(),
            timeout_seconds: 10,
            retry: RetryConfig::default(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            block_count: 10,
            reference_block: "latest".to_string(),
            reward_percentiles: vec![30.0, 60.0, 75.0, 90.0],
        }
    }
}

impl Default for CongestionConfig {
    fn default() -> Self {
        Self {
            discount_threshold: 0.45,
            surge_threshold: 0.80,
            discount_multiplier: 0.95,
            surge_multiplier: 1.25,
        }
    }
}

impl Default for PanicConfig {
    fn default() -> Self {
        Self {
            increase_threshold: 0.10,
            consecutive_blocks: 3,
            floor_tier: "Urgent".to_string(),
        }
    }
}
