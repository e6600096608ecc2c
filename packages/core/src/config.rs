use std::env;
use std::str::FromStr;

use crate::cli::Cli;
use crate::estimator::EstimatorConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub estimator: EstimatorConfig,
    pub requested_tier: String,
    pub transfer_gas_limit: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup("RPC_URL")
            .or_else(|| lookup("SEPOLIA_RPC_URL"))
            .ok_or("RPC_URL is required")?;

        let mut estimator = EstimatorConfig::for_endpoint(rpc_url);

        let history = &mut estimator.history;
        history.block_count = parse_or(&lookup, "BLOCK_COUNT", history.block_count)?;
        if let Some(reference) = lookup("REFERENCE_BLOCK") {
            history.reference_block = reference;
        }
        if let Some(raw) = lookup("REWARD_PERCENTILES") {
            history.reward_percentiles = parse_list("REWARD_PERCENTILES", &raw)?;
        }

        let congestion = &mut estimator.congestion;
        congestion.discount_threshold = parse_or(
            &lookup,
            "CONGESTION_DISCOUNT_THRESHOLD",
            congestion.discount_threshold,
        )?;
        congestion.surge_threshold =
            parse_or(&lookup, "CONGESTION_SURGE_THRESHOLD", congestion.surge_threshold)?;
        congestion.discount_multiplier = parse_or(
            &lookup,
            "CONGESTION_DISCOUNT_MULTIPLIER",
            congestion.discount_multiplier,
        )?;
        congestion.surge_multiplier =
            parse_or(&lookup, "CONGESTION_SURGE_MULTIPLIER", congestion.surge_multiplier)?;

        if let Some(raw) = lookup("TIER_SURGE_BLOCKS") {
            let blocks: Vec<u32> = parse_list("TIER_SURGE_BLOCKS", &raw)?;
            if blocks.len() != estimator.tiers.len() {
                return Err(format!(
                    "TIER_SURGE_BLOCKS must list {} values, got {}",
                    estimator.tiers.len(),
                    blocks.len()
                ));
            }
            for (tier, k) in estimator.tiers.iter_mut().zip(blocks) {
                tier.surge_blocks = k;
            }
        }

        let panic = &mut estimator.panic;
        panic.increase_threshold =
            parse_or(&lookup, "PANIC_INCREASE_THRESHOLD", panic.increase_threshold)?;
        panic.consecutive_blocks =
            parse_or(&lookup, "PANIC_CONSECUTIVE_BLOCKS", panic.consecutive_blocks)?;

        let rpc = &mut estimator.rpc;
        rpc.timeout_seconds = parse_or(&lookup, "RPC_TIMEOUT_SECONDS", rpc.timeout_seconds)?;
        rpc.retry.max_attempts = parse_or(&lookup, "RPC_MAX_ATTEMPTS", rpc.retry.max_attempts)?;
        rpc.retry.base_delay_ms =
            parse_or(&lookup, "RPC_RETRY_BASE_DELAY_MS", rpc.retry.base_delay_ms)?;

        let requested_tier = lookup("FEE_TIER").unwrap_or_else(|| "Recommended".to_string());
        let transfer_gas_limit = parse_or(&lookup, "TRANSFER_GAS_LIMIT", 21_000u64)?;

        Ok(Self {
            estimator,
            requested_tier,
            transfer_gas_limit,
        })
    }

    /// Command-line flags take precedence over the environment.
    pub fn apply_cli(&mut self, cli: &Cli) -> Result<(), String> {
        if let Some(url) = &cli.rpc_url {
            self.estimator.rpc.url = url.clone();
        }
        if let Some(block_count) = cli.block_count {
            self.estimator.history.block_count = block_count;
        }
        if let Some(raw) = &cli.percentiles {
            self.estimator.history.reward_percentiles = parse_list("--percentiles", raw)?;
        }
        if let Some(tier) = &cli.tier {
            self.requested_tier = tier.clone();
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

fn parse_list<T: FromStr>(key: &str, raw: &str) -> Result<Vec<T>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| format!("{} contains an invalid value: {}", key, s))
        })
        .collect()
}
