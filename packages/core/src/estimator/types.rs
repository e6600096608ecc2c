//! Core data types for fee estimation

use serde::{Deserialize, Serialize};

/// One confirmed block from an `eth_feeHistory` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeHistorySample {
    pub block_number: u64,
    /// Base fee in wei.
    pub base_fee_per_gas: u128,
    /// Fraction of the block's gas limit consumed, in `[0, 1]`.
    pub gas_used_ratio: f64,
    /// Tip at each requested percentile, in request order.
    pub rewards: Vec<u128>,
}

/// A validated fee history response.
///
/// The node returns one more base fee than block count; that trailing entry
/// is the protocol-computed base fee of the next block and lives in
/// `pending_base_fee` rather than in `samples`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeHistoryBatch {
    pub samples: Vec<FeeHistorySample>,
    pub pending_base_fee: u128,
    pub percentiles: Vec<f64>,
}

impl FeeHistoryBatch {
    /// Base fees of the confirmed blocks, oldest first.
    pub fn confirmed_base_fees(&self) -> Vec<u128> {
        self.samples.iter().map(|s| s.base_fee_per_gas).collect()
    }

    pub fn latest_block(&self) -> Option<u64> {
        self.samples.last().map(|s| s.block_number)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Static description of one urgency tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub name: String,
    /// Position into each sample's `rewards`.
    pub percentile_index: usize,
    /// Number of consecutive maximal base-fee increases to hedge against.
    pub surge_blocks: u32,
    pub label: String,
}

impl TierDefinition {
    pub fn new(
        name: impl Into<String>,
        percentile_index: usize,
        surge_blocks: u32,
        label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            percentile_index,
            surge_blocks,
            label: label.into(),
        }
    }
}

/// Congestion classification for the sampled window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CongestionMode {
    Discount,
    Neutral,
    Surge,
}

/// Utilisation trend and the tip multiplier it maps to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CongestionState {
    pub moving_average_ratio: f64,
    pub mode: CongestionMode,
    pub multiplier: f64,
}

/// Direction of recent confirmed base fees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaseFeeTrend {
    Rising,
    Falling,
    Flat,
}

/// Fee recommendation for a single tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub tier_name: String,
    pub max_fee_per_gas: u128,
    pub max_priority_fee_per_gas: u128,
    pub confidence_label: String,
}

/// Which output field broke tier ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeField {
    MaxFeePerGas,
    MaxPriorityFeePerGas,
}

/// Non-fatal warning: a more urgent tier came out cheaper than the tier
/// before it. Results are left exactly as computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonotonicityViolation {
    pub field: FeeField,
    pub lower_tier: String,
    pub upper_tier: String,
    pub lower_value: u128,
    pub upper_value: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PanicMode {
    Normal,
    Panic,
}

/// Outcome of the consecutive-spike check on one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanicState {
    pub mode: PanicMode,
    /// Longest run of qualifying block-to-block increases in the batch.
    pub longest_run: usize,
}

impl PanicState {
    pub fn is_panic(&self) -> bool {
        self.mode == PanicMode::Panic
    }
}

/// Everything one estimation call produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateReport {
    /// One entry per configured tier, in tier order.
    pub estimates: Vec<FeeEstimate>,
    pub congestion: CongestionState,
    pub panic: PanicState,
    pub requested_tier: String,
    pub selected_tier: String,
    pub panic_adjusted: bool,
    pub warnings: Vec<MonotonicityViolation>,
    /// Pending-block base fee used as the surge projection anchor.
    pub anchor_base_fee: u128,
    pub base_fee_trend: BaseFeeTrend,
    pub latest_block: Option<u64>,
}

impl EstimateReport {
    pub fn selected(&self) -> Option<&FeeEstimate> {
        self.estimate_for(&self.selected_tier)
    }

    pub fn estimate_for(&self, tier_name: &str) -> Option<&FeeEstimate> {
        self.estimates.iter().find(|e| e.tier_name == tier_name)
    }
}
