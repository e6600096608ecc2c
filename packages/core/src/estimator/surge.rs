//! Base-Fee Surge Projector
//!
//! The base fee can rise by at most 1/8 (12.5%) per block, so after `k` full
//! blocks it is bounded by `anchor * (9/8)^k`. The bound is evaluated in exact
//! integer arithmetic and rounded up, so it is never below the true ceiling.

use crate::estimator::{
    error::EstimationError,
    types::{BaseFeeTrend, FeeHistoryBatch},
};

/// Maximum per-block base fee change is `1 / BASE_FEE_MAX_CHANGE_DENOMINATOR`.
pub const BASE_FEE_MAX_CHANGE_DENOMINATOR: u128 = 8;

/// Number of most recent confirmed blocks the trend indicator looks at.
pub const TREND_WINDOW: usize = 5;

/// Worst-case base fee after `surge_blocks` consecutive full blocks.
pub fn max_base_fee_component(anchor: u128, surge_blocks: u32) -> Result<u128, EstimationError> {
    let overflow = || {
        EstimationError::numerical_overflow(format!(
            "base fee projection of {} over {} blocks",
            anchor, surge_blocks
        ))
    };

    let denominator = BASE_FEE_MAX_CHANGE_DENOMINATOR
        .checked_pow(surge_blocks)
        .ok_or_else(overflow)?;
    let numerator = (BASE_FEE_MAX_CHANGE_DENOMINATOR + 1)
        .checked_pow(surge_blocks)
        .ok_or_else(overflow)?;
    let scaled = anchor.checked_mul(numerator).ok_or_else(overflow)?;

    let quotient = scaled / denominator;
    if scaled % denominator == 0 {
        Ok(quotient)
    } else {
        Ok(quotient + 1)
    }
}

/// Compare the first and last of the most recent confirmed base fees.
pub fn base_fee_trend(batch: &FeeHistoryBatch) -> BaseFeeTrend {
    let fees = batch.confirmed_base_fees();
    let window = &fees[fees.len().saturating_sub(TREND_WINDOW)..];

    match (window.first(), window.last()) {
        (Some(first), Some(last)) if last > first => BaseFeeTrend::Rising,
        (Some(first), Some(last)) if last < first => BaseFeeTrend::Falling,
        _ => BaseFeeTrend::Flat,
    }
}
