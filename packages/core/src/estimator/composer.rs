//! Tier Composer
//!
//! Combines the smoothed tip, congestion multiplier and surge-projected base
//! fee into one [`FeeEstimate`] per tier.

use crate::estimator::{
    error::EstimationError,
    smoother,
    surge,
    types::{
        CongestionState, FeeEstimate, FeeField, FeeHistoryBatch, MonotonicityViolation,
        TierDefinition,
    },
};

/// Output of a composition pass: estimates in tier order, plus any ordering
/// warnings found in them.
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub estimates: Vec<FeeEstimate>,
    pub warnings: Vec<MonotonicityViolation>,
}

pub struct TierComposer {
    tiers: Vec<TierDefinition>,
}

impl TierComposer {
    pub fn new(tiers: Vec<TierDefinition>) -> Self {
        Self { tiers }
    }

    pub fn compose(
        &self,
        batch: &FeeHistoryBatch,
        congestion: &CongestionState,
    ) -> Result<Composition, EstimationError> {
        let mut estimates = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            let smoothed = smoother::smoothed_priority_fee(batch, tier.percentile_index)?;
            let priority = (smoothed * congestion.multiplier).round() as u128;
            let base_component =
                surge::max_base_fee_component(batch.pending_base_fee, tier.surge_blocks)?;
            let max_fee = base_component.checked_add(priority).ok_or_else(|| {
                EstimationError::numerical_overflow(format!("max fee for tier {}", tier.name))
            })?;

            let percentile = batch
                .percentiles
                .get(tier.percentile_index)
                .map_or_else(|| "?".to_string(), |p| p.to_string());
            tracing::debug!(
                "Tier {} (p{}): smoothed tip {:.0}, priority {}, base component {}, max fee {}",
                tier.name,
                percentile,
                smoothed,
                priority,
                base_component,
                max_fee
            );

            estimates.push(FeeEstimate {
                tier_name: tier.name.clone(),
                max_fee_per_gas: max_fee,
                max_priority_fee_per_gas: priority,
                confidence_label: tier.label.clone(),
            });
        }

        let warnings = check_monotonicity(&estimates);
        for warning in &warnings {
            tracing::warn!(
                "{:?} decreases from {} ({}) to {} ({})",
                warning.field,
                warning.lower_tier,
                warning.lower_value,
                warning.upper_tier,
                warning.upper_value
            );
        }

        Ok(Composition { estimates, warnings })
    }
}

/// Every adjacent pair where the more urgent tier is cheaper. The estimates
/// themselves are never reordered or clamped.
pub fn check_monotonicity(estimates: &[FeeEstimate]) -> Vec<MonotonicityViolation> {
    let mut violations = Vec::new();

    for pair in estimates.windows(2) {
        let (lower, upper) = (&pair[0], &pair[1]);
        let fields = [
            (FeeField::MaxFeePerGas, lower.max_fee_per_gas, upper.max_fee_per_gas),
            (
                FeeField::MaxPriorityFeePerGas,
                lower.max_priority_fee_per_gas,
                upper.max_priority_fee_per_gas,
            ),
        ];

        for (field, lower_value, upper_value) in fields {
            if upper_value < lower_value {
                violations.push(MonotonicityViolation {
                    field,
                    lower_tier: lower.tier_name.clone(),
                    upper_tier: upper.tier_name.clone(),
                    lower_value,
                    upper_value,
                });
            }
        }
    }

    violations
}
