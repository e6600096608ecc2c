//! Congestion Analyzer

use crate::estimator::{
    config::CongestionConfig,
    error::EstimationError,
    types::{CongestionMode, CongestionState, FeeHistoryBatch},
};

/// Maps average block utilisation to a tip multiplier
pub struct CongestionAnalyzer {
    config: CongestionConfig,
}

impl CongestionAnalyzer {
    pub fn new(config: CongestionConfig) -> Self {
        Self { config }
    }

    pub fn analyze(&self, batch: &FeeHistoryBatch) -> Result<CongestionState, EstimationError> {
        if batch.is_empty() {
            return Err(EstimationError::insufficient_data(
                "congestion average over an empty batch",
            ));
        }

        let total: f64 = batch.samples.iter().map(|s| s.gas_used_ratio).sum();
        Ok(self.classify(total / batch.len() as f64))
    }

    /// Thresholds are exclusive: a mean exactly on either one is Neutral.
    pub fn classify(&self, moving_average_ratio: f64) -> CongestionState {
        let (mode, multiplier) = if moving_average_ratio < self.config.discount_threshold {
            (CongestionMode::Discount, self.config.discount_multiplier)
        } else if moving_average_ratio > self.config.surge_threshold {
            (CongestionMode::Surge, self.config.surge_multiplier)
        } else {
            (CongestionMode::Neutral, 1.0)
        };

        CongestionState {
            moving_average_ratio,
            mode,
            multiplier,
        }
    }
}
