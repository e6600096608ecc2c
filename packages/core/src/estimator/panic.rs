//! Panic Override
//!
//! Detects runs of sharp base-fee increases across confirmed blocks and, while
//! one is present, raises the selected tier to a configured floor. The state is
//! derived from the batch alone; nothing carries over between calls.

use crate::estimator::{
    config::PanicConfig,
    types::{FeeHistoryBatch, PanicMode, PanicState},
};

pub struct PanicDetector {
    config: PanicConfig,
}

impl PanicDetector {
    pub fn new(config: PanicConfig) -> Self {
        Self { config }
    }

    /// Evaluate the confirmed base fees; the pending-block fee is not used.
    pub fn evaluate(&self, batch: &FeeHistoryBatch) -> PanicState {
        let longest_run = self.longest_spike_run(&batch.confirmed_base_fees());
        let mode = if longest_run >= self.config.consecutive_blocks {
            PanicMode::Panic
        } else {
            PanicMode::Normal
        };

        PanicState { mode, longest_run }
    }

    /// Longest run of consecutive block-to-block increases above the threshold.
    pub fn longest_spike_run(&self, base_fees: &[u128]) -> usize {
        let mut longest = 0;
        let mut current = 0;

        for pair in base_fees.windows(2) {
            if self.is_spike(pair[0], pair[1]) {
                current += 1;
                longest = longest.max(current);
            } else {
                current = 0;
            }
        }

        longest
    }

    fn is_spike(&self, previous: u128, next: u128) -> bool {
        if next <= previous {
            return false;
        }
        if previous == 0 {
            return true;
        }
        (next - previous) as f64 / previous as f64 > self.config.increase_threshold
    }

    /// Position of the tier to use: the requested one, raised to `floor`
    /// while in panic.
    pub fn select_tier(&self, state: &PanicState, requested: usize, floor: usize) -> usize {
        if state.is_panic() {
            requested.max(floor)
        } else {
            requested
        }
    }
}
