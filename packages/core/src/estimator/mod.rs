//! Fee Estimation Module
//!
//! Turns `eth_feeHistory` samples into tiered EIP-1559 fee recommendations:
//! median-smoothed tips, a congestion multiplier, a worst-case base fee
//! projection per tier, and a panic override for runs of base fee spikes.

pub mod engine;
pub mod fetcher;
pub mod smoother;
pub mod congestion;
pub mod surge;
pub mod composer;
pub mod panic;
pub mod provider;
pub mod types;
pub mod error;
pub mod config;


pub use engine::FeeEstimationEngine;
pub use provider::{FeeHistoryProvider, FeeHistoryRequest, RawFeeHistory};
pub use types::*;
pub use error::{EstimationError, ProviderError};
pub use config::EstimatorConfig;
