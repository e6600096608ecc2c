//! Fee Estimation Engine - Central orchestrator for fee analysis

use std::sync::Arc;
use std::time::Instant;

use crate::estimator::{
    composer::TierComposer,
    config::EstimatorConfig,
    congestion::CongestionAnalyzer,
    error::{EstimationError, ProviderError},
    fetcher::HistoryFetcher,
    panic::PanicDetector,
    provider::FeeHistoryProvider,
    surge,
    types::*,
};
use crate::services::rpc::RpcClient;

/// Turns one fee history batch into a tiered fee recommendation.
///
/// Holds only immutable configuration and a shared provider handle, so a
/// single engine can serve concurrent `estimate` calls.
pub struct FeeEstimationEngine {
    config: EstimatorConfig,
    fetcher: HistoryFetcher,
    analyzer: CongestionAnalyzer,
    composer: TierComposer,
    detector: PanicDetector,
}

impl FeeEstimationEngine {
    /// Create an engine that queries the node at `config.rpc.url`.
    pub fn connect(config: EstimatorConfig) -> Result<Self, EstimationError> {
        let client = RpcClient::new(config.rpc.url.clone(), config.rpc.timeout())
            .map_err(|err: ProviderError| EstimationError::transport(err.to_string(), 0))?;
        Self::with_provider(config, Arc::new(client))
    }

    /// Create an engine over an arbitrary fee history provider.
    pub fn with_provider(
        config: EstimatorConfig,
        provider: Arc<dyn FeeHistoryProvider + Send + Sync>,
    ) -> Result<Self, EstimationError> {
        config.validate()?;

        let fetcher =
            HistoryFetcher::new(provider, config.history.clone(), config.rpc.retry.clone());
        let analyzer = CongestionAnalyzer::new(config.congestion.clone());
        let composer = TierComposer::new(config.tiers.clone());
        let detector = PanicDetector::new(config.panic.clone());

        Ok(Self {
            config,
            fetcher,
            analyzer,
            composer,
            detector,
        })
    }

    /// Fetch a fresh batch and estimate every tier from it.
    ///
    /// `requested_tier` defaults to the first configured tier.
    pub async fn estimate(
        &self,
        requested_tier: Option<&str>,
    ) -> Result<EstimateReport, EstimationError> {
        // Unknown tiers are a configuration error and must not cost a fetch.
        let requested = self.resolve_tier(requested_tier)?;

        let start_time = Instant::now();
        let batch = self.fetcher.fetch().await?;
        tracing::debug!(
            "Fetched {} blocks (latest {:?}) in {}ms",
            batch.len(),
            batch.latest_block(),
            start_time.elapsed().as_millis()
        );

        self.build_report(&batch, requested)
    }

    /// Estimate every tier from an already fetched batch. Pure: the same batch
    /// always yields the same report.
    pub fn estimate_batch(
        &self,
        batch: &FeeHistoryBatch,
        requested_tier: Option<&str>,
    ) -> Result<EstimateReport, EstimationError> {
        let requested = self.resolve_tier(requested_tier)?;
        self.build_report(batch, requested)
    }

    fn build_report(
        &self,
        batch: &FeeHistoryBatch,
        requested: usize,
    ) -> Result<EstimateReport, EstimationError> {
        let congestion = self.analyzer.analyze(batch)?;
        let composition = self.composer.compose(batch, &congestion)?;

        let panic = self.detector.evaluate(batch);
        let floor = self.resolve_tier(Some(&self.config.panic.floor_tier))?;
        let selected = self.detector.select_tier(&panic, requested, floor);

        if panic.is_panic() {
            tracing::warn!(
                "Base fee rose sharply for {} consecutive blocks; selecting {} (requested {})",
                panic.longest_run,
                self.config.tiers[selected].name,
                self.config.tiers[requested].name
            );
        }

        tracing::info!(
            "Estimated {} tiers at {:.1}% utilisation ({:?})",
            composition.estimates.len(),
            congestion.moving_average_ratio * 100.0,
            congestion.mode
        );

        Ok(EstimateReport {
            estimates: composition.estimates,
            congestion,
            panic_adjusted: panic.is_panic(),
            panic,
            requested_tier: self.config.tiers[requested].name.clone(),
            selected_tier: self.config.tiers[selected].name.clone(),
            warnings: composition.warnings,
            anchor_base_fee: batch.pending_base_fee,
            base_fee_trend: surge::base_fee_trend(batch),
            latest_block: batch.latest_block(),
        })
    }

    fn resolve_tier(&self, name: Option<&str>) -> Result<usize, EstimationError> {
        match name {
            None => Ok(0),
            Some(name) => self.config.tier_position(name).ok_or_else(|| {
                EstimationError::config_error(format!("unknown tier '{}'", name))
            }),
        }
    }

    /// Get engine configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }
}
