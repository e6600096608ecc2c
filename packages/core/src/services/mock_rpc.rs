//! Mock fee history provider for testing
//!
//! Implements `FeeHistoryProvider` with scripted responses so tests can
//! exercise the fetcher and engine without a live node.
//!
//! Gated behind `#[cfg(test)]`, never compiled into production builds.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::estimator::{
    error::ProviderError,
    provider::{FeeHistoryProvider, FeeHistoryRequest, RawFeeHistory},
};

/// A configurable mock implementation of `FeeHistoryProvider`.
pub struct MockFeeHistoryProvider {
    /// Returned once scripted failures are exhausted.
    response: RawFeeHistory,
    /// When `Some`, every call returns this error instead of `response`.
    error: Option<ProviderError>,
    /// One-shot errors returned, in order, before anything else.
    failures: Mutex<VecDeque<ProviderError>>,
    /// Tracks total number of `fee_history` calls.
    pub call_count: Arc<AtomicUsize>,
    last_request: Mutex<Option<FeeHistoryRequest>>,
}

impl MockFeeHistoryProvider {
    pub fn new() -> Self {
        Self {
            response: RawFeeHistory::default(),
            error: None,
            failures: Mutex::new(VecDeque::new()),
            call_count: Arc::new(AtomicUsize::new(0)),
            last_request: Mutex::new(None),
        }
    }

    pub fn with_response(mut self, response: RawFeeHistory) -> Self {
        self.response = response;
        self
    }

    /// Fail every call with `error` (overrides `with_response`).
    pub fn with_error(mut self, error: ProviderError) -> Self {
        self.error = Some(error);
        self
    }

    /// Fail the first `failures.len()` calls, then fall through.
    pub fn with_failures(self, failures: Vec<ProviderError>) -> Self {
        *self.failures.lock().unwrap() = failures.into();
        self
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<FeeHistoryRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl Default for MockFeeHistoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeeHistoryProvider for MockFeeHistoryProvider {
    async fn fee_history(
        &self,
        request: &FeeHistoryRequest,
    ) -> Result<RawFeeHistory, ProviderError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }

        Ok(self.response.clone())
    }

    fn provider_name(&self) -> &str {
        "MockRpc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> FeeHistoryRequest {
        FeeHistoryRequest {
            block_count: 10,
            reference_block: "latest".to_string(),
            reward_percentiles: vec![30.0, 60.0, 75.0, 90.0],
        }
    }

    #[tokio::test]
    async fn scripted_failures_run_out() {
        let mock = MockFeeHistoryProvider::new().with_failures(vec![ProviderError::Timeout]);

        assert_eq!(mock.fee_history(&request()).await.unwrap_err(), ProviderError::Timeout);
        assert!(mock.fee_history(&request()).await.is_ok());
        assert_eq!(mock.calls(), 2);
    }

    #[tokio::test]
    async fn records_last_request() {
        let mock = MockFeeHistoryProvider::new();
        mock.fee_history(&request()).await.unwrap();

        assert_eq!(mock.last_request(), Some(request()));
    }

    #[tokio::test]
    async fn persistent_error_counts_calls() {
        let mock = MockFeeHistoryProvider::new().with_error(ProviderError::RateLimitExceeded);

        let _ = mock.fee_history(&request()).await;
        let _ = mock.fee_history(&request()).await;
        assert_eq!(mock.calls(), 2);
    }
}
