//! Error types for fee estimation

use thiserror::Error;

/// Errors that abort an estimation call.
///
/// No partial tier results are ever returned alongside one of these: either
/// every tier is computed from one consistent batch, or the call fails.
#[derive(Error, Debug)]
pub enum EstimationError {
    #[error("Transport error after {attempts} attempt(s): {message}")]
    Transport { message: String, attempts: u32 },

    #[error("Data integrity error: {message}")]
    DataIntegrity { message: String },

    #[error("Insufficient data for calculation: {operation}")]
    InsufficientData { operation: String },

    #[error("Numerical overflow in calculation: {operation}")]
    NumericalOverflow { operation: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Errors from fee history providers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable: HTTP {status}")]
    ServiceUnavailable { status: u16 },

    #[error("Node rejected request: HTTP {status}")]
    HttpError { status: u16 },

    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },

    #[error("Data format error: {message}")]
    FormatError { message: String },
}

impl ProviderError {
    /// Whether retrying the same request could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::NetworkError { .. }
                | ProviderError::Timeout
                | ProviderError::RateLimitExceeded
                | ProviderError::ServiceUnavailable { .. }
        )
    }
}

impl EstimationError {
    pub fn transport(message: impl Into<String>, attempts: u32) -> Self {
        Self::Transport { message: message.into(), attempts }
    }

    pub fn data_integrity(message: impl Into<String>) -> Self {
        Self::DataIntegrity { message: message.into() }
    }

    pub fn insufficient_data(operation: impl Into<String>) -> Self {
        Self::InsufficientData { operation: operation.into() }
    }

    pub fn numerical_overflow(operation: impl Into<String>) -> Self {
        Self::NumericalOverflow { operation: operation.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}
