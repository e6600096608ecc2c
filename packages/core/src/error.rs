use std::fmt;
use std::error::Error;

use crate::estimator::EstimationError;

/// Unified application error.
///
/// Each variant maps to its own process exit code so scripts can tell a
/// misconfiguration from an unreachable node or a malformed response.
#[derive(Debug)]
pub enum AppError {
    Config(String),
    Transport(String),
    DataIntegrity(String),
    Estimation(String),
}

impl AppError {
    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Config(_) => 2,
            AppError::Transport(_) => 3,
            AppError::DataIntegrity(_) => 4,
            AppError::Estimation(_) => 1,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "Config error: {}", msg),
            AppError::Transport(msg) => write!(f, "Transport error: {}", msg),
            AppError::DataIntegrity(msg) => write!(f, "Data integrity error: {}", msg),
            AppError::Estimation(msg) => write!(f, "Estimation error: {}", msg),
        }
    }
}

impl Error for AppError {}

impl From<EstimationError> for AppError {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::Transport { message, attempts } => {
                AppError::Transport(format!("{} (after {} attempt(s))", message, attempts))
            }
            EstimationError::DataIntegrity { message } => AppError::DataIntegrity(message),
            EstimationError::Config { message } => AppError::Config(message),
            EstimationError::InsufficientData { .. }
            | EstimationError::NumericalOverflow { .. } => AppError::Estimation(err.to_string()),
        }
    }
}
