use thiserror::Error;

pub type InspectorResult<T> = Result<T, InspectorError>;

#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("invalid viewport size: width={width}, height={height}")]
    InvalidViewport { width: u32, height: u32 },

    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Rejected price-axis calibration candidate.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CalibrationError {
    #[error("invalid calibration: min={min}, max={max} (max must be finite and > min)")]
    Invalid { min: f64, max: f64 },
}

/// Failure taxonomy of one analysis cycle.
///
/// Only `AnalysisFailed` and `Timeout` (on the reasoning call) end a cycle in a
/// user-visible error state; the other variants are absorbed by the
/// orchestrator and only logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("{call} call timed out after {after_ms} ms")]
    Timeout { call: &'static str, after_ms: u64 },

    #[error("digitization unavailable: {0}")]
    DigitizationUnavailable(String),

    #[error("malformed signal: {0}")]
    MalformedSignal(String),
}

impl AnalysisError {
    /// Whether this error ends the cycle without a signal.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::AnalysisFailed(_) | Self::Timeout { .. })
    }
}

/// Transport-level error reported by an external AI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider}: {message}")]
pub struct ProviderError {
    pub provider: String,
    pub message: String,
}

impl ProviderError {
    #[must_use]
    pub fn new(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            message: message.into(),
        }
    }
}
