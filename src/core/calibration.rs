use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::series::VectorSeries;
use crate::error::CalibrationError;

/// Placeholder band used when no source produced a usable calibration.
///
/// The band matches one specific index (DAX around 17k) and silently
/// mis-calibrates any other instrument, so it is always reported as
/// [`Calibration::Default`] and never as a measured calibration.
pub const DEFAULT_CALIBRATION: PriceBounds = PriceBounds {
    min_price: 16_900.0,
    max_price: 17_050.0,
};

/// Validated `[min_price, max_price]` pair of a chart's price axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawBounds")]
pub struct PriceBounds {
    min_price: f64,
    max_price: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBounds {
    min_price: f64,
    max_price: f64,
}

impl TryFrom<RawBounds> for PriceBounds {
    type Error = CalibrationError;

    fn try_from(raw: RawBounds) -> Result<Self, Self::Error> {
        Self::new(raw.min_price, raw.max_price)
    }
}

impl PriceBounds {
    pub fn new(min_price: f64, max_price: f64) -> Result<Self, CalibrationError> {
        if !min_price.is_finite() || !max_price.is_finite() || max_price <= min_price {
            return Err(CalibrationError::Invalid {
                min: min_price,
                max: max_price,
            });
        }
        Ok(Self {
            min_price,
            max_price,
        })
    }

    #[must_use]
    pub fn min_price(self) -> f64 {
        self.min_price
    }

    #[must_use]
    pub fn max_price(self) -> f64 {
        self.max_price
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.max_price - self.min_price
    }

    #[must_use]
    pub fn midpoint(self) -> f64 {
        self.min_price + self.span() / 2.0
    }
}

impl Default for PriceBounds {
    fn default() -> Self {
        DEFAULT_CALIBRATION
    }
}

/// Axis calibration estimated by the reasoning pass (`chartMetadata`).
///
/// Kept unvalidated because it is upstream output; [`ChartCalibration::bounds`]
/// applies the `max > min` check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartCalibration {
    pub min_price: f64,
    pub max_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detected_asset: Option<String>,
}

impl ChartCalibration {
    #[must_use]
    pub fn new(min_price: f64, max_price: f64) -> Self {
        Self {
            min_price,
            max_price,
            detected_asset: None,
        }
    }

    #[must_use]
    pub fn with_detected_asset(mut self, asset: impl Into<String>) -> Self {
        self.detected_asset = Some(asset.into());
        self
    }

    pub fn bounds(&self) -> Result<PriceBounds, CalibrationError> {
        PriceBounds::new(self.min_price, self.max_price)
    }
}

/// Where the effective calibration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationSource {
    Default,
    Reasoning,
    Digitizer,
}

/// Effective price-axis calibration with its provenance.
///
/// `Default` is a distinct state: callers can tell "nothing measured yet" apart
/// from "measured and happens to equal the default band".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Calibration {
    Default(PriceBounds),
    FromReasoning(PriceBounds),
    FromDigitizer(PriceBounds),
}

impl Calibration {
    #[must_use]
    pub fn bounds(self) -> PriceBounds {
        match self {
            Self::Default(bounds) | Self::FromReasoning(bounds) | Self::FromDigitizer(bounds) => {
                bounds
            }
        }
    }

    #[must_use]
    pub fn source(self) -> CalibrationSource {
        match self {
            Self::Default(_) => CalibrationSource::Default,
            Self::FromReasoning(_) => CalibrationSource::Reasoning,
            Self::FromDigitizer(_) => CalibrationSource::Digitizer,
        }
    }

    #[must_use]
    pub fn is_default(self) -> bool {
        matches!(self, Self::Default(_))
    }

    #[must_use]
    pub fn is_measured(self) -> bool {
        !self.is_default()
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::Default(DEFAULT_CALIBRATION)
    }
}

/// Merges the two calibration candidates into one effective calibration.
///
/// Precedence: digitizer series bounds, then reasoning bounds, then `fallback`.
/// Candidates with `max <= min` (or non-finite values) are discarded and the
/// next source is tried.
#[must_use]
pub fn resolve_calibration(
    reasoning: Option<&ChartCalibration>,
    digitizer: Option<&VectorSeries>,
    fallback: PriceBounds,
) -> Calibration {
    if let Some(series) = digitizer {
        match series.bounds() {
            Ok(bounds) => return Calibration::FromDigitizer(bounds),
            Err(err) => debug!(error = %err, "discarding digitizer calibration"),
        }
    }

    if let Some(metadata) = reasoning {
        match metadata.bounds() {
            Ok(bounds) => return Calibration::FromReasoning(bounds),
            Err(err) => debug!(error = %err, "discarding reasoning calibration"),
        }
    }

    Calibration::Default(fallback)
}
