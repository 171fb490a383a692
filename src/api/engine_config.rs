use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisConfig;
use crate::core::{DEFAULT_CALIBRATION, DEFAULT_LOOKBACK_MINUTES, LookbackWindow, PriceBounds, Viewport};
use crate::error::{InspectorError, InspectorResult};
use crate::interaction::DEFAULT_BAR_PIXEL_WIDTH;

/// Public inspector bootstrap configuration.
///
/// Serializable so host applications can persist/load the setup without
/// inventing their own format. Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorConfig {
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default = "default_lookback_minutes")]
    pub lookback_minutes: u32,
    #[serde(default = "default_bar_pixel_width")]
    pub bar_pixel_width: f64,
    #[serde(default = "default_fallback_calibration")]
    pub fallback_calibration: PriceBounds,
    #[serde(default = "default_prefer_vector_mode")]
    pub prefer_vector_mode: bool,
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl InspectorConfig {
    /// Creates a config with default mapping constants.
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            lookback_minutes: default_lookback_minutes(),
            bar_pixel_width: default_bar_pixel_width(),
            fallback_calibration: default_fallback_calibration(),
            prefer_vector_mode: default_prefer_vector_mode(),
            analysis: AnalysisConfig::default(),
        }
    }

    #[must_use]
    pub fn with_lookback_minutes(mut self, minutes: u32) -> Self {
        self.lookback_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_bar_pixel_width(mut self, width: f64) -> Self {
        self.bar_pixel_width = width;
        self
    }

    /// Sets the placeholder band used before anything is measured.
    #[must_use]
    pub fn with_fallback_calibration(mut self, bounds: PriceBounds) -> Self {
        self.fallback_calibration = bounds;
        self
    }

    #[must_use]
    pub fn with_prefer_vector_mode(mut self, prefer: bool) -> Self {
        self.prefer_vector_mode = prefer;
        self
    }

    #[must_use]
    pub fn with_analysis(mut self, analysis: AnalysisConfig) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn lookback(&self) -> InspectorResult<LookbackWindow> {
        LookbackWindow::new(self.lookback_minutes)
    }

    pub fn validate(&self) -> InspectorResult<()> {
        self.lookback()?;
        if !self.bar_pixel_width.is_finite() || self.bar_pixel_width <= 0.0 {
            return Err(InspectorError::InvalidData(
                "bar pixel width must be finite and > 0".to_owned(),
            ));
        }
        self.analysis.validate()
    }

    /// Serializes config to pretty JSON for debug/config files.
    pub fn to_json_pretty(&self) -> InspectorResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| InspectorError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes and validates config from JSON.
    pub fn from_json_str(input: &str) -> InspectorResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| InspectorError::InvalidData(format!("failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

fn default_lookback_minutes() -> u32 {
    DEFAULT_LOOKBACK_MINUTES
}

fn default_bar_pixel_width() -> f64 {
    DEFAULT_BAR_PIXEL_WIDTH
}

fn default_fallback_calibration() -> PriceBounds {
    DEFAULT_CALIBRATION
}

fn default_prefer_vector_mode() -> bool {
    true
}
