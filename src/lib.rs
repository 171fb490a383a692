//! chart-lens: headless core behind AI-digitized chart screenshots.
//!
//! The crate resolves the price-axis calibration reported by two AI passes,
//! maps viewport pixels to price and time, stores the digitized series of the
//! current analysis cycle and drives the crosshair/ruler inspector. The AI
//! transport itself stays outside, behind the traits in [`analysis`].

pub mod analysis;
pub mod api;
pub mod core;
pub mod error;
pub mod interaction;
pub mod telemetry;

pub use api::{ChartInspector, InspectorConfig};
pub use error::{AnalysisError, CalibrationError, InspectorError, InspectorResult, ProviderError};
