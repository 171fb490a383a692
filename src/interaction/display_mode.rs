use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{Calibration, CalibrationSource};

/// What the chart viewport currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// The digitized series is the display; ruler and raw overlays are off.
    Vector,
    /// The uploaded image with the pixel-calibrated crosshair and ruler.
    Raw,
}

/// Result of a mode switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub previous: DisplayMode,
    pub current: DisplayMode,
}

impl ModeChange {
    #[must_use]
    pub fn changed(self) -> bool {
        self.previous != self.current
    }
}

/// Vector/raw toggle gated on the presence of a digitized series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeSwitch {
    vector_requested: bool,
    series_available: bool,
}

impl Default for ModeSwitch {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ModeSwitch {
    #[must_use]
    pub fn new(prefer_vector: bool) -> Self {
        Self {
            vector_requested: prefer_vector,
            series_available: false,
        }
    }

    #[must_use]
    pub fn active(self) -> DisplayMode {
        if self.vector_requested && self.series_available {
            DisplayMode::Vector
        } else {
            DisplayMode::Raw
        }
    }

    #[must_use]
    pub fn series_available(self) -> bool {
        self.series_available
    }

    /// The ruler/drag tool only works on the raw image.
    #[must_use]
    pub fn ruler_enabled(self) -> bool {
        self.active() == DisplayMode::Raw
    }

    /// Requests vector (`true`) or raw (`false`) display.
    ///
    /// Asking for vector display while no series exists is a no-op.
    pub fn set_vector_mode(&mut self, enabled: bool) -> ModeChange {
        let previous = self.active();
        if enabled && !self.series_available {
            debug!("vector mode requested without a series; staying raw");
            return ModeChange {
                previous,
                current: previous,
            };
        }
        self.vector_requested = enabled;
        ModeChange {
            previous,
            current: self.active(),
        }
    }

    pub fn toggle(&mut self) -> ModeChange {
        let enable = self.active() == DisplayMode::Raw;
        self.set_vector_mode(enable)
    }

    /// Called when a new cycle installs (or drops) its series.
    pub fn set_series_available(&mut self, available: bool) -> ModeChange {
        let previous = self.active();
        self.series_available = available;
        ModeChange {
            previous,
            current: self.active(),
        }
    }
}

/// Header status derived from where the calibration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CalibrationStatus {
    /// Axis and series come from the digitizer.
    Digitized,
    /// Axis estimated by the reasoning pass.
    Calibrated,
    /// Placeholder band, nothing measured.
    Estimated,
}

impl From<Calibration> for CalibrationStatus {
    fn from(calibration: Calibration) -> Self {
        match calibration.source() {
            CalibrationSource::Digitizer => Self::Digitized,
            CalibrationSource::Reasoning => Self::Calibrated,
            CalibrationSource::Default => Self::Estimated,
        }
    }
}
