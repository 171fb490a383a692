use crate::core::calibration::PriceBounds;
use crate::core::scale::{LinearScale, pixel_ratio};
use serde::{Deserialize, Serialize};

/// Price axis mapped onto an inverted Y pixel axis (top = max price).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceScale {
    bounds: PriceBounds,
}

impl PriceScale {
    #[must_use]
    pub fn new(bounds: PriceBounds) -> Self {
        Self { bounds }
    }

    #[must_use]
    pub fn bounds(self) -> PriceBounds {
        self.bounds
    }

    fn linear(self) -> LinearScale {
        LinearScale::from(self.bounds)
    }

    /// Maps pixel Y to a price.
    ///
    /// `y` is clamped to `[0, viewport_height]`, so excursions outside the
    /// viewport read the nearest boundary price. An unlaid viewport (zero or
    /// non-finite height) or a non-finite `y` reads the calibration midpoint.
    #[must_use]
    pub fn price_at(self, y: f64, viewport_height: f64) -> f64 {
        let Some(ratio_from_top) = pixel_ratio(y, viewport_height) else {
            return self.bounds.midpoint();
        };
        self.linear().value_at_ratio(1.0 - ratio_from_top)
    }

    /// Maps a price to pixel Y. Prices outside the band map outside the viewport.
    #[must_use]
    pub fn pixel_at(self, price: f64, viewport_height: f64) -> Option<f64> {
        if !price.is_finite() || !viewport_height.is_finite() || viewport_height <= 0.0 {
            return None;
        }
        let ratio = self.linear().ratio_of(price);
        Some((1.0 - ratio) * viewport_height)
    }
}

/// Free-function form of [`PriceScale::price_at`].
#[must_use]
pub fn price_at(y: f64, viewport_height: f64, bounds: PriceBounds) -> f64 {
    PriceScale::new(bounds).price_at(y, viewport_height)
}
