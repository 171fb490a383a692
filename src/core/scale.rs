use crate::core::calibration::PriceBounds;
use crate::error::{InspectorError, InspectorResult};

/// Linear map between a value domain and a normalized `[0, 1]` ratio.
///
/// Both the price and the time mapper are built on this type; the pixel side
/// is always expressed as a ratio of the viewport extent so that callers own
/// clamping and orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> InspectorResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(InspectorError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.domain_end - self.domain_start
    }

    /// Maps a ratio to the domain.
    ///
    /// Ratios are clamped to `[0, 1]`; the end points return the domain bounds
    /// exactly and interior values never leave the domain, which keeps the map
    /// monotonic under floating-point rounding.
    #[must_use]
    pub fn value_at_ratio(self, ratio: f64) -> f64 {
        if ratio.is_nan() || ratio <= 0.0 {
            return self.domain_start;
        }
        if ratio >= 1.0 {
            return self.domain_end;
        }

        let (low, high) = if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };
        (self.domain_start + ratio * self.span()).clamp(low, high)
    }

    /// Inverse of [`Self::value_at_ratio`], without clamping.
    #[must_use]
    pub fn ratio_of(self, value: f64) -> f64 {
        (value - self.domain_start) / self.span()
    }
}

impl From<PriceBounds> for LinearScale {
    fn from(bounds: PriceBounds) -> Self {
        Self {
            domain_start: bounds.min_price(),
            domain_end: bounds.max_price(),
        }
    }
}

/// Returns `pixel / extent` with `pixel` clamped to `[0, extent]`.
///
/// Returns `None` for a non-positive or non-finite extent (viewport not laid
/// out) or a non-finite pixel.
#[must_use]
pub fn pixel_ratio(pixel: f64, extent: f64) -> Option<f64> {
    if !extent.is_finite() || extent <= 0.0 || !pixel.is_finite() {
        return None;
    }
    Some(pixel.clamp(0.0, extent) / extent)
}
