use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::calibration::PriceBounds;
use crate::core::price_scale::PriceScale;
use crate::core::types::{PixelPoint, Viewport};
use crate::error::CalibrationError;

/// Upper bound of the normalized horizontal position.
pub const X_PERCENT_MAX: f64 = 100.0;

/// One digitized sample: `x` is a horizontal position in `[0, 100]` percent of
/// the chart width (not a timestamp), `price` an absolute axis value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorPoint {
    pub x: f64,
    pub price: f64,
}

impl VectorPoint {
    #[must_use]
    pub fn new(x: f64, price: f64) -> Self {
        Self { x, price }
    }
}

/// Numeric reconstruction of a chart image produced by the digitizer.
///
/// Points are kept sorted by ascending `x`; samples with a non-finite
/// coordinate are dropped on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawSeries")]
pub struct VectorSeries {
    points: Vec<VectorPoint>,
    pub min_price: f64,
    pub max_price: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSeries {
    points: Vec<VectorPoint>,
    min_price: f64,
    max_price: f64,
}

impl From<RawSeries> for VectorSeries {
    fn from(raw: RawSeries) -> Self {
        Self::new(raw.points, raw.min_price, raw.max_price)
    }
}

impl VectorSeries {
    #[must_use]
    pub fn new(mut points: Vec<VectorPoint>, min_price: f64, max_price: f64) -> Self {
        points.retain(|point| point.x.is_finite() && point.price.is_finite());
        points.sort_by(|a, b| a.x.total_cmp(&b.x));
        Self {
            points,
            min_price,
            max_price,
        }
    }

    /// Samples in ascending `x` order.
    #[must_use]
    pub fn points(&self) -> &[VectorPoint] {
        &self.points
    }

    pub fn bounds(&self) -> Result<PriceBounds, CalibrationError> {
        PriceBounds::new(self.min_price, self.max_price)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Series price at a horizontal position, linearly interpolated between
    /// the two surrounding samples.
    ///
    /// Positions before the first or after the last sample read that sample.
    #[must_use]
    pub fn price_near(&self, x_percent: f64) -> Option<f64> {
        if !x_percent.is_finite() {
            return None;
        }

        let first = self.points.first()?;
        let last = self.points.last()?;
        if x_percent <= first.x {
            return Some(first.price);
        }
        if x_percent >= last.x {
            return Some(last.price);
        }

        // first.x < x_percent < last.x, so 1 <= idx < len
        let idx = self.points.partition_point(|point| point.x < x_percent);
        let (left, right) = (self.points[idx - 1], self.points[idx]);
        let span = right.x - left.x;
        if span == 0.0 {
            return Some(right.price);
        }
        let t = (x_percent - left.x) / span;
        Some(left.price + t * (right.price - left.price))
    }
}

/// Holds the digitized series of the current analysis cycle.
///
/// Replacement is wholesale: a new cycle swaps the `Arc`, it never merges
/// with or mutates the previous series.
#[derive(Debug, Clone, Default)]
pub struct VectorSeriesStore {
    cycle: Option<u64>,
    series: Option<Arc<VectorSeries>>,
}

impl VectorSeriesStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the series produced for `cycle`, dropping whatever the
    /// previous cycle left behind.
    ///
    /// Series whose bounds fail the calibration check are not stored.
    pub fn replace(&mut self, cycle: u64, series: Option<Arc<VectorSeries>>) {
        let series = series.filter(|series| match series.bounds() {
            Ok(_) => true,
            Err(err) => {
                debug!(cycle, error = %err, "rejecting vector series with invalid bounds");
                false
            }
        });
        debug!(
            cycle,
            points = series.as_ref().map_or(0, |series| series.len()),
            "replace vector series"
        );
        self.cycle = Some(cycle);
        self.series = series;
    }

    pub fn clear(&mut self) {
        self.cycle = None;
        self.series = None;
    }

    #[must_use]
    pub fn cycle(&self) -> Option<u64> {
        self.cycle
    }

    #[must_use]
    pub fn series(&self) -> Option<&VectorSeries> {
        self.series.as_deref()
    }

    #[must_use]
    pub fn shared(&self) -> Option<Arc<VectorSeries>> {
        self.series.clone()
    }

    #[must_use]
    pub fn has_series(&self) -> bool {
        self.series.is_some()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<PriceBounds> {
        self.series.as_ref().and_then(|series| series.bounds().ok())
    }
}

/// Projects a series into viewport pixel coordinates for vector display.
///
/// `x` percent maps onto the viewport width, price onto the inverted Y axis
/// of the series' own bounds. An unlaid viewport or invalid bounds project
/// to nothing.
#[must_use]
pub fn project_series(series: &VectorSeries, viewport: Viewport) -> Vec<PixelPoint> {
    if !viewport.is_valid() {
        return Vec::new();
    }
    let Ok(bounds) = series.bounds() else {
        return Vec::new();
    };

    let scale = PriceScale::new(bounds);
    let width = viewport.width_px();
    let height = viewport.height_px();
    series
        .points()
        .iter()
        .filter_map(|point| {
            let y = scale.pixel_at(point.price, height)?;
            Some(PixelPoint::new(point.x / X_PERCENT_MAX * width, y))
        })
        .collect()
}
