use serde::{Deserialize, Serialize};

use crate::core::{PixelPoint, PixelRect, PriceScale};

/// Default horizontal pixels per bar used to count bars under the ruler.
pub const DEFAULT_BAR_PIXEL_WIDTH: f64 = 10.0;

/// Live ruler measurement between the drag start and the current pointer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub start_price: f64,
    pub end_price: f64,
    pub delta: f64,
    /// `delta / start_price * 100`; 0 when the start price is 0.
    pub percent: f64,
    pub bars_spanned: u32,
    pub is_positive: bool,
    pub rect: PixelRect,
}

impl Measurement {
    #[must_use]
    pub fn between(
        start: PixelPoint,
        current: PixelPoint,
        scale: PriceScale,
        viewport_height: f64,
        bar_pixel_width: f64,
    ) -> Self {
        let start_price = scale.price_at(start.y, viewport_height);
        let end_price = scale.price_at(current.y, viewport_height);
        // collapse -0.0 so the label never reads "+-0.00"
        let delta = match end_price - start_price {
            d if d == 0.0 => 0.0,
            d => d,
        };
        let percent = if start_price == 0.0 {
            0.0
        } else {
            delta / start_price * 100.0
        };

        Self {
            start_price,
            end_price,
            delta,
            percent,
            bars_spanned: bars_between(start.x, current.x, bar_pixel_width),
            is_positive: delta >= 0.0,
            rect: PixelRect::spanning(start, current),
        }
    }

    #[must_use]
    pub fn delta_text(&self) -> String {
        format!("{}{:.2}", self.sign(), self.delta)
    }

    #[must_use]
    pub fn percent_text(&self) -> String {
        format!("{}{:.2}%", self.sign(), self.percent)
    }

    /// Ruler label, e.g. `+150.00 (+0.89%)`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.delta_text(), self.percent_text())
    }

    fn sign(&self) -> &'static str {
        if self.is_positive { "+" } else { "" }
    }
}

fn bars_between(x0: f64, x1: f64, bar_pixel_width: f64) -> u32 {
    if !bar_pixel_width.is_finite() || bar_pixel_width <= 0.0 {
        return 0;
    }
    let bars = ((x1 - x0).abs() / bar_pixel_width).round();
    if bars.is_finite() { bars as u32 } else { 0 }
}
