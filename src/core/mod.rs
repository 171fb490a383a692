pub mod calibration;
pub mod price_scale;
pub mod primitives;
pub mod scale;
pub mod series;
pub mod time_scale;
pub mod types;

pub use calibration::{
    Calibration, CalibrationSource, ChartCalibration, DEFAULT_CALIBRATION, PriceBounds,
    resolve_calibration,
};
pub use price_scale::{PriceScale, price_at};
pub use primitives::{decimal_to_f64, parse_price_text};
pub use scale::{LinearScale, pixel_ratio};
pub use series::{VectorPoint, VectorSeries, VectorSeriesStore, X_PERCENT_MAX, project_series};
pub use time_scale::{DEFAULT_LOOKBACK_MINUTES, LookbackWindow, format_time_of_day, time_at};
pub use types::{PixelPoint, PixelRect, Viewport};
