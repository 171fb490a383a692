use chrono::{DateTime, Duration, TimeZone};
use serde::{Deserialize, Serialize};

use crate::core::scale::pixel_ratio;
use crate::error::{InspectorError, InspectorResult};

/// Default rolling window represented by the chart's x-axis.
pub const DEFAULT_LOOKBACK_MINUTES: u32 = 240;

/// Time-of-day format used by readouts.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";

/// Fixed rolling lookback window ending at "now".
///
/// The x-axis of an uploaded screenshot carries no timestamps, so x = 0 is read
/// as `now - window` and x = width as `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    minutes: u32,
}

impl Default for LookbackWindow {
    fn default() -> Self {
        Self {
            minutes: DEFAULT_LOOKBACK_MINUTES,
        }
    }
}

impl LookbackWindow {
    pub fn new(minutes: u32) -> InspectorResult<Self> {
        if minutes == 0 {
            return Err(InspectorError::InvalidData(
                "lookback window must be at least one minute".to_owned(),
            ));
        }
        Ok(Self { minutes })
    }

    #[must_use]
    pub fn minutes(self) -> u32 {
        self.minutes
    }

    /// Offset from "now" in minutes, in `[-window, 0]`.
    ///
    /// `x` is clamped to `[0, viewport_width]`; an unlaid viewport reads 0.
    #[must_use]
    pub fn offset_minutes(self, x: f64, viewport_width: f64) -> f64 {
        let window = f64::from(self.minutes);
        match pixel_ratio(x, viewport_width) {
            Some(ratio) => ratio * window - window,
            None => 0.0,
        }
    }

    /// Wall-clock instant under pixel X, relative to the frozen `now`.
    #[must_use]
    pub fn time_at<Tz: TimeZone>(
        self,
        x: f64,
        viewport_width: f64,
        now: DateTime<Tz>,
    ) -> DateTime<Tz> {
        let offset_ms = (self.offset_minutes(x, viewport_width) * 60_000.0).round() as i64;
        now + Duration::milliseconds(offset_ms)
    }
}

/// Free-function form of [`LookbackWindow::time_at`].
#[must_use]
pub fn time_at<Tz: TimeZone>(
    x: f64,
    viewport_width: f64,
    window: LookbackWindow,
    now: DateTime<Tz>,
) -> DateTime<Tz> {
    window.time_at(x, viewport_width, now)
}

/// Formats an instant as `HH:MM`.
#[must_use]
pub fn format_time_of_day<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format(TIME_OF_DAY_FORMAT).to_string()
}
