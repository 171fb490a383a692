mod display_mode;
mod measurement;

pub use display_mode::{CalibrationStatus, DisplayMode, ModeChange, ModeSwitch};
pub use measurement::{DEFAULT_BAR_PIXEL_WIDTH, Measurement};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{
    Calibration, LookbackWindow, PixelPoint, PriceScale, VectorSeries, Viewport, X_PERCENT_MAX,
    format_time_of_day,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InteractionMode {
    /// No pointer over the viewport.
    Idle,
    /// Pointer present, not pressed.
    Hovering,
    /// Pointer pressed and measuring.
    Dragging,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerEventKind {
    Enter,
    Move,
    Down,
    Up,
    Leave,
}

/// Surface-independent pointer event, in viewport pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub position: PixelPoint,
}

impl PointerEvent {
    #[must_use]
    pub fn new(kind: PointerEventKind, x: f64, y: f64) -> Self {
        Self {
            kind,
            position: PixelPoint::new(x, y),
        }
    }

    #[must_use]
    pub fn enter(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Enter, x, y)
    }

    #[must_use]
    pub fn moved(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Move, x, y)
    }

    #[must_use]
    pub fn down(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Down, x, y)
    }

    #[must_use]
    pub fn up(x: f64, y: f64) -> Self {
        Self::new(PointerEventKind::Up, x, y)
    }

    #[must_use]
    pub fn leave() -> Self {
        Self::new(PointerEventKind::Leave, 0.0, 0.0)
    }
}

/// Crosshair cursor, clamped to the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CursorState {
    pub x: f64,
    pub y: f64,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DragState {
    pub dragging: bool,
    pub start: Option<PixelPoint>,
    pub current: Option<PixelPoint>,
}

/// Public pointer/drag state exposed to host applications.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InspectorPointerState {
    pub cursor: CursorState,
    pub drag: DragState,
}

/// Price/time under the cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readout {
    pub price: f64,
    pub price_text: String,
    pub time: DateTime<FixedOffset>,
    pub time_text: String,
    /// Interpolated series value under the cursor, vector mode only.
    pub series_price: Option<f64>,
}

/// Everything the state machine needs to map pixels for one event.
#[derive(Debug, Clone, Copy)]
pub struct MappingContext<'a> {
    pub calibration: Calibration,
    pub viewport: Viewport,
    pub lookback: LookbackWindow,
    pub bar_pixel_width: f64,
    pub display_mode: DisplayMode,
    pub now: DateTime<FixedOffset>,
    pub series: Option<&'a VectorSeries>,
}

impl MappingContext<'_> {
    #[must_use]
    pub fn price_scale(&self) -> PriceScale {
        PriceScale::new(self.calibration.bounds())
    }

    #[must_use]
    pub fn readout_at(&self, position: PixelPoint) -> Readout {
        let price = self
            .price_scale()
            .price_at(position.y, self.viewport.height_px());
        let time = self
            .lookback
            .time_at(position.x, self.viewport.width_px(), self.now);
        let series_price = match (self.display_mode, self.series) {
            (DisplayMode::Vector, Some(series)) if self.viewport.width > 0 => {
                series.price_near(position.x / self.viewport.width_px() * X_PERCENT_MAX)
            }
            _ => None,
        };

        Readout {
            price,
            price_text: format!("{price:.2}"),
            time_text: format_time_of_day(&time),
            time,
            series_price,
        }
    }

    #[must_use]
    pub fn measure(&self, start: PixelPoint, current: PixelPoint) -> Measurement {
        Measurement::between(
            start,
            current,
            self.price_scale(),
            self.viewport.height_px(),
            self.bar_pixel_width,
        )
    }
}

/// Pointer lifecycle `Idle -> Hovering -> Dragging -> Idle`.
///
/// Events are processed one at a time through `&mut self`; the state never
/// touches calibration or series data, it only reads them from the
/// [`MappingContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorState {
    mode: InteractionMode,
    pointer: InspectorPointerState,
    readout: Option<Readout>,
    measurement: Option<Measurement>,
}

impl Default for InspectorState {
    fn default() -> Self {
        Self {
            mode: InteractionMode::Idle,
            pointer: InspectorPointerState::default(),
            readout: None,
            measurement: None,
        }
    }
}

impl InspectorState {
    #[must_use]
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn pointer(&self) -> InspectorPointerState {
        self.pointer
    }

    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.pointer.cursor
    }

    #[must_use]
    pub fn readout(&self) -> Option<&Readout> {
        self.readout.as_ref()
    }

    /// Live ruler measurement; only present while dragging.
    #[must_use]
    pub fn measurement(&self) -> Option<Measurement> {
        self.measurement
    }

    /// Applies one pointer event and returns the resulting mode.
    pub fn handle(&mut self, event: PointerEvent, ctx: &MappingContext<'_>) -> InteractionMode {
        let previous = self.mode;
        match event.kind {
            PointerEventKind::Enter | PointerEventKind::Move => {
                self.on_pointer_move(event.position, ctx);
            }
            PointerEventKind::Down => self.on_pointer_down(event.position, ctx),
            PointerEventKind::Up => self.on_pointer_up(),
            PointerEventKind::Leave => self.on_pointer_leave(),
        }
        if previous != self.mode {
            trace!(from = ?previous, to = ?self.mode, "inspector transition");
        }
        self.mode
    }

    pub fn on_pointer_move(&mut self, position: PixelPoint, ctx: &MappingContext<'_>) {
        let position = ctx.viewport.clamp(position);
        self.pointer.cursor = CursorState {
            x: position.x,
            y: position.y,
            visible: true,
        };
        self.readout = Some(ctx.readout_at(position));

        if self.mode == InteractionMode::Dragging {
            self.pointer.drag.current = Some(position);
            self.measurement = self
                .pointer
                .drag
                .start
                .map(|start| ctx.measure(start, position));
        } else {
            self.mode = InteractionMode::Hovering;
        }
    }

    /// Starts the ruler. Ignored in vector mode and while already dragging.
    pub fn on_pointer_down(&mut self, position: PixelPoint, ctx: &MappingContext<'_>) {
        if ctx.display_mode != DisplayMode::Raw || self.mode == InteractionMode::Dragging {
            return;
        }
        if self.mode == InteractionMode::Idle {
            self.on_pointer_move(position, ctx);
        }

        let position = ctx.viewport.clamp(position);
        self.mode = InteractionMode::Dragging;
        self.pointer.drag = DragState {
            dragging: true,
            start: Some(position),
            current: Some(position),
        };
        self.measurement = Some(ctx.measure(position, position));
    }

    pub fn on_pointer_up(&mut self) {
        self.mode = InteractionMode::Idle;
        self.clear_drag();
    }

    pub fn on_pointer_leave(&mut self) {
        self.mode = InteractionMode::Idle;
        self.pointer.cursor.visible = false;
        self.clear_drag();
    }

    /// Returns to `Idle` dropping cursor, readout and drag artifacts.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn clear_drag(&mut self) {
        self.pointer.drag = DragState::default();
        self.measurement = None;
    }
}
