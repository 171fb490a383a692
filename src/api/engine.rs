use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::analysis::{AnalysisState, CycleId, TradingSignal};
use crate::core::{
    Calibration, LookbackWindow, PixelPoint, PriceScale, VectorSeries, VectorSeriesStore,
    Viewport, decimal_to_f64, project_series, resolve_calibration,
};
use crate::error::{InspectorError, InspectorResult};
use crate::interaction::{
    CalibrationStatus, CursorState, DisplayMode, InspectorPointerState, InspectorState,
    InteractionMode, MappingContext, Measurement, ModeChange, ModeSwitch, PointerEvent, Readout,
};

use super::{Clock, InspectorConfig, InspectorSnapshot, SystemClock};

/// Stop-loss / take-profit levels projected onto the viewport Y axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalLevels {
    pub stop_loss_y: Option<f64>,
    pub take_profit_y: Option<f64>,
}

/// Session facade consumed by host applications.
///
/// `ChartInspector` owns the series store, the mode switch and the pointer
/// state machine of one session, and consumes [`AnalysisState`] values
/// published by the orchestrator. It never mutates a published signal.
pub struct ChartInspector {
    config: InspectorConfig,
    frame: SessionFrame,
    cycle: Option<CycleId>,
    is_loading: bool,
    error: Option<String>,
    signal: Option<Arc<TradingSignal>>,
    inspector: InspectorState,
}

/// Everything a pointer event is mapped against, kept apart from the pointer
/// state so both can be borrowed at once.
struct SessionFrame {
    calibration: Calibration,
    viewport: Viewport,
    lookback: LookbackWindow,
    bar_pixel_width: f64,
    clock: Box<dyn Clock>,
    store: VectorSeriesStore,
    mode: ModeSwitch,
}

impl SessionFrame {
    fn mapping_context(&self) -> MappingContext<'_> {
        MappingContext {
            calibration: self.calibration,
            viewport: self.viewport,
            lookback: self.lookback,
            bar_pixel_width: self.bar_pixel_width,
            display_mode: self.mode.active(),
            now: self.clock.now(),
            series: self.store.series(),
        }
    }
}

impl ChartInspector {
    pub fn new(config: InspectorConfig) -> InspectorResult<Self> {
        config.validate()?;
        let lookback = config.lookback()?;
        let frame = SessionFrame {
            calibration: Calibration::Default(config.fallback_calibration),
            viewport: config.viewport,
            lookback,
            bar_pixel_width: config.bar_pixel_width,
            clock: Box::new(SystemClock),
            store: VectorSeriesStore::new(),
            mode: ModeSwitch::new(config.prefer_vector_mode),
        };
        Ok(Self {
            config,
            frame,
            cycle: None,
            is_loading: false,
            error: None,
            signal: None,
            inspector: InspectorState::default(),
        })
    }

    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.frame.clock = Box::new(clock);
        self
    }

    #[must_use]
    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    /// Installs the state published for a cycle.
    ///
    /// States from a cycle older than the one already applied are ignored and
    /// `false` is returned. Every accepted state replaces the signal, series
    /// and calibration wholesale and returns the pointer to `Idle`.
    pub fn apply_analysis(&mut self, state: &AnalysisState) -> bool {
        if let (Some(current), Some(incoming)) = (self.cycle, state.cycle) {
            if incoming < current {
                debug!(current, incoming, "ignoring analysis state from stale cycle");
                return false;
            }
        }

        let cycle = state.cycle.unwrap_or_default();
        self.cycle = state.cycle;
        self.is_loading = state.is_loading;
        self.error = state.error.clone();
        self.signal = state.result.clone();

        let series = self
            .signal
            .as_ref()
            .and_then(|signal| signal.vector_data.clone());
        self.frame.store.replace(cycle, series);
        self.frame.calibration = resolve_calibration(
            self.signal
                .as_ref()
                .and_then(|signal| signal.chart_metadata.as_ref()),
            self.frame.store.series(),
            self.config.fallback_calibration,
        );
        self.frame.mode.set_series_available(self.frame.store.has_series());
        self.inspector.reset();

        debug!(
            cycle,
            loading = self.is_loading,
            failed = self.error.is_some(),
            source = ?self.frame.calibration.source(),
            display = ?self.frame.mode.active(),
            "applied analysis state"
        );
        true
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        if self.frame.viewport != viewport {
            self.frame.viewport = viewport;
            self.inspector.reset();
        }
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.frame.viewport
    }

    /// Requests vector display; a no-op while no series exists.
    pub fn set_vector_mode(&mut self, enabled: bool) -> ModeChange {
        let change = self.frame.mode.set_vector_mode(enabled);
        self.after_mode_change(change);
        change
    }

    pub fn toggle_vector_mode(&mut self) -> ModeChange {
        let change = self.frame.mode.toggle();
        self.after_mode_change(change);
        change
    }

    fn after_mode_change(&mut self, change: ModeChange) {
        if change.changed() {
            trace!(from = ?change.previous, to = ?change.current, "display mode changed");
            self.inspector.on_pointer_up();
        }
    }

    #[must_use]
    pub fn display_mode(&self) -> DisplayMode {
        self.frame.mode.active()
    }

    #[must_use]
    pub fn ruler_enabled(&self) -> bool {
        self.frame.mode.ruler_enabled()
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.frame.clock.now()
    }

    /// Feeds one pointer event to the state machine.
    pub fn handle_event(&mut self, event: PointerEvent) -> InteractionMode {
        let ctx = self.frame.mapping_context();
        self.inspector.handle(event, &ctx)
    }

    pub fn pointer_enter(&mut self, x: f64, y: f64) -> InteractionMode {
        self.handle_event(PointerEvent::enter(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> InteractionMode {
        self.handle_event(PointerEvent::moved(x, y))
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> InteractionMode {
        self.handle_event(PointerEvent::down(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> InteractionMode {
        self.handle_event(PointerEvent::up(x, y))
    }

    pub fn pointer_leave(&mut self) -> InteractionMode {
        self.handle_event(PointerEvent::leave())
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.inspector.mode()
    }

    #[must_use]
    pub fn pointer_state(&self) -> InspectorPointerState {
        self.inspector.pointer()
    }

    #[must_use]
    pub fn cursor(&self) -> CursorState {
        self.inspector.cursor()
    }

    #[must_use]
    pub fn readout(&self) -> Option<&Readout> {
        self.inspector.readout()
    }

    #[must_use]
    pub fn measurement(&self) -> Option<Measurement> {
        self.inspector.measurement()
    }

    #[must_use]
    pub fn calibration(&self) -> Calibration {
        self.frame.calibration
    }

    #[must_use]
    pub fn calibration_status(&self) -> CalibrationStatus {
        CalibrationStatus::from(self.frame.calibration)
    }

    #[must_use]
    pub fn is_using_default_calibration(&self) -> bool {
        self.frame.calibration.is_default()
    }

    #[must_use]
    pub fn cycle(&self) -> Option<CycleId> {
        self.cycle
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub fn signal(&self) -> Option<&TradingSignal> {
        self.signal.as_deref()
    }

    #[must_use]
    pub fn series(&self) -> Option<&VectorSeries> {
        self.frame.store.series()
    }

    /// Price under pixel Y with the active calibration.
    #[must_use]
    pub fn map_pixel_to_price(&self, y: f64) -> f64 {
        PriceScale::new(self.frame.calibration.bounds()).price_at(y, self.frame.viewport.height_px())
    }

    /// Wall-clock time under pixel X.
    #[must_use]
    pub fn map_pixel_to_time(&self, x: f64) -> DateTime<FixedOffset> {
        self.frame.lookback.time_at(x, self.frame.viewport.width_px(), self.now())
    }

    /// Readout for an arbitrary position without touching pointer state.
    #[must_use]
    pub fn readout_at(&self, x: f64, y: f64) -> Readout {
        let ctx = self.frame.mapping_context();
        ctx.readout_at(self.frame.viewport.clamp(PixelPoint::new(x, y)))
    }

    /// Series geometry in viewport pixels; empty without a series.
    #[must_use]
    pub fn projected_series(&self) -> Vec<PixelPoint> {
        self.frame.store
            .series()
            .map(|series| project_series(series, self.frame.viewport))
            .unwrap_or_default()
    }

    /// Projects the signal's stop-loss/take-profit onto the viewport.
    pub fn signal_levels(&self) -> InspectorResult<SignalLevels> {
        let Some(signal) = self.signal.as_deref() else {
            return Ok(SignalLevels::default());
        };
        if !self.frame.viewport.is_valid() {
            return Err(InspectorError::InvalidViewport {
                width: self.frame.viewport.width,
                height: self.frame.viewport.height,
            });
        }

        let scale = PriceScale::new(self.frame.calibration.bounds());
        let height = self.frame.viewport.height_px();
        let project = |price: Option<Decimal>, field: &str| -> InspectorResult<Option<f64>> {
            match price {
                Some(price) => Ok(scale.pixel_at(decimal_to_f64(price, field)?, height)),
                None => Ok(None),
            }
        };

        Ok(SignalLevels {
            stop_loss_y: project(signal.stop_loss_price(), "stop loss")?,
            take_profit_y: project(signal.take_profit_price(), "take profit")?,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> InspectorSnapshot {
        InspectorSnapshot {
            viewport: self.frame.viewport,
            cycle: self.cycle,
            is_loading: self.is_loading,
            error: self.error.clone(),
            calibration: self.frame.calibration,
            calibration_status: self.calibration_status(),
            display_mode: self.frame.mode.active(),
            interaction_mode: self.inspector.mode(),
            pointer: self.inspector.pointer(),
            readout: self.inspector.readout().cloned(),
            measurement: self.inspector.measurement(),
            signal: self.signal.as_deref().cloned(),
        }
    }
}
