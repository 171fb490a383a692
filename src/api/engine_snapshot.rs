use serde::{Deserialize, Serialize};

use crate::analysis::{CycleId, TradingSignal};
use crate::core::{Calibration, Viewport};
use crate::interaction::{
    CalibrationStatus, DisplayMode, InspectorPointerState, InteractionMode, Measurement, Readout,
};

/// Serializable deterministic snapshot of an inspector session, used by
/// regression tests and debugging tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectorSnapshot {
    pub viewport: Viewport,
    pub cycle: Option<CycleId>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub calibration: Calibration,
    pub calibration_status: CalibrationStatus,
    pub display_mode: DisplayMode,
    pub interaction_mode: InteractionMode,
    pub pointer: InspectorPointerState,
    pub readout: Option<Readout>,
    pub measurement: Option<Measurement>,
    pub signal: Option<TradingSignal>,
}
