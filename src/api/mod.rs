//! Session facade: wires the analysis output into the series store, the mode
//! switch and the pointer state machine.

mod clock;
mod engine;
mod engine_config;
mod engine_snapshot;
mod json_contract;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{ChartInspector, SignalLevels};
pub use engine_config::InspectorConfig;
pub use engine_snapshot::InspectorSnapshot;
pub use json_contract::{INSPECTOR_SNAPSHOT_JSON_SCHEMA_V1, InspectorSnapshotJsonContractV1};
