//! Analysis cycle: two concurrent AI passes merged into one [`TradingSignal`].
//!
//! The AI transport lives outside this crate behind [`ReasoningAnalyzer`] and
//! [`ChartDigitizer`]; this module owns parsing, merging, calibration
//! precedence, staleness and alerting.

pub mod model_output;
pub mod orchestrator;
pub mod providers;
pub mod signal;

pub use model_output::{parse_series, parse_signal, strip_code_fences, try_parse_signal};
pub use orchestrator::{
    AnalysisConfig, AnalysisOrchestrator, AnalysisState, CycleId, CycleOptions, CycleOutcome,
    DEFAULT_ANALYSIS_CONTEXT, DEFAULT_CALL_TIMEOUT_MS, merge_signal,
};
pub use providers::{
    AlertSink, ChartDigitizer, ChartImage, ImageMime, NoopAlertSink, ReasoningAnalyzer,
    SniperAlert,
};
pub use signal::{
    DetectedPattern, NOT_AVAILABLE, PARSE_ERROR_REASONING, PatternKind, PatternList,
    Reliability, SignalAction, TradingSignal,
};
