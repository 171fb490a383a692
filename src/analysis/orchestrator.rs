use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::analysis::model_output::{parse_series, parse_signal};
use crate::analysis::providers::{
    AlertSink, ChartDigitizer, ChartImage, NoopAlertSink, ReasoningAnalyzer, SniperAlert,
};
use crate::analysis::signal::TradingSignal;
use crate::api::InspectorConfig;
use crate::core::{ChartCalibration, VectorSeries};
use crate::error::{AnalysisError, InspectorError, InspectorResult};

/// Monotonic id of an analysis cycle; higher is newer.
pub type CycleId = u64;

pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 60_000;

pub const DEFAULT_ANALYSIS_CONTEXT: &str = "Intraday chart (5 min timeframe). Look for ENGULFING \
     candlestick patterns confirmed by HIGH VOLUME.";

/// Per-call limits and defaults of the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_call_timeout_ms")]
    pub reasoning_timeout_ms: u64,
    #[serde(default = "default_call_timeout_ms")]
    pub digitizer_timeout_ms: u64,
    #[serde(default = "default_analysis_context")]
    pub default_context: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            reasoning_timeout_ms: default_call_timeout_ms(),
            digitizer_timeout_ms: default_call_timeout_ms(),
            default_context: default_analysis_context(),
        }
    }
}

impl AnalysisConfig {
    #[must_use]
    pub fn with_timeouts(mut self, reasoning_ms: u64, digitizer_ms: u64) -> Self {
        self.reasoning_timeout_ms = reasoning_ms;
        self.digitizer_timeout_ms = digitizer_ms;
        self
    }

    pub fn validate(&self) -> InspectorResult<()> {
        if self.reasoning_timeout_ms == 0 || self.digitizer_timeout_ms == 0 {
            return Err(InspectorError::InvalidData(
                "analysis call timeouts must be > 0 ms".to_owned(),
            ));
        }
        Ok(())
    }
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT_MS
}

fn default_analysis_context() -> String {
    DEFAULT_ANALYSIS_CONTEXT.to_owned()
}

/// Per-cycle options; alerting is passed in explicitly rather than read from
/// ambient state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleOptions {
    pub alerts_enabled: bool,
    /// Overrides [`AnalysisConfig::default_context`].
    pub context: Option<String>,
}

impl CycleOptions {
    #[must_use]
    pub fn with_alerts(mut self, enabled: bool) -> Self {
        self.alerts_enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Published view of the latest cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisState {
    pub cycle: Option<CycleId>,
    pub is_loading: bool,
    pub result: Option<Arc<TradingSignal>>,
    pub error: Option<String>,
}

impl AnalysisState {
    #[must_use]
    pub fn loading(cycle: CycleId) -> Self {
        Self {
            cycle: Some(cycle),
            is_loading: true,
            result: None,
            error: None,
        }
    }

    #[must_use]
    pub fn completed(cycle: CycleId, signal: Arc<TradingSignal>) -> Self {
        Self {
            cycle: Some(cycle),
            is_loading: false,
            result: Some(signal),
            error: None,
        }
    }

    #[must_use]
    pub fn failed(cycle: CycleId, error: &AnalysisError) -> Self {
        Self {
            cycle: Some(cycle),
            is_loading: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Completed(Arc<TradingSignal>),
    Failed(AnalysisError),
    /// A newer cycle started before this one settled; nothing was published.
    Stale { cycle: CycleId, latest: CycleId },
}

impl CycleOutcome {
    #[must_use]
    pub fn signal(&self) -> Option<&Arc<TradingSignal>> {
        match self {
            Self::Completed(signal) => Some(signal),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

/// Attaches a digitized series to a reasoning signal.
///
/// The series bounds overwrite the reasoning calibration bounds (metadata is
/// created when the reasoning pass produced none); the detected asset is kept.
#[must_use]
pub fn merge_signal(mut signal: TradingSignal, series: Option<VectorSeries>) -> TradingSignal {
    let Some(series) = series else {
        return signal;
    };

    match signal.chart_metadata.as_mut() {
        Some(metadata) => {
            metadata.min_price = series.min_price;
            metadata.max_price = series.max_price;
        }
        None => {
            signal.chart_metadata = Some(ChartCalibration::new(series.min_price, series.max_price));
        }
    }
    signal.vector_data = Some(Arc::new(series));
    signal
}

/// Runs the reasoning and digitizer passes concurrently and publishes the
/// merged signal of the newest cycle.
pub struct AnalysisOrchestrator<R, D, A = NoopAlertSink> {
    reasoning: R,
    digitizer: D,
    alerts: A,
    config: AnalysisConfig,
    latest_cycle: AtomicU64,
    state: watch::Sender<AnalysisState>,
}

impl<R, D> AnalysisOrchestrator<R, D, NoopAlertSink>
where
    R: ReasoningAnalyzer,
    D: ChartDigitizer,
{
    #[must_use]
    pub fn without_alerts(reasoning: R, digitizer: D, config: AnalysisConfig) -> Self {
        Self::new(reasoning, digitizer, NoopAlertSink, config)
    }
}

impl<R, D, A> AnalysisOrchestrator<R, D, A>
where
    R: ReasoningAnalyzer,
    D: ChartDigitizer,
    A: AlertSink,
{
    #[must_use]
    pub fn new(reasoning: R, digitizer: D, alerts: A, config: AnalysisConfig) -> Self {
        let (state, _) = watch::channel(AnalysisState::default());
        Self {
            reasoning,
            digitizer,
            alerts,
            config,
            latest_cycle: AtomicU64::new(0),
            state,
        }
    }

    /// Builds the orchestrator with the `analysis` section of a session config.
    #[must_use]
    pub fn from_config(config: &InspectorConfig, reasoning: R, digitizer: D, alerts: A) -> Self {
        Self::new(reasoning, digitizer, alerts, config.analysis.clone())
    }

    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AnalysisState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> AnalysisState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn latest_cycle(&self) -> CycleId {
        self.latest_cycle.load(Ordering::SeqCst)
    }

    /// Runs one full cycle for `image`.
    ///
    /// A newer call started before this one settles makes this one stale:
    /// its result is returned as [`CycleOutcome::Stale`] and neither published
    /// nor alerted.
    pub async fn run_cycle(&self, image: &ChartImage, options: &CycleOptions) -> CycleOutcome {
        let cycle = self.latest_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        let span = info_span!("analysis_cycle", cycle, image_bytes = image.len());
        self.run_cycle_inner(cycle, image, options)
            .instrument(span)
            .await
    }

    async fn run_cycle_inner(
        &self,
        cycle: CycleId,
        image: &ChartImage,
        options: &CycleOptions,
    ) -> CycleOutcome {
        self.publish(cycle, AnalysisState::loading(cycle));

        let context = options
            .context
            .as_deref()
            .unwrap_or(&self.config.default_context);
        let (reasoning, series) =
            tokio::join!(self.call_reasoning(image, context), self.call_digitizer(image));

        let signal = match reasoning {
            Ok(signal) => signal,
            Err(err) => {
                warn!(error = %err, "analysis cycle failed");
                let latest = self.latest_cycle();
                if !self.publish(cycle, AnalysisState::failed(cycle, &err)) {
                    return CycleOutcome::Stale { cycle, latest };
                }
                return CycleOutcome::Failed(err);
            }
        };

        let signal = Arc::new(merge_signal(signal, series));
        if !self.publish(cycle, AnalysisState::completed(cycle, Arc::clone(&signal))) {
            let latest = self.latest_cycle();
            debug!(latest, "discarding stale analysis result");
            return CycleOutcome::Stale { cycle, latest };
        }

        info!(
            action = %signal.action,
            confidence = signal.confidence,
            vector = signal.has_vector_data(),
            "analysis cycle completed"
        );

        if signal.is_sniper_alert && options.alerts_enabled {
            self.alerts
                .notify(SniperAlert::new(cycle, signal.action, signal.stop_loss.clone()));
        }

        CycleOutcome::Completed(signal)
    }

    async fn call_reasoning(
        &self,
        image: &ChartImage,
        context: &str,
    ) -> Result<TradingSignal, AnalysisError> {
        let limit = self.config.reasoning_timeout_ms;
        match timeout(
            Duration::from_millis(limit),
            self.reasoning.analyze(image, context),
        )
        .await
        {
            Ok(Ok(text)) => Ok(parse_signal(&text)),
            Ok(Err(err)) => Err(AnalysisError::AnalysisFailed(err.to_string())),
            Err(_) => Err(AnalysisError::Timeout {
                call: "reasoning",
                after_ms: limit,
            }),
        }
    }

    /// Every failure mode collapses into "no series"; raw mode stays usable.
    async fn call_digitizer(&self, image: &ChartImage) -> Option<VectorSeries> {
        let limit = self.config.digitizer_timeout_ms;
        let outcome = match timeout(Duration::from_millis(limit), self.digitizer.digitize(image))
            .await
        {
            Ok(Ok(Some(text))) => parse_series(&text),
            Ok(Ok(None)) => Err(AnalysisError::DigitizationUnavailable(
                "digitizer returned nothing".to_owned(),
            )),
            Ok(Err(err)) => Err(AnalysisError::DigitizationUnavailable(err.to_string())),
            Err(_) => Err(AnalysisError::Timeout {
                call: "digitizer",
                after_ms: limit,
            }),
        };

        match outcome {
            Ok(series) => {
                debug!(points = series.len(), "digitizer produced series");
                Some(series)
            }
            Err(err) => {
                warn!(error = %err, "continuing without vector series");
                None
            }
        }
    }

    /// Publishes `state` only while `cycle` is still the newest one.
    ///
    /// The check runs under the watch lock, so a cycle that starts concurrently
    /// either sees this value replaced by its own loading state or makes this
    /// publish a no-op.
    fn publish(&self, cycle: CycleId, state: AnalysisState) -> bool {
        self.state.send_if_modified(|current| {
            if self.latest_cycle.load(Ordering::SeqCst) != cycle {
                return false;
            }
            *current = state;
            true
        })
    }
}
