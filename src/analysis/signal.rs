use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use smallvec::SmallVec;

use crate::core::{ChartCalibration, VectorSeries, parse_price_text};

/// Reasoning text carried by the neutral record substituted for malformed output.
pub const PARSE_ERROR_REASONING: &str = "parse error";

/// Placeholder for missing stop-loss/take-profit levels.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalAction {
    #[serde(alias = "COMPRA")]
    Buy,
    #[serde(alias = "VENTA")]
    Sell,
    #[serde(alias = "ESPERA")]
    Wait,
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Wait => "WAIT",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reliability {
    High,
    Medium,
    Low,
}

/// Candlestick pattern reported by the reasoning pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedPattern {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PatternKind,
    pub reliability: Reliability,
}

pub type PatternList = SmallVec<[DetectedPattern; 4]>;

/// Merged result of one analysis cycle.
///
/// Replaced wholesale on every cycle; the orchestrator publishes it behind an
/// `Arc` and nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingSignal {
    pub action: SignalAction,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub patterns: PatternList,
    #[serde(default = "not_available", deserialize_with = "de_level_text")]
    pub stop_loss: String,
    #[serde(default = "not_available", deserialize_with = "de_level_text")]
    pub take_profit: String,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub is_sniper_alert: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_metadata: Option<ChartCalibration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_data: Option<Arc<VectorSeries>>,
}

impl TradingSignal {
    /// Neutral record used when the reasoning output cannot be parsed.
    #[must_use]
    pub fn parse_fallback() -> Self {
        Self {
            action: SignalAction::Wait,
            confidence: 0.0,
            patterns: PatternList::new(),
            stop_loss: not_available(),
            take_profit: not_available(),
            reasoning: PARSE_ERROR_REASONING.to_owned(),
            is_sniper_alert: false,
            chart_metadata: None,
            vector_data: None,
        }
    }

    /// Clamps confidence into `[0, 100]` (non-finite reads 0).
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self
    }

    #[must_use]
    pub fn is_parse_fallback(&self) -> bool {
        self.action == SignalAction::Wait
            && self.confidence == 0.0
            && self.reasoning == PARSE_ERROR_REASONING
    }

    #[must_use]
    pub fn stop_loss_price(&self) -> Option<Decimal> {
        parse_price_text(&self.stop_loss)
    }

    #[must_use]
    pub fn take_profit_price(&self) -> Option<Decimal> {
        parse_price_text(&self.take_profit)
    }

    #[must_use]
    pub fn has_vector_data(&self) -> bool {
        self.vector_data.is_some()
    }
}

fn not_available() -> String {
    NOT_AVAILABLE.to_owned()
}

/// Accepts levels as text (`"17020"`, `"N/A"`) or bare JSON numbers.
fn de_level_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Level {
        Text(String),
        Number(serde_json::Number),
        Missing(()),
    }

    Ok(match Level::deserialize(deserializer)? {
        Level::Text(text) => text,
        Level::Number(number) => number.to_string(),
        Level::Missing(()) => not_available(),
    })
}
