//! Parsing of raw model text into typed records.
//!
//! Models are asked for bare JSON but frequently wrap it in markdown fences or
//! add a sentence around it, so parsing first strips fences and then falls
//! back to the outermost `{ ... }` object.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::analysis::signal::TradingSignal;
use crate::core::VectorSeries;
use crate::error::AnalysisError;

/// Removes ```` ```json ```` / ```` ``` ```` fences and surrounding whitespace.
#[must_use]
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_owned()
}

fn parse_json_object<T: DeserializeOwned>(text: &str) -> Result<T, String> {
    let cleaned = strip_code_fences(text);
    let direct_err = match serde_json::from_str::<T>(&cleaned) {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    let (Some(open), Some(close)) = (cleaned.find('{'), cleaned.rfind('}')) else {
        return Err(direct_err.to_string());
    };
    if close <= open {
        return Err(direct_err.to_string());
    }
    serde_json::from_str::<T>(&cleaned[open..=close]).map_err(|e| e.to_string())
}

/// Strict signal parse: reports malformed output as `MalformedSignal`.
pub fn try_parse_signal(text: &str) -> Result<TradingSignal, AnalysisError> {
    parse_json_object::<TradingSignal>(text)
        .map(TradingSignal::normalized)
        .map_err(AnalysisError::MalformedSignal)
}

/// Lenient signal parse: malformed output degrades to
/// [`TradingSignal::parse_fallback`].
#[must_use]
pub fn parse_signal(text: &str) -> TradingSignal {
    match try_parse_signal(text) {
        Ok(signal) => signal,
        Err(err) => {
            warn!(error = %err, output_len = text.len(), "substituting neutral fallback signal");
            TradingSignal::parse_fallback()
        }
    }
}

/// Parses digitizer output.
///
/// Empty point lists and invalid bounds count as no usable series.
pub fn parse_series(text: &str) -> Result<VectorSeries, AnalysisError> {
    let series = parse_json_object::<VectorSeries>(text)
        .map_err(AnalysisError::DigitizationUnavailable)?;
    if series.is_empty() {
        return Err(AnalysisError::DigitizationUnavailable(
            "digitizer returned no points".to_owned(),
        ));
    }
    series
        .bounds()
        .map_err(|err| AnalysisError::DigitizationUnavailable(err.to_string()))?;
    Ok(series)
}
