use std::sync::Arc;

use approx::assert_relative_eq;
use chart_lens::analysis::{
    AnalysisState, ChartImage, ImageMime, TradingSignal, merge_signal, parse_series,
    try_parse_signal,
};
use chart_lens::api::{
    ChartInspector, FixedClock, INSPECTOR_SNAPSHOT_JSON_SCHEMA_V1, InspectorConfig,
    InspectorSnapshot,
};
use chart_lens::core::{Calibration, PriceBounds, Viewport, format_time_of_day};
use chart_lens::error::{AnalysisError, InspectorError};
use chart_lens::interaction::{CalibrationStatus, DisplayMode, InteractionMode};
use chrono::{DateTime, FixedOffset};

const SIGNAL_JSON: &str = r#"{
  "action": "BUY",
  "confidence": 78,
  "patterns": [{ "name": "Bullish Engulfing", "type": "bullish", "reliability": "High" }],
  "stopLoss": "16940",
  "takeProfit": "17020",
  "reasoning": "Engulfing confirmed by volume.",
  "isSniperAlert": true,
  "chartMetadata": { "minPrice": 16900, "maxPrice": 17050, "detectedAsset": "DAX" }
}"#;

const SERIES_JSON: &str = r#"{
  "minPrice": 16800,
  "maxPrice": 17100,
  "points": [{ "x": 0, "price": 16850 }, { "x": 50, "price": 16950 }, { "x": 100, "price": 17050 }]
}"#;

fn frozen_now() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-01-15T14:00:00+01:00").expect("valid timestamp")
}

fn inspector() -> ChartInspector {
    ChartInspector::new(InspectorConfig::new(Viewport::new(400, 300)))
        .expect("valid config")
        .with_clock(FixedClock(frozen_now()))
}

fn reasoning_only(cycle: u64) -> AnalysisState {
    let signal = try_parse_signal(SIGNAL_JSON).expect("valid signal");
    AnalysisState::completed(cycle, Arc::new(signal))
}

fn with_series(cycle: u64) -> AnalysisState {
    let signal = try_parse_signal(SIGNAL_JSON).expect("valid signal");
    let series = parse_series(SERIES_JSON).expect("valid series");
    AnalysisState::completed(cycle, Arc::new(merge_signal(signal, Some(series))))
}

#[test]
fn fresh_inspector_reports_placeholder_calibration() {
    let inspector = inspector();

    assert!(inspector.is_using_default_calibration());
    assert_eq!(inspector.calibration_status(), CalibrationStatus::Estimated);
    assert_eq!(inspector.display_mode(), DisplayMode::Raw);
    assert!(inspector.signal().is_none());
    assert!(inspector.projected_series().is_empty());
}

#[test]
fn invalid_config_is_rejected() {
    let config = InspectorConfig::new(Viewport::new(400, 300)).with_lookback_minutes(0);
    assert!(ChartInspector::new(config).is_err());

    let config = InspectorConfig::new(Viewport::new(400, 300)).with_bar_pixel_width(0.0);
    assert!(matches!(ChartInspector::new(config), Err(InspectorError::InvalidData(_))));
}

#[test]
fn reasoning_result_calibrates_raw_mode() {
    let mut inspector = inspector();

    assert!(inspector.apply_analysis(&reasoning_only(1)));

    assert!(!inspector.is_using_default_calibration());
    assert_eq!(inspector.calibration_status(), CalibrationStatus::Calibrated);
    assert_eq!(inspector.display_mode(), DisplayMode::Raw);
    assert!(inspector.ruler_enabled());
    assert_eq!(inspector.map_pixel_to_price(0.0), 17_050.0);
    assert_eq!(inspector.map_pixel_to_price(300.0), 16_900.0);
}

#[test]
fn digitized_series_wins_calibration_and_enables_vector_mode() {
    let mut inspector = inspector();

    inspector.apply_analysis(&with_series(1));

    assert_eq!(
        inspector.calibration(),
        Calibration::FromDigitizer(PriceBounds::new(16_800.0, 17_100.0).expect("valid bounds"))
    );
    assert_eq!(inspector.calibration_status(), CalibrationStatus::Digitized);
    assert_eq!(inspector.display_mode(), DisplayMode::Vector);
    assert!(!inspector.ruler_enabled());
    assert_eq!(inspector.projected_series().len(), 3);

    inspector.pointer_enter(200.0, 150.0);
    assert_eq!(inspector.pointer_down(200.0, 150.0), InteractionMode::Hovering);
    assert!(inspector.measurement().is_none());

    let readout = inspector.readout().expect("readout");
    assert_eq!(readout.price, 16_950.0);
    assert_relative_eq!(readout.series_price.expect("series price"), 16_950.0);
}

#[test]
fn vector_request_without_series_keeps_raw_mode() {
    let mut inspector = inspector();
    inspector.apply_analysis(&reasoning_only(1));

    let change = inspector.set_vector_mode(true);

    assert!(!change.changed());
    assert_eq!(inspector.display_mode(), DisplayMode::Raw);
}

#[test]
fn mode_switch_cancels_an_active_drag() {
    let mut inspector = inspector();
    inspector.apply_analysis(&with_series(1));
    inspector.toggle_vector_mode();
    assert_eq!(inspector.display_mode(), DisplayMode::Raw);

    inspector.pointer_enter(100.0, 300.0);
    inspector.pointer_down(100.0, 300.0);
    inspector.pointer_move(100.0, 0.0);
    assert!(inspector.measurement().is_some());

    let change = inspector.set_vector_mode(true);

    assert!(change.changed());
    assert_eq!(inspector.interaction_mode(), InteractionMode::Idle);
    assert!(inspector.measurement().is_none());
    assert!(!inspector.pointer_state().drag.dragging);
    assert!(inspector.cursor().visible);
}

#[test]
fn ruler_measures_in_raw_mode() {
    let mut inspector = inspector();
    inspector.apply_analysis(&reasoning_only(1));

    inspector.pointer_down(100.0, 300.0);
    inspector.pointer_move(100.0, 0.0);

    let measurement = inspector.measurement().expect("measurement");
    assert_eq!(measurement.delta, 150.0);
    assert_eq!(measurement.label(), "+150.00 (+0.89%)");

    assert_eq!(inspector.pointer_up(100.0, 0.0), InteractionMode::Idle);
    assert!(inspector.measurement().is_none());
}

#[test]
fn failed_cycle_clears_signal_and_calibration() {
    let mut inspector = inspector();
    inspector.apply_analysis(&with_series(1));

    let error = AnalysisError::AnalysisFailed("quota exceeded".to_owned());
    assert!(inspector.apply_analysis(&AnalysisState::failed(2, &error)));

    assert!(inspector.signal().is_none());
    assert!(inspector.series().is_none());
    assert!(inspector.error().expect("error").contains("quota exceeded"));
    assert!(inspector.is_using_default_calibration());
    assert_eq!(inspector.display_mode(), DisplayMode::Raw);
}

#[test]
fn loading_state_drops_previous_result() {
    let mut inspector = inspector();
    inspector.apply_analysis(&with_series(1));

    inspector.apply_analysis(&AnalysisState::loading(2));

    assert!(inspector.is_loading());
    assert!(inspector.signal().is_none());
    assert_eq!(inspector.cycle(), Some(2));
}

#[test]
fn state_from_older_cycle_is_ignored() {
    let mut inspector = inspector();
    inspector.apply_analysis(&reasoning_only(2));

    assert!(!inspector.apply_analysis(&with_series(1)));

    assert_eq!(inspector.cycle(), Some(2));
    assert!(inspector.series().is_none());
}

#[test]
fn new_cycle_returns_pointer_to_idle() {
    let mut inspector = inspector();
    inspector.apply_analysis(&reasoning_only(1));
    inspector.pointer_down(10.0, 10.0);

    inspector.apply_analysis(&reasoning_only(2));

    assert_eq!(inspector.interaction_mode(), InteractionMode::Idle);
    assert!(inspector.readout().is_none());
}

#[test]
fn time_readout_uses_lookback_window() {
    let inspector = inspector();

    assert_eq!(format_time_of_day(&inspector.map_pixel_to_time(0.0)), "10:00");
    assert_eq!(format_time_of_day(&inspector.map_pixel_to_time(400.0)), "14:00");
    assert_eq!(inspector.readout_at(200.0, 150.0).time_text, "12:00");
}

#[test]
fn hover_and_readout_at_agree_on_the_series_value() {
    let mut inspector = inspector();
    inspector.apply_analysis(&with_series(1));

    inspector.pointer_enter(100.0, 75.0);
    let hovered = inspector.readout().cloned().expect("hover readout");
    assert_eq!(hovered, inspector.readout_at(100.0, 75.0));
    assert_relative_eq!(hovered.series_price.expect("series price"), 16_900.0);

    inspector.pointer_move(520.0, 75.0);
    let clamped = inspector.readout().cloned().expect("hover readout");
    assert_eq!(clamped, inspector.readout_at(520.0, 75.0));
    assert_relative_eq!(clamped.series_price.expect("series price"), 17_050.0);
}

#[test]
fn signal_levels_project_onto_viewport() {
    let mut inspector = inspector();
    assert_eq!(inspector.signal_levels().expect("no signal").stop_loss_y, None);

    inspector.apply_analysis(&reasoning_only(1));
    let levels = inspector.signal_levels().expect("levels");

    assert_relative_eq!(levels.stop_loss_y.expect("stop"), 220.0, epsilon = 1e-9);
    assert_relative_eq!(levels.take_profit_y.expect("target"), 60.0, epsilon = 1e-9);
}

#[test]
fn dotted_thousands_levels_land_inside_the_band() {
    let mut inspector = inspector();
    let signal = try_parse_signal(
        r#"{"action": "VENTA", "stopLoss": "17.020", "takeProfit": "16.940 pts",
            "chartMetadata": {"minPrice": 16900, "maxPrice": 17050}}"#,
    )
    .expect("valid signal");
    inspector.apply_analysis(&AnalysisState::completed(1, Arc::new(signal)));

    let levels = inspector.signal_levels().expect("levels");

    assert_relative_eq!(levels.stop_loss_y.expect("stop"), 60.0, epsilon = 1e-9);
    assert_relative_eq!(levels.take_profit_y.expect("target"), 220.0, epsilon = 1e-9);
}

#[test]
fn signal_levels_require_laid_out_viewport() {
    let mut inspector = inspector();
    inspector.apply_analysis(&reasoning_only(1));
    inspector.set_viewport(Viewport::new(0, 0));

    assert!(matches!(
        inspector.signal_levels(),
        Err(InspectorError::InvalidViewport { width: 0, height: 0 })
    ));
}

#[test]
fn snapshot_json_contract_roundtrip() {
    let mut inspector = inspector();
    inspector.apply_analysis(&with_series(1));
    inspector.pointer_enter(200.0, 150.0);
    let snapshot = inspector.snapshot();

    let contract = snapshot.to_json_contract_v1_pretty().expect("serialize contract");
    assert!(contract.contains(&format!("\"schema_version\": {INSPECTOR_SNAPSHOT_JSON_SCHEMA_V1}")));
    let restored = InspectorSnapshot::from_json_compat_str(&contract).expect("parse contract");
    assert_eq!(restored, snapshot);

    let bare = snapshot.to_json_pretty().expect("serialize snapshot");
    let restored = InspectorSnapshot::from_json_compat_str(&bare).expect("parse bare");
    assert_eq!(restored, snapshot);
}

#[test]
fn snapshot_contract_rejects_unknown_schema() {
    let snapshot = inspector().snapshot();
    let contract = snapshot
        .to_json_contract_v1_pretty()
        .expect("serialize contract")
        .replace("\"schema_version\": 1", "\"schema_version\": 99");

    assert!(InspectorSnapshot::from_json_compat_str(&contract).is_err());
}

#[test]
fn config_json_fills_defaults_and_validates() {
    let config = InspectorConfig::from_json_str("{}").expect("defaults");
    assert_eq!(config, InspectorConfig::default());
    assert_eq!(config.lookback_minutes, 240);
    assert_eq!(config.bar_pixel_width, 10.0);

    let json = config
        .clone()
        .with_lookback_minutes(60)
        .to_json_pretty()
        .expect("serialize config");
    let restored = InspectorConfig::from_json_str(&json).expect("parse config");
    assert_eq!(restored.lookback_minutes, 60);

    assert!(InspectorConfig::from_json_str(r#"{"lookback_minutes": 0}"#).is_err());
    assert!(
        InspectorConfig::from_json_str(
            r#"{"fallback_calibration": {"minPrice": 10, "maxPrice": 5}}"#
        )
        .is_err()
    );
}

#[test]
fn config_fallback_band_replaces_placeholder() {
    let bounds = PriceBounds::new(4_000.0, 4_100.0).expect("valid bounds");
    let inspector = ChartInspector::new(
        InspectorConfig::new(Viewport::new(400, 300)).with_fallback_calibration(bounds),
    )
    .expect("valid config");

    assert_eq!(inspector.calibration(), Calibration::Default(bounds));
    assert_eq!(inspector.map_pixel_to_price(150.0), 4_050.0);
}

#[test]
fn data_url_images_keep_payload_and_mime() {
    let image = ChartImage::from_data_url("data:image/jpeg;base64,QUJD");
    assert_eq!(image.mime(), ImageMime::Jpeg);
    assert_eq!(image.bytes(), b"QUJD");

    let raw = ChartImage::from_data_url("QUJD");
    assert_eq!(raw.mime(), ImageMime::Png);
    assert_eq!(raw.len(), 4);
}

#[test]
fn fallback_signal_keeps_previous_nothing() {
    let mut inspector = inspector();
    inspector.apply_analysis(&with_series(1));

    inspector.apply_analysis(&AnalysisState::completed(
        2,
        Arc::new(TradingSignal::parse_fallback()),
    ));

    assert!(inspector.signal().expect("fallback").is_parse_fallback());
    assert!(inspector.is_using_default_calibration());
    assert!(inspector.series().is_none());
}
