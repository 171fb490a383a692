use chart_lens::core::{
    Calibration, CalibrationSource, ChartCalibration, DEFAULT_CALIBRATION, PriceBounds,
    VectorPoint, VectorSeries, resolve_calibration,
};
use chart_lens::error::CalibrationError;

fn series(min: f64, max: f64) -> VectorSeries {
    VectorSeries::new(
        vec![VectorPoint::new(0.0, min), VectorPoint::new(100.0, max)],
        min,
        max,
    )
}

#[test]
fn digitizer_bounds_win_over_reasoning_bounds() {
    let reasoning = ChartCalibration::new(16_900.0, 17_100.0);
    let digitized = series(16_950.0, 17_020.0);

    let calibration = resolve_calibration(Some(&reasoning), Some(&digitized), DEFAULT_CALIBRATION);

    assert_eq!(calibration.source(), CalibrationSource::Digitizer);
    assert_eq!(calibration.bounds().min_price(), 16_950.0);
    assert_eq!(calibration.bounds().max_price(), 17_020.0);
    assert!(calibration.is_measured());
}

#[test]
fn reasoning_bounds_used_without_series() {
    let reasoning = ChartCalibration::new(4_400.0, 4_480.0).with_detected_asset("SP500");

    let calibration = resolve_calibration(Some(&reasoning), None, DEFAULT_CALIBRATION);

    assert_eq!(
        calibration,
        Calibration::FromReasoning(PriceBounds::new(4_400.0, 4_480.0).expect("valid bounds"))
    );
}

#[test]
fn default_band_is_flagged_when_nothing_measured() {
    let calibration = resolve_calibration(None, None, DEFAULT_CALIBRATION);

    assert!(calibration.is_default());
    assert_eq!(calibration.source(), CalibrationSource::Default);
    assert_eq!(calibration.bounds(), DEFAULT_CALIBRATION);
}

#[test]
fn measured_band_equal_to_default_is_not_reported_as_default() {
    let reasoning = ChartCalibration::new(16_900.0, 17_050.0);

    let calibration = resolve_calibration(Some(&reasoning), None, DEFAULT_CALIBRATION);

    assert_eq!(calibration.bounds(), DEFAULT_CALIBRATION);
    assert!(!calibration.is_default());
}

#[test]
fn invalid_digitizer_bounds_fall_through_to_reasoning() {
    let reasoning = ChartCalibration::new(100.0, 200.0);
    let inverted = series(300.0, 250.0);

    let calibration = resolve_calibration(Some(&reasoning), Some(&inverted), DEFAULT_CALIBRATION);

    assert_eq!(calibration.source(), CalibrationSource::Reasoning);
}

#[test]
fn invalid_candidates_everywhere_fall_back_to_default() {
    let flat = ChartCalibration::new(150.0, 150.0);
    let nan = series(f64::NAN, 10.0);
    let fallback = PriceBounds::new(1.0, 2.0).expect("valid bounds");

    let calibration = resolve_calibration(Some(&flat), Some(&nan), fallback);

    assert_eq!(calibration, Calibration::Default(fallback));
}

#[test]
fn price_bounds_reject_non_increasing_range() {
    assert_eq!(
        PriceBounds::new(10.0, 10.0),
        Err(CalibrationError::Invalid {
            min: 10.0,
            max: 10.0
        })
    );
    assert!(PriceBounds::new(10.0, 5.0).is_err());
    assert!(PriceBounds::new(f64::NEG_INFINITY, 5.0).is_err());
}

#[test]
fn price_bounds_deserialization_applies_validation() {
    let ok: PriceBounds =
        serde_json::from_str(r#"{"minPrice": 1.5, "maxPrice": 2.5}"#).expect("valid json");
    assert_eq!(ok.span(), 1.0);

    let err = serde_json::from_str::<PriceBounds>(r#"{"minPrice": 3.0, "maxPrice": 2.0}"#);
    assert!(err.is_err());
}
