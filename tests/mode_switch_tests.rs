use chart_lens::core::{Calibration, DEFAULT_CALIBRATION};
use chart_lens::interaction::{CalibrationStatus, DisplayMode, ModeSwitch};

#[test]
fn vector_request_without_series_is_a_no_op() {
    let mut switch = ModeSwitch::new(false);

    let change = switch.set_vector_mode(true);

    assert!(!change.changed());
    assert_eq!(switch.active(), DisplayMode::Raw);
    assert!(switch.ruler_enabled());
}

#[test]
fn preferred_vector_mode_activates_once_series_arrives() {
    let mut switch = ModeSwitch::default();
    assert_eq!(switch.active(), DisplayMode::Raw);

    let change = switch.set_series_available(true);

    assert!(change.changed());
    assert_eq!(change.current, DisplayMode::Vector);
    assert!(!switch.ruler_enabled());
}

#[test]
fn toggle_flips_between_modes_when_series_exists() {
    let mut switch = ModeSwitch::default();
    switch.set_series_available(true);

    assert_eq!(switch.toggle().current, DisplayMode::Raw);
    assert_eq!(switch.toggle().current, DisplayMode::Vector);
}

#[test]
fn losing_the_series_forces_raw() {
    let mut switch = ModeSwitch::default();
    switch.set_series_available(true);

    let change = switch.set_series_available(false);

    assert_eq!(change.previous, DisplayMode::Vector);
    assert_eq!(change.current, DisplayMode::Raw);
    assert!(!switch.series_available());
}

#[test]
fn raw_choice_survives_a_new_series() {
    let mut switch = ModeSwitch::default();
    switch.set_series_available(true);
    switch.set_vector_mode(false);

    switch.set_series_available(true);

    assert_eq!(switch.active(), DisplayMode::Raw);
}

#[test]
fn calibration_status_follows_source() {
    assert_eq!(
        CalibrationStatus::from(Calibration::Default(DEFAULT_CALIBRATION)),
        CalibrationStatus::Estimated
    );
    assert_eq!(
        CalibrationStatus::from(Calibration::FromReasoning(DEFAULT_CALIBRATION)),
        CalibrationStatus::Calibrated
    );
    assert_eq!(
        CalibrationStatus::from(Calibration::FromDigitizer(DEFAULT_CALIBRATION)),
        CalibrationStatus::Digitized
    );
}
