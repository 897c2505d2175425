// ABOUTME: Tests for the calibration collector through its public interface
// ABOUTME: Covers trimmed-mean robustness, liveness gating, flatness, and failure taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use repflow::calibration::{CalibrationCollector, SampleDisposition};
use repflow::config::{CalibrationConfig, HysteresisConfig};
use repflow::errors::CalibrationFailure;
use repflow::models::Sample;

/// Collector without the camera liveness gate (accelerometer variant)
fn collector_without_liveness() -> CalibrationCollector {
    CalibrationCollector::new(CalibrationConfig {
        require_liveness: false,
        ..CalibrationConfig::default()
    })
}

/// Collector with the camera liveness gate (face-proximity variant)
fn collector_with_liveness() -> CalibrationCollector {
    CalibrationCollector::new(CalibrationConfig::default())
}

fn feed_magnitudes(collector: &mut CalibrationCollector, magnitudes: &[f64]) {
    for (i, &magnitude) in magnitudes.iter().enumerate() {
        collector.record_sample(&Sample::from_magnitude(i as u64 * 33, magnitude));
    }
}

#[test]
fn test_trimmed_mean_ignores_extreme_outliers() {
    let mut collector = collector_without_liveness();

    // 16 samples clustered tightly around 100, 4 extreme outliers at
    // 10x. The trim must keep the baseline inside the cluster.
    let mut magnitudes = vec![
        98.0, 99.0, 99.5, 100.0, 100.0, 100.5, 101.0, 101.5, 102.0, 102.5, 103.0, 98.5, 99.25,
        100.75, 101.25, 102.25,
    ];
    magnitudes.extend([1000.0, 1000.0, 1000.0, 1000.0]);
    feed_magnitudes(&mut collector, &magnitudes);

    let baseline = collector
        .finish(&HysteresisConfig::default())
        .expect("20 samples without liveness gate should calibrate");

    assert!(
        (98.0..=103.0).contains(&baseline.baseline_magnitude),
        "baseline {} was skewed outside the tight cluster",
        baseline.baseline_magnitude
    );
}

#[test]
fn test_thresholds_derived_from_baseline() {
    let mut collector = collector_without_liveness();
    feed_magnitudes(&mut collector, &[100.0; 12]);

    let baseline = collector.finish(&HysteresisConfig::default()).unwrap();
    assert_eq!(baseline.baseline_magnitude, 100.0);
    assert_eq!(baseline.down_threshold, 150.0, "down = baseline x 1.5");
    assert_eq!(baseline.up_threshold, 120.0, "up = baseline x 1.2");
}

#[test]
fn test_insufficient_samples_rejected() {
    let mut collector = collector_without_liveness();
    feed_magnitudes(&mut collector, &[100.0; 10]);

    let failure = collector.finish(&HysteresisConfig::default()).unwrap_err();
    assert_eq!(
        failure,
        CalibrationFailure::InsufficientSamples { got: 10, need: 11 }
    );
}

#[test]
fn test_liveness_gate_blocks_even_with_many_samples() {
    let mut collector = collector_with_liveness();

    // 50 valid frames, eyes open in every single one: a static photo
    // would look exactly like this.
    for i in 0..50_u64 {
        collector.record_sample(
            &Sample::from_magnitude(i * 33, 100.0).with_eye_probabilities(0.95, 0.95),
        );
    }

    assert!(collector.has_seen_eyes_open());
    assert!(!collector.has_seen_eyes_closed());

    let failure = collector.finish(&HysteresisConfig::default()).unwrap_err();
    assert_eq!(
        failure,
        CalibrationFailure::LivenessNotDemonstrated {
            seen_open: true,
            seen_closed: false,
        }
    );
}

#[test]
fn test_blink_during_calibration_satisfies_liveness() {
    let mut collector = collector_with_liveness();

    for i in 0..10_u64 {
        collector.record_sample(
            &Sample::from_magnitude(i * 33, 100.0).with_eye_probabilities(0.9, 0.85),
        );
    }
    // One blink frame
    collector.record_sample(&Sample::from_magnitude(330, 100.0).with_eye_probabilities(0.1, 0.2));
    collector.record_sample(&Sample::from_magnitude(363, 100.0).with_eye_probabilities(0.9, 0.9));

    assert!(collector.finish(&HysteresisConfig::default()).is_ok());
}

#[test]
fn test_one_eye_closed_marks_neither_flag() {
    let mut collector = collector_with_liveness();

    // Winking: one eye above the open threshold, one below the closed
    // threshold. Both-eyes rules mean neither flag may flip.
    collector.record_sample(&Sample::from_magnitude(0, 100.0).with_eye_probabilities(0.9, 0.1));

    assert!(!collector.has_seen_eyes_open());
    assert!(!collector.has_seen_eyes_closed());
}

#[test]
fn test_not_flat_sample_is_not_accumulated() {
    let mut collector = collector_without_liveness();

    let disposition =
        collector.record_sample(&Sample::from_magnitude(0, 100.0).with_flatness(false));
    assert_eq!(disposition, SampleDisposition::NotFlat);
    assert_eq!(collector.samples_so_far(), 0);
}

#[test]
fn test_not_flat_at_finish_rejects_calibration() {
    let mut collector = collector_without_liveness();
    feed_magnitudes(&mut collector, &[100.0; 12]);

    // Device tips over right before the countdown expires
    collector.record_sample(&Sample::from_magnitude(999, 100.0).with_flatness(false));

    let failure = collector.finish(&HysteresisConfig::default()).unwrap_err();
    assert_eq!(failure, CalibrationFailure::NotFlat);
}

#[test]
fn test_all_zero_magnitudes_yield_degenerate_baseline() {
    let mut collector = collector_without_liveness();
    feed_magnitudes(&mut collector, &[0.0; 12]);

    let failure = collector.finish(&HysteresisConfig::default()).unwrap_err();
    assert_eq!(failure, CalibrationFailure::DegenerateBaseline);
}

#[test]
fn test_reset_discards_samples_and_liveness_flags() {
    let mut collector = collector_with_liveness();
    for i in 0..12_u64 {
        collector.record_sample(
            &Sample::from_magnitude(i * 33, 100.0).with_eye_probabilities(0.9, 0.9),
        );
    }
    collector.record_sample(&Sample::from_magnitude(400, 100.0).with_eye_probabilities(0.1, 0.1));
    assert!(collector.has_seen_eyes_open());
    assert!(collector.has_seen_eyes_closed());

    collector.reset();
    assert_eq!(collector.samples_so_far(), 0);
    assert!(!collector.has_seen_eyes_open());
    assert!(!collector.has_seen_eyes_closed());
}
