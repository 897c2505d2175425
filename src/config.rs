// ABOUTME: Engine configuration for smoothing, calibration, and hysteresis detection
// ABOUTME: Every tunable the engine exposes, with shipped defaults and degenerate-value validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

//! Engine Configuration
//!
//! Groups every tunable the engine exposes. Defaults match the values
//! the mobile app shipped with; hosts can override any of them by
//! deserializing a JSON blob into [`EngineConfig`] and validating it.

use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Smoothing filter settings
    pub smoothing: SmoothingConfig,
    /// Calibration phase settings
    pub calibration: CalibrationConfig,
    /// Hysteresis detector settings
    pub hysteresis: HysteresisConfig,
}

/// Moving-average smoothing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Number of raw magnitudes averaged per smoothed output
    pub window_size: usize,
}

/// Calibration phase settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Countdown length in seconds; also the restart value after a failure
    pub countdown_seconds: u8,
    /// Minimum accumulated samples for a baseline to be trusted
    pub min_samples: usize,
    /// Fraction trimmed from each tail before averaging (outlier guard)
    pub trim_fraction: f64,
    /// Both eye-open probabilities above this mark an eyes-open frame
    pub eyes_open_threshold: f64,
    /// Both eye-open probabilities below this mark an eyes-closed frame
    pub eyes_closed_threshold: f64,
    /// Whether the eyes-open/eyes-closed liveness gate applies.
    /// False for the accelerometer variant, which has no camera to spoof.
    pub require_liveness: bool,
}

/// Hysteresis detection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HysteresisConfig {
    /// Down threshold as a multiple of the calibrated baseline
    pub down_threshold_multiplier: f64,
    /// Up threshold as a multiple of the calibrated baseline
    pub up_threshold_multiplier: f64,
    /// Minimum milliseconds between accepted state changes
    pub min_state_change_interval_ms: u64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { window_size: 3 }
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            countdown_seconds: 3,
            min_samples: 11,
            trim_fraction: 0.2,
            eyes_open_threshold: 0.7,
            eyes_closed_threshold: 0.4,
            require_liveness: true,
        }
    }
}

impl Default for HysteresisConfig {
    fn default() -> Self {
        Self {
            down_threshold_multiplier: 1.5,
            up_threshold_multiplier: 1.2,
            min_state_change_interval_ms: 600,
        }
    }
}

impl EngineConfig {
    /// Configuration for the face-proximity (push-up) variant.
    ///
    /// Liveness gating is on: a static photo must not calibrate.
    #[must_use]
    pub fn for_face_proximity() -> Self {
        Self::default()
    }

    /// Configuration for the accelerometer variant.
    ///
    /// There is no camera to spoof, so the liveness gate is satisfied
    /// by construction.
    #[must_use]
    pub fn for_accelerometer() -> Self {
        Self {
            calibration: CalibrationConfig {
                require_liveness: false,
                ..CalibrationConfig::default()
            },
            ..Self::default()
        }
    }

    /// Reject tunables that would make the engine degenerate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if:
    /// - the smoothing window is empty
    /// - the countdown is zero or the minimum sample count is zero
    /// - the trim fraction is not in `[0, 0.5)` (trimming half or more
    ///   from each tail leaves nothing to average)
    /// - the eye thresholds are outside `[0, 1]` or the closed
    ///   threshold is not below the open threshold
    /// - the up multiplier is not strictly below the down multiplier
    ///   (the dead zone would collapse and the detector would chatter)
    /// - either multiplier is not positive and finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing.window_size == 0 {
            return Err(ConfigError::invalid_value(
                "smoothing window_size must be at least 1",
            ));
        }

        if self.calibration.countdown_seconds == 0 {
            return Err(ConfigError::invalid_value(
                "calibration countdown_seconds must be at least 1",
            ));
        }

        if self.calibration.min_samples == 0 {
            return Err(ConfigError::invalid_value(
                "calibration min_samples must be at least 1",
            ));
        }

        if !(0.0..0.5).contains(&self.calibration.trim_fraction) {
            return Err(ConfigError::invalid_value(format!(
                "trim_fraction {} must be in [0, 0.5)",
                self.calibration.trim_fraction
            )));
        }

        let open = self.calibration.eyes_open_threshold;
        let closed = self.calibration.eyes_closed_threshold;
        if !(0.0..=1.0).contains(&open) || !(0.0..=1.0).contains(&closed) {
            return Err(ConfigError::invalid_value(format!(
                "eye thresholds (open {open}, closed {closed}) must be probabilities in [0, 1]"
            )));
        }
        if closed >= open {
            return Err(ConfigError::invalid_value(format!(
                "eyes_closed_threshold {closed} must be below eyes_open_threshold {open}"
            )));
        }

        let down = self.hysteresis.down_threshold_multiplier;
        let up = self.hysteresis.up_threshold_multiplier;
        if !down.is_finite() || !up.is_finite() || down <= 0.0 || up <= 0.0 {
            return Err(ConfigError::invalid_value(format!(
                "threshold multipliers (down {down}, up {up}) must be positive and finite"
            )));
        }
        if up >= down {
            return Err(ConfigError::invalid_value(format!(
                "up_threshold_multiplier {up} must be strictly below down_threshold_multiplier {down}"
            )));
        }

        Ok(())
    }
}
