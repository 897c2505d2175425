// ABOUTME: Core data model for the repetition-counting engine
// ABOUTME: Samples, calibrated baselines, counter states, and session summaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

use crate::config::HysteresisConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One timestamped sensor reading.
///
/// The magnitude is whichever scalar the sensor variant produces:
/// face-bounding-box area for the camera variant, acceleration vector
/// length for the accelerometer variant. Auxiliary channels are only
/// present where the sensor provides them.
///
/// Invariants the sample feed is expected to uphold: magnitude is
/// finite and non-negative, timestamps are monotonically non-decreasing
/// within a session. The engine does not clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Milliseconds on the sample feed's monotonic clock
    pub timestamp_ms: u64,
    /// Scalar magnitude driving detection
    pub magnitude: f64,
    /// Probability the left eye is open, `[0, 1]`, camera variant only
    pub left_eye_open: Option<f64>,
    /// Probability the right eye is open, `[0, 1]`, camera variant only
    pub right_eye_open: Option<f64>,
    /// Whether the device is lying flat; accelerometer variant only,
    /// defaults true elsewhere
    pub device_is_flat: bool,
}

impl Sample {
    /// Bare sample with no auxiliary channels (flatness defaults true)
    #[must_use]
    pub const fn from_magnitude(timestamp_ms: u64, magnitude: f64) -> Self {
        Self {
            timestamp_ms,
            magnitude,
            left_eye_open: None,
            right_eye_open: None,
            device_is_flat: true,
        }
    }

    /// Attach camera eye-open probabilities
    #[must_use]
    pub const fn with_eye_probabilities(mut self, left: f64, right: f64) -> Self {
        self.left_eye_open = Some(left);
        self.right_eye_open = Some(right);
        self
    }

    /// Attach a device-flatness reading
    #[must_use]
    pub const fn with_flatness(mut self, device_is_flat: bool) -> Self {
        self.device_is_flat = device_is_flat;
        self
    }
}

/// The calibrated resting magnitude and its derived thresholds.
///
/// Computed once per successful calibration; immutable until the next
/// session reset. `baseline_magnitude` is guaranteed positive and
/// finite by the calibration collector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    /// Trimmed-mean resting magnitude
    pub baseline_magnitude: f64,
    /// Signal must exceed this to register a down phase
    pub down_threshold: f64,
    /// Signal must drop below this to register an up phase
    pub up_threshold: f64,
}

impl Baseline {
    /// Derive thresholds from a calibrated magnitude
    #[must_use]
    pub fn derive(baseline_magnitude: f64, config: &HysteresisConfig) -> Self {
        Self {
            baseline_magnitude,
            down_threshold: baseline_magnitude * config.down_threshold_multiplier,
            up_threshold: baseline_magnitude * config.up_threshold_multiplier,
        }
    }
}

/// Externally visible state of a counting session.
///
/// `Up` and `Down` are only reachable after a successful calibration.
/// There is no terminal state: a session ends by external save or
/// cancellation, not through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CounterState {
    /// Collecting baseline samples; countdown is externally driven at 1 Hz
    Calibrating {
        /// Seconds remaining before calibration is evaluated
        countdown: u8,
        /// Usable samples accumulated so far
        samples_so_far: usize,
    },
    /// Signal is at or near baseline (exercise top position)
    Up,
    /// Signal has crossed the down threshold (exercise bottom position)
    Down,
}

/// Result record for a completed session.
///
/// Handed to the external save/XP pipeline; the engine itself persists
/// nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Unique id for the completed session
    pub session_id: Uuid,
    /// Total reps counted
    pub reps: u32,
    /// Wall-clock session start (when `start` was called)
    pub started_at: DateTime<Utc>,
    /// Wall-clock session end (when `finish` succeeded)
    pub finished_at: DateTime<Utc>,
    /// Whole seconds between start and finish
    pub duration_seconds: u64,
    /// The baseline the session counted against
    pub baseline: Baseline,
}
