// ABOUTME: Calibration collector: baseline sampling, liveness gating, trimmed-mean derivation
// ABOUTME: Decides at countdown expiry whether enough evidence exists for a trustworthy baseline
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

//! Calibration Collection
//!
//! During the countdown the collector accumulates raw magnitudes and
//! watches the auxiliary channels: eye-open probabilities feed the
//! anti-spoofing liveness flags, and a non-flat device suspends
//! accumulation entirely. When the countdown expires, [`finish`]
//! either produces a [`Baseline`] (trimmed mean over the middle of the
//! observed magnitudes, thresholds derived by multiplier) or a typed
//! refusal. Every refusal means restart-from-scratch: the session
//! clears this collector and begins a fresh countdown.
//!
//! [`finish`]: CalibrationCollector::finish

use crate::config::{CalibrationConfig, HysteresisConfig};
use crate::errors::CalibrationFailure;
use crate::models::{Baseline, Sample};
use tracing::{debug, warn};

/// What the collector did with one recorded sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDisposition {
    /// Magnitude accumulated into the calibration set
    Accepted,
    /// Device was not flat; nothing accumulated. The host should show
    /// its "place the device flat" advisory.
    NotFlat,
}

/// Accumulates calibration evidence for one countdown window.
#[derive(Debug, Clone)]
pub struct CalibrationCollector {
    config: CalibrationConfig,
    magnitudes: Vec<f64>,
    has_seen_eyes_open: bool,
    has_seen_eyes_closed: bool,
    device_is_flat: bool,
}

impl CalibrationCollector {
    /// Create an empty collector
    #[must_use]
    pub const fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            magnitudes: Vec::new(),
            has_seen_eyes_open: false,
            has_seen_eyes_closed: false,
            device_is_flat: true,
        }
    }

    /// Record one sample into the calibration set.
    ///
    /// A non-flat sample is not accumulated; the disposition tells the
    /// caller to surface its advisory. Eye probabilities update the
    /// liveness flags: both below the closed threshold marks an
    /// eyes-closed frame, both above the open threshold an eyes-open
    /// frame.
    pub fn record_sample(&mut self, sample: &Sample) -> SampleDisposition {
        self.device_is_flat = sample.device_is_flat;
        if !sample.device_is_flat {
            warn!(
                timestamp_ms = sample.timestamp_ms,
                "calibration sample discarded: device not flat"
            );
            return SampleDisposition::NotFlat;
        }

        self.magnitudes.push(sample.magnitude);

        if let (Some(left), Some(right)) = (sample.left_eye_open, sample.right_eye_open) {
            if left < self.config.eyes_closed_threshold && right < self.config.eyes_closed_threshold
            {
                self.has_seen_eyes_closed = true;
            }
            if left > self.config.eyes_open_threshold && right > self.config.eyes_open_threshold {
                self.has_seen_eyes_open = true;
            }
        }

        SampleDisposition::Accepted
    }

    /// Evaluate the collected evidence once the countdown reaches zero.
    ///
    /// On success the baseline is the trimmed mean of the sorted
    /// magnitudes (the configured fraction discarded from each tail,
    /// so a few bad detection frames cannot skew it) with thresholds
    /// derived from the hysteresis multipliers.
    ///
    /// # Errors
    ///
    /// - [`CalibrationFailure::NotFlat`] if the most recent sample
    ///   reported a non-flat device
    /// - [`CalibrationFailure::InsufficientSamples`] if fewer than the
    ///   configured minimum were accumulated
    /// - [`CalibrationFailure::LivenessNotDemonstrated`] if the gate is
    ///   enabled and either flag is still false
    /// - [`CalibrationFailure::DegenerateBaseline`] if the trimmed mean
    ///   is not positive and finite
    pub fn finish(
        &self,
        hysteresis: &HysteresisConfig,
    ) -> Result<Baseline, CalibrationFailure> {
        if !self.device_is_flat {
            debug!("calibration rejected: device not flat at countdown expiry");
            return Err(CalibrationFailure::NotFlat);
        }

        if self.magnitudes.len() < self.config.min_samples {
            debug!(
                got = self.magnitudes.len(),
                need = self.config.min_samples,
                "calibration rejected: insufficient samples"
            );
            return Err(CalibrationFailure::InsufficientSamples {
                got: self.magnitudes.len(),
                need: self.config.min_samples,
            });
        }

        if self.config.require_liveness
            && !(self.has_seen_eyes_open && self.has_seen_eyes_closed)
        {
            debug!(
                seen_open = self.has_seen_eyes_open,
                seen_closed = self.has_seen_eyes_closed,
                "calibration rejected: liveness not demonstrated"
            );
            return Err(CalibrationFailure::LivenessNotDemonstrated {
                seen_open: self.has_seen_eyes_open,
                seen_closed: self.has_seen_eyes_closed,
            });
        }

        let baseline_magnitude = self.trimmed_mean();
        if !baseline_magnitude.is_finite() || baseline_magnitude <= 0.0 {
            debug!(baseline_magnitude, "calibration rejected: degenerate baseline");
            return Err(CalibrationFailure::DegenerateBaseline);
        }

        let baseline = Baseline::derive(baseline_magnitude, hysteresis);
        debug!(
            baseline_magnitude,
            down_threshold = baseline.down_threshold,
            up_threshold = baseline.up_threshold,
            samples = self.magnitudes.len(),
            "calibration accepted"
        );
        Ok(baseline)
    }

    /// Mean of the middle of the sorted magnitudes, the configured
    /// fraction discarded from each tail.
    fn trimmed_mean(&self) -> f64 {
        let mut sorted = self.magnitudes.clone();
        sorted.sort_unstable_by(f64::total_cmp);

        let trim = (sorted.len() as f64 * self.config.trim_fraction).floor() as usize;
        let middle = &sorted[trim..sorted.len() - trim];
        // trim_fraction < 0.5 keeps the middle non-empty for any
        // non-empty set, and min_samples > 0 rules out the empty set
        let sum: f64 = middle.iter().sum();
        sum / middle.len() as f64
    }

    /// Usable samples accumulated so far
    #[must_use]
    pub fn samples_so_far(&self) -> usize {
        self.magnitudes.len()
    }

    /// Whether any frame showed both eyes confidently open
    #[must_use]
    pub const fn has_seen_eyes_open(&self) -> bool {
        self.has_seen_eyes_open
    }

    /// Whether any frame showed both eyes confidently closed
    #[must_use]
    pub const fn has_seen_eyes_closed(&self) -> bool {
        self.has_seen_eyes_closed
    }

    /// Discard all accumulated evidence for a restart-from-scratch
    pub fn reset(&mut self) {
        self.magnitudes.clear();
        self.has_seen_eyes_open = false;
        self.has_seen_eyes_closed = false;
        self.device_is_flat = true;
    }
}
