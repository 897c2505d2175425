// ABOUTME: Hysteresis state machine converting smoothed magnitudes into up/down transitions
// ABOUTME: Two-threshold dead zone plus minimum-interval debounce; one rep per down-to-up crossing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

//! Hysteresis Detection
//!
//! A single threshold would chatter whenever the signal hovers near
//! the boundary. Two thresholds (down at 1.5x baseline, up at 1.2x by
//! default) create a dead zone the signal must fully cross in each
//! direction before a transition is accepted. On top of that, a
//! minimum interval between accepted transitions debounces genuine
//! crossings that arrive implausibly fast for a human movement.

use crate::config::HysteresisConfig;
use crate::models::Baseline;
use tracing::debug;

/// Which movement phase the detector is in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// At or near baseline; ready to descend
    Up,
    /// Past the down threshold; ready to rise
    Down,
}

/// An accepted phase change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseTransition {
    /// The signal crossed the down threshold
    Descended,
    /// The signal returned below the up threshold, completing one rep
    Rose,
}

/// Post-calibration up/down detector.
///
/// Each session owns exactly one detector, created from the session's
/// calibrated [`Baseline`]. Samples that cross no threshold, or that
/// arrive before the debounce interval has elapsed, are discarded
/// without effect.
#[derive(Debug, Clone)]
pub struct HysteresisDetector {
    config: HysteresisConfig,
    baseline: Baseline,
    phase: Phase,
    last_transition_ms: Option<u64>,
}

impl HysteresisDetector {
    /// Create a detector in the `Up` phase over a calibrated baseline
    #[must_use]
    pub const fn new(baseline: Baseline, config: HysteresisConfig) -> Self {
        Self {
            config,
            baseline,
            phase: Phase::Up,
            last_transition_ms: None,
        }
    }

    /// Evaluate one smoothed magnitude.
    ///
    /// Returns the transition this sample caused, if any. The caller
    /// counts a rep on every [`PhaseTransition::Rose`].
    pub fn evaluate(&mut self, timestamp_ms: u64, smoothed_magnitude: f64) -> Option<PhaseTransition> {
        if !self.debounce_elapsed(timestamp_ms) {
            return None;
        }

        let transition = match self.phase {
            Phase::Up if smoothed_magnitude > self.baseline.down_threshold => {
                self.phase = Phase::Down;
                Some(PhaseTransition::Descended)
            }
            Phase::Down if smoothed_magnitude < self.baseline.up_threshold => {
                self.phase = Phase::Up;
                Some(PhaseTransition::Rose)
            }
            Phase::Up | Phase::Down => None,
        };

        if let Some(t) = transition {
            self.last_transition_ms = Some(timestamp_ms);
            debug!(
                timestamp_ms,
                smoothed_magnitude,
                transition = ?t,
                "phase transition accepted"
            );
        }

        transition
    }

    /// Whether enough time has passed since the last accepted
    /// transition. The first transition is never debounced.
    fn debounce_elapsed(&self, timestamp_ms: u64) -> bool {
        self.last_transition_ms.is_none_or(|last| {
            timestamp_ms.saturating_sub(last) >= self.config.min_state_change_interval_ms
        })
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The baseline this detector counts against
    #[must_use]
    pub const fn baseline(&self) -> Baseline {
        self.baseline
    }
}
