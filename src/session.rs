// ABOUTME: Counter session orchestration: calibration, counting, and completion of one exercise set
// ABOUTME: Routes samples by state, drives the countdown, owns the rep counter, builds the summary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

//! Counter Session
//!
//! One `CounterSession` spans one exercise set: calibration, counting,
//! and completion. The session is single-threaded and synchronous;
//! it holds no timer and performs no I/O. The host drives it from its
//! sensor callback loop:
//!
//! - [`tick`] once per detection frame or sensor reading,
//! - [`advance_countdown`] once per second while calibrating,
//! - [`finish`] on user action or when an external duration goal
//!   expires.
//!
//! All engine state (counter, thresholds, smoothing window,
//! calibration set, liveness flags) is owned here exclusively and is
//! reset together by [`start`].
//!
//! [`tick`]: CounterSession::tick
//! [`advance_countdown`]: CounterSession::advance_countdown
//! [`finish`]: CounterSession::finish
//! [`start`]: CounterSession::start

use crate::calibration::{CalibrationCollector, SampleDisposition};
use crate::config::EngineConfig;
use crate::errors::{CalibrationFailure, ConfigError, SessionError};
use crate::hysteresis::{HysteresisDetector, Phase, PhaseTransition};
use crate::models::{CounterState, Sample, SessionSummary};
use crate::smoothing::SmoothingFilter;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// What one call to [`CounterSession::tick`] did.
///
/// The host reacts to these for presentation only (haptics on
/// `RepCounted`, advisory text on `DeviceNotFlat`); the engine has
/// already applied every state effect by the time it returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Sample accumulated into the calibration set
    CalibrationSampleAccepted,
    /// Sample discarded: device not flat during calibration
    DeviceNotFlat,
    /// Counting sample caused no transition (dead zone or debounce)
    NoChange,
    /// Signal crossed the down threshold
    Descended,
    /// One rep completed; `total` is the new counter value
    RepCounted {
        /// Rep counter after the increment
        total: u32,
    },
}

/// Outcome of one externally driven countdown second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Countdown still running; seconds remaining
    Counting(u8),
    /// Countdown expired and the baseline was accepted; counting began
    Calibrated,
    /// Session is already counting; nothing to advance
    AlreadyCounting,
}

/// Orchestrates one exercise session end to end.
#[derive(Debug)]
pub struct CounterSession {
    config: EngineConfig,
    filter: SmoothingFilter,
    collector: CalibrationCollector,
    detector: Option<HysteresisDetector>,
    countdown: u8,
    reps: u32,
    session_id: Uuid,
    started_at: DateTime<Utc>,
}

impl CounterSession {
    /// Create a session with the given tunables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the config fails validation.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            filter: SmoothingFilter::new(config.smoothing.window_size),
            collector: CalibrationCollector::new(config.calibration.clone()),
            detector: None,
            countdown: config.calibration.countdown_seconds,
            reps: 0,
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
        })
    }

    /// Reset all owned state and enter calibration.
    ///
    /// Always yields a zero counter and a full countdown, regardless
    /// of what the previous session ended as.
    pub fn start(&mut self) {
        self.filter.reset();
        self.collector.reset();
        self.detector = None;
        self.countdown = self.config.calibration.countdown_seconds;
        self.reps = 0;
        self.session_id = Uuid::new_v4();
        self.started_at = Utc::now();
        debug!(session_id = %self.session_id, "session started");
    }

    /// Process one sensor sample.
    ///
    /// While calibrating, the sample feeds the calibration collector.
    /// While counting, its magnitude passes through the smoothing
    /// filter and the result drives the hysteresis detector.
    pub fn tick(&mut self, sample: &Sample) -> TickOutcome {
        let Some(detector) = self.detector.as_mut() else {
            return match self.collector.record_sample(sample) {
                SampleDisposition::Accepted => TickOutcome::CalibrationSampleAccepted,
                SampleDisposition::NotFlat => TickOutcome::DeviceNotFlat,
            };
        };

        let smoothed = self.filter.push(sample.magnitude);
        match detector.evaluate(sample.timestamp_ms, smoothed) {
            None => TickOutcome::NoChange,
            Some(PhaseTransition::Descended) => TickOutcome::Descended,
            Some(PhaseTransition::Rose) => {
                self.reps += 1;
                debug!(
                    session_id = %self.session_id,
                    total = self.reps,
                    "rep counted"
                );
                TickOutcome::RepCounted { total: self.reps }
            }
        }
    }

    /// Advance the externally driven 1 Hz calibration countdown.
    ///
    /// When the countdown reaches zero the collected evidence is
    /// evaluated: on acceptance the session stores the baseline and
    /// enters counting; on rejection all calibration progress is
    /// discarded and the countdown restarts from its configured
    /// length. A no-op once the session is counting.
    ///
    /// # Errors
    ///
    /// Returns the [`CalibrationFailure`] that caused a restart, after
    /// the restart has already been applied; the session remains
    /// usable and is collecting again.
    pub fn advance_countdown(&mut self) -> Result<CountdownStatus, CalibrationFailure> {
        if self.detector.is_some() {
            return Ok(CountdownStatus::AlreadyCounting);
        }

        self.countdown = self.countdown.saturating_sub(1);
        if self.countdown > 0 {
            return Ok(CountdownStatus::Counting(self.countdown));
        }

        match self.collector.finish(&self.config.hysteresis) {
            Ok(baseline) => {
                self.detector = Some(HysteresisDetector::new(
                    baseline,
                    self.config.hysteresis.clone(),
                ));
                self.filter.reset();
                Ok(CountdownStatus::Calibrated)
            }
            Err(failure) => {
                // Restart-from-scratch: partial progress is discarded,
                // including on the not-flat path
                self.collector.reset();
                self.countdown = self.config.calibration.countdown_seconds;
                Err(failure)
            }
        }
    }

    /// Reps counted so far
    #[must_use]
    pub const fn current_count(&self) -> u32 {
        self.reps
    }

    /// Externally visible session state
    #[must_use]
    pub fn current_state(&self) -> CounterState {
        self.detector.as_ref().map_or(
            CounterState::Calibrating {
                countdown: self.countdown,
                samples_so_far: self.collector.samples_so_far(),
            },
            |detector| match detector.phase() {
                Phase::Up => CounterState::Up,
                Phase::Down => CounterState::Down,
            },
        )
    }

    /// Complete the session and build its summary.
    ///
    /// Callers with a time-based goal pass `min_reps = 0` to make the
    /// rep minimum inapplicable. Failing does not end the session; the
    /// caller may keep ticking and finish again.
    ///
    /// # Errors
    ///
    /// - [`SessionError::StillCalibrating`] if no calibration has
    ///   succeeded yet
    /// - [`SessionError::TooFewReps`] if fewer than `min_reps` were
    ///   counted
    pub fn finish(&self, min_reps: u32) -> Result<SessionSummary, SessionError> {
        let Some(detector) = self.detector.as_ref() else {
            return Err(SessionError::StillCalibrating);
        };

        if self.reps < min_reps {
            return Err(SessionError::TooFewReps {
                counted: self.reps,
                required: min_reps,
            });
        }

        let finished_at = Utc::now();
        let duration_seconds = u64::try_from(
            finished_at
                .signed_duration_since(self.started_at)
                .num_seconds()
                .max(0),
        )
        .unwrap_or(0);

        debug!(
            session_id = %self.session_id,
            reps = self.reps,
            duration_seconds,
            "session finished"
        );

        Ok(SessionSummary {
            session_id: self.session_id,
            reps: self.reps,
            started_at: self.started_at,
            finished_at,
            duration_seconds,
            baseline: detector.baseline(),
        })
    }
}
