// ABOUTME: Typed error taxonomy for the repetition-counting engine
// ABOUTME: Calibration, session, and configuration failures; all recoverable, none fatal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

//! # Engine Error Taxonomy
//!
//! Every failure in this subsystem is a refusal to transition state,
//! never a fatal condition: the session stays usable after any error.
//! The engine never logs a user-visible message, never performs I/O,
//! and never retries: it returns one of these typed values and lets
//! the session driver decide what the user sees.

use serde::Serialize;
use thiserror::Error;

/// Why a calibration attempt was rejected at countdown expiry.
///
/// Recovery is always the same: clear the calibration set and liveness
/// flags, restart the countdown from its configured length, collect
/// again. Calibration is restart-from-scratch, not resumable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum CalibrationFailure {
    /// Device was not lying flat at the moment the countdown expired
    #[error("device was not flat when calibration finished; countdown restarted")]
    NotFlat,

    /// Too few usable samples were collected during the countdown
    #[error("calibration collected {got} samples, need at least {need}")]
    InsufficientSamples {
        /// Samples actually accumulated
        got: usize,
        /// Configured minimum
        need: usize,
    },

    /// The liveness gate never saw both an eyes-open and an eyes-closed
    /// frame, so a static photo cannot be ruled out
    #[error("liveness not demonstrated: eyes-open seen = {seen_open}, eyes-closed seen = {seen_closed}")]
    LivenessNotDemonstrated {
        /// Whether any frame had both eyes confidently open
        seen_open: bool,
        /// Whether any frame had both eyes confidently closed
        seen_closed: bool,
    },

    /// The trimmed mean of the calibration set was zero or non-finite,
    /// which would poison every downstream threshold ratio
    #[error("calibration produced a degenerate baseline (trimmed mean not positive and finite)")]
    DegenerateBaseline,
}

/// Why a session could not be finished and summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum SessionError {
    /// `finish` was called before any calibration succeeded
    #[error("session is still calibrating; no reps can have been counted yet")]
    StillCalibrating,

    /// Fewer reps were counted than the caller's minimum for a save
    #[error("counted {counted} reps, need at least {required} to finish")]
    TooFewReps {
        /// Reps counted so far
        counted: u32,
        /// Caller-supplied minimum (0 when a time-based goal applies)
        required: u32,
    },
}

/// Rejected engine tunables.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum ConfigError {
    /// A tunable was outside its usable range
    #[error("invalid engine config: {message}")]
    InvalidValue {
        /// Which tunable was rejected and why
        message: String,
    },
}

impl ConfigError {
    /// Build a [`ConfigError::InvalidValue`] from any message
    #[must_use]
    pub fn invalid_value(message: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: message.into(),
        }
    }
}

impl CalibrationFailure {
    /// Short machine-readable code for host-side advisory selection
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NotFlat => "not_flat",
            Self::InsufficientSamples { .. } => "insufficient_samples",
            Self::LivenessNotDemonstrated { .. } => "liveness_not_demonstrated",
            Self::DegenerateBaseline => "degenerate_baseline",
        }
    }
}
