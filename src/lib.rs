// ABOUTME: Main library entry point for the Repflow repetition-counting engine
// ABOUTME: Converts noisy sensor magnitudes into calibrated, debounced exercise rep counts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

#![deny(unsafe_code)]

//! # Repflow
//!
//! A pure, in-process repetition-counting engine for sensor-driven
//! exercise tracking. The engine turns a stream of scalar magnitudes
//! (face-bounding-box area from a camera, or accelerometer vector
//! length) into a debounced count of completed repetitions, gated by a
//! calibration phase and a liveness check.
//!
//! ## Pipeline
//!
//! - **Calibration**: samples are collected for a fixed countdown; a
//!   trimmed mean over the middle 60% of observed magnitudes becomes
//!   the baseline, from which the down/up thresholds are derived.
//! - **Smoothing**: a short moving average damps high-frequency sensor
//!   noise before it reaches the detector.
//! - **Hysteresis**: two distinct thresholds (1.5x / 1.2x baseline by
//!   default) create a dead zone the signal must fully cross in each
//!   direction; each down-to-up crossing counts one rep, subject to a
//!   minimum interval between state changes.
//!
//! The engine holds no timers and performs no I/O: the host drives it
//! by calling [`CounterSession::tick`] once per sensor reading and
//! [`CounterSession::advance_countdown`] once per second during
//! calibration, and reads state back through pure accessors.
//!
//! ## Example
//!
//! ```rust
//! use repflow::config::EngineConfig;
//! use repflow::models::Sample;
//! use repflow::session::CounterSession;
//!
//! # fn main() -> Result<(), repflow::errors::ConfigError> {
//! let mut session = CounterSession::new(EngineConfig::for_accelerometer())?;
//! session.start();
//!
//! // Host feeds one sample per sensor callback:
//! session.tick(&Sample::from_magnitude(0, 9.8));
//! # Ok(())
//! # }
//! ```

/// Sensor-specific adapters mapping raw readings into engine samples
pub mod adapters;

/// Calibration collection and baseline derivation
pub mod calibration;

/// Engine tunables and validation
pub mod config;

/// Typed error taxonomy for calibration, session, and config failures
pub mod errors;

/// Hysteresis state machine with debounce
pub mod hysteresis;

/// Core data model: samples, baselines, states, summaries
pub mod models;

/// Full-session orchestration: calibration, counting, completion
pub mod session;

/// Moving-average smoothing filter
pub mod smoothing;

// Re-export the types most hosts need directly
pub use calibration::{CalibrationCollector, SampleDisposition};
pub use config::EngineConfig;
pub use errors::{CalibrationFailure, ConfigError, SessionError};
pub use hysteresis::{HysteresisDetector, PhaseTransition};
pub use models::{Baseline, CounterState, Sample, SessionSummary};
pub use session::{CountdownStatus, CounterSession, TickOutcome};
pub use smoothing::SmoothingFilter;
