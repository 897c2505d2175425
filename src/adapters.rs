// ABOUTME: Sensor adapters mapping raw camera and accelerometer readings into engine samples
// ABOUTME: One engine over an abstract Sample; each variant tags which auxiliary signals it carries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

//! Sensor Adapters
//!
//! The engine is defined over an abstract [`Sample`]: a magnitude plus
//! whichever auxiliary signals the sensor can provide. These adapters
//! map each variant's raw readings into that shape so a single engine
//! implementation serves both the face-proximity push-up counter and
//! the accelerometer rep counter.

use crate::models::Sample;
use serde::{Deserialize, Serialize};

/// Standard gravity in m/s^2
const STANDARD_GRAVITY: f64 = 9.806_65;

/// One face-detection frame from the camera pipeline.
///
/// The bounding-box area is the proximity proxy: the face grows in
/// frame as the user lowers toward the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceFrame {
    /// Milliseconds on the detection pipeline's clock
    pub timestamp_ms: u64,
    /// Detected face bounding-box width in pixels
    pub box_width: f64,
    /// Detected face bounding-box height in pixels
    pub box_height: f64,
    /// Probability the left eye is open, when the detector reports it
    pub left_eye_open_probability: Option<f64>,
    /// Probability the right eye is open, when the detector reports it
    pub right_eye_open_probability: Option<f64>,
}

impl FaceFrame {
    /// Map this frame into an engine sample.
    ///
    /// Magnitude is the bounding-box area. Flatness always reads true:
    /// device orientation is an accelerometer-variant gate.
    #[must_use]
    pub fn to_sample(&self) -> Sample {
        Sample {
            timestamp_ms: self.timestamp_ms,
            magnitude: self.box_width * self.box_height,
            left_eye_open: self.left_eye_open_probability,
            right_eye_open: self.right_eye_open_probability,
            device_is_flat: true,
        }
    }
}

/// One 3-axis accelerometer reading in m/s^2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelReading {
    /// Milliseconds on the sensor's clock
    pub timestamp_ms: u64,
    /// Acceleration along the device x axis
    pub x: f64,
    /// Acceleration along the device y axis
    pub y: f64,
    /// Acceleration along the device z axis
    pub z: f64,
}

/// Tolerances for the dominant-axis flatness check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatnessThresholds {
    /// How far |z| may deviate from standard gravity (m/s^2)
    pub gravity_tolerance: f64,
    /// How large |x| and |y| may be while still counting as flat (m/s^2)
    pub lateral_tolerance: f64,
}

impl Default for FlatnessThresholds {
    fn default() -> Self {
        Self {
            gravity_tolerance: 1.5,
            lateral_tolerance: 1.5,
        }
    }
}

impl AccelReading {
    /// Euclidean length of the acceleration vector
    #[must_use]
    pub fn magnitude(&self) -> f64 {
        self.z
            .mul_add(self.z, self.y.mul_add(self.y, self.x * self.x))
            .sqrt()
    }

    /// Dominant-axis flatness check: gravity sits on z while the
    /// lateral axes stay near zero.
    #[must_use]
    pub fn is_flat(&self, thresholds: &FlatnessThresholds) -> bool {
        (self.z.abs() - STANDARD_GRAVITY).abs() <= thresholds.gravity_tolerance
            && self.x.abs() <= thresholds.lateral_tolerance
            && self.y.abs() <= thresholds.lateral_tolerance
    }

    /// Map this reading into an engine sample.
    ///
    /// No eye channels exist on this variant, so liveness is satisfied
    /// by construction (the engine config disables the gate).
    #[must_use]
    pub fn to_sample(&self, thresholds: &FlatnessThresholds) -> Sample {
        Sample {
            timestamp_ms: self.timestamp_ms,
            magnitude: self.magnitude(),
            left_eye_open: None,
            right_eye_open: None,
            device_is_flat: self.is_flat(thresholds),
        }
    }
}
