// ABOUTME: Fixed-window moving-average filter for damping sensor noise
// ABOUTME: Bounded FIFO of recent magnitudes; push returns the current window mean
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Repflow Contributors

use std::collections::VecDeque;

/// Moving-average smoothing filter.
///
/// Holds at most `window_size` raw magnitudes, evicting the oldest
/// first. Until the window fills, the mean is taken over however many
/// samples have arrived, so early output tracks the raw signal rather
/// than being dragged toward zero.
///
/// Deterministic: an identical push sequence reproduces the same output
/// sequence bit for bit (summation order is fixed).
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    window: VecDeque<f64>,
    window_size: usize,
}

impl SmoothingFilter {
    /// Create a filter over the last `window_size` samples.
    ///
    /// `window_size` must be at least 1; `EngineConfig::validate`
    /// enforces this upstream.
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        Self {
            window: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
        }
    }

    /// Append a raw magnitude and return the mean of the current window.
    ///
    /// The caller validates inputs upstream: `raw` is expected finite
    /// and non-negative, and the filter does not clamp.
    pub fn push(&mut self, raw: f64) -> f64 {
        if self.window.len() == self.window_size {
            self.window.pop_front();
        }
        self.window.push_back(raw);

        let sum: f64 = self.window.iter().sum();
        // Window is never empty after a push
        sum / self.window.len() as f64
    }

    /// Whether the window has filled to its configured size
    #[must_use]
    pub fn is_warmed_up(&self) -> bool {
        self.window.len() == self.window_size
    }

    /// Number of samples currently held
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Whether no samples have been pushed since creation or reset
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Drop all held samples, keeping the configured window size
    pub fn reset(&mut self) {
        self.window.clear();
    }
}
