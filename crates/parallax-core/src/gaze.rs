//! Eye landmarks → raw gaze target in virtual-screen meters.

use crate::config::GazeConfig;
use crate::landmarks::{
    FaceLandmarks, LEFT_EYE_OUTER, LEFT_IRIS_CENTER, RIGHT_EYE_OUTER, RIGHT_IRIS_CENTER,
};

/// Un-smoothed, un-calibrated head position for one video frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawGazeTarget {
    /// Horizontal offset from the screen centre (meters).
    pub x: f32,
    /// Vertical offset from the screen centre (meters).
    pub y: f32,
    /// Render depth, clamped to the configured range.
    pub depth: f32,
    /// Unclamped `K / dist` estimate that scaled `x` and `y`.
    pub range_estimate: f32,
}

#[derive(Debug, Clone, Default)]
pub struct GazeEstimator {
    config: GazeConfig,
}

impl GazeEstimator {
    pub fn new(config: GazeConfig) -> Self {
        Self { config }
    }

    /// Estimates the viewer's head position from one face.
    ///
    /// Returns `None` when the eye landmarks are missing, non-finite, or too
    /// close together to yield a usable depth.
    pub fn estimate(&self, face: &FaceLandmarks, invert_x: bool) -> Option<RawGazeTarget> {
        let left = face.get_or(LEFT_IRIS_CENTER, LEFT_EYE_OUTER)?.xy();
        let right = face.get_or(RIGHT_IRIS_CENTER, RIGHT_EYE_OUTER)?.xy();
        if !left.is_finite() || !right.is_finite() {
            return None;
        }

        let mid = (left + right) * 0.5;
        let nx = (mid.x - 0.5) * 2.0;
        let ny = -(mid.y - 0.5) * 2.0;

        let dist = left.distance(right);
        if dist <= self.config.min_eye_distance {
            return None;
        }
        let range_estimate = self.config.inter_eye_constant / dist;

        let mut x = nx * self.config.sensitivity_x * range_estimate;
        let y = ny * self.config.sensitivity_y * range_estimate;
        if invert_x {
            x = -x;
        }

        let depth = (range_estimate * self.config.depth_scale)
            .clamp(self.config.min_depth, self.config.max_depth);

        Some(RawGazeTarget {
            x,
            y,
            depth,
            range_estimate,
        })
    }
}

/// Skips frames whose video timestamp has already been processed.
#[derive(Debug, Clone, Default)]
pub struct FrameGate {
    last_timestamp: Option<f64>,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and remembers `timestamp` if it differs from the last
    /// admitted one.
    pub fn admit(&mut self, timestamp: f64) -> bool {
        if self.last_timestamp == Some(timestamp) {
            return false;
        }
        self.last_timestamp = Some(timestamp);
        true
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }
}
