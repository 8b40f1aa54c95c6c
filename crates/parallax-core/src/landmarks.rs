//! Face-landmark frames as delivered by the external tracker.
//!
//! A frame is one JSON datagram:
//!
//! ```json
//! {"timestamp": 12.533, "faces": [[{"x": 0.41, "y": 0.52}, ...]]}
//! ```
//!
//! Points are normalised image coordinates in `[0,1]²`, indexed like the
//! 478-point face mesh (iris centres at 468/473).

use crate::Result;
use glam::Vec2;
use serde::Deserialize;

/// Iris centre of the subject's left eye.
pub const LEFT_IRIS_CENTER: usize = 468;
/// Iris centre of the subject's right eye.
pub const RIGHT_IRIS_CENTER: usize = 473;
/// Outer corner of the left eye, used when the iris point is missing.
pub const LEFT_EYE_OUTER: usize = 33;
/// Outer corner of the right eye, used when the iris point is missing.
pub const RIGHT_EYE_OUTER: usize = 263;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Relative depth; carried through but unused by the estimator.
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    #[inline]
    pub fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// All landmarks for a single face.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct FaceLandmarks {
    pub points: Vec<Landmark>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    /// Returns the landmark at `primary`, or `fallback` when the face mesh
    /// was too short to contain it.
    pub fn get_or(&self, primary: usize, fallback: usize) -> Option<&Landmark> {
        self.get(primary).or_else(|| self.get(fallback))
    }
}

/// One detector result for one video frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LandmarkFrame {
    /// Video playback timestamp in seconds.
    pub timestamp: f64,
    #[serde(default)]
    pub faces: Vec<FaceLandmarks>,
}

impl LandmarkFrame {
    /// Decodes a frame from a JSON datagram.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// The face the estimator tracks; extra faces are ignored.
    pub fn primary_face(&self) -> Option<&FaceLandmarks> {
        self.faces.first()
    }
}
