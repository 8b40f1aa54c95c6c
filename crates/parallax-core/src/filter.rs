//! First-order low-pass filter for the rendered eye position.

use glam::Vec3;

/// Exponentially smoothed eye position.
///
/// Each sample moves the estimate a fixed fraction `alpha` of the way toward
/// the new target, so a constant target is approached monotonically and
/// never overshot.
#[derive(Debug, Clone)]
pub struct EyePositionFilter {
    alpha: f32,
    position: Vec3,
}

impl EyePositionFilter {
    pub fn new(initial: Vec3, alpha: f32) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self {
            alpha,
            position: initial,
        }
    }

    /// Blends a calibrated sample `(x, y, depth)` into the estimate.
    pub fn update(&mut self, target: Vec3) -> Vec3 {
        self.position = self.position.lerp(target, self.alpha);
        self.position
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }
}
