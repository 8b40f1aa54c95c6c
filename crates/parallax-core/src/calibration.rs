//! Re-centring of raw gaze targets around the user's resting position.

use crate::gaze::RawGazeTarget;
use glam::Vec2;

#[derive(Debug, Clone, Default)]
pub struct CalibrationStore {
    offset: Vec2,
    last_raw: Option<Vec2>,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remembers the most recent raw target for a later [`Self::calibrate`].
    pub fn record(&mut self, raw: &RawGazeTarget) {
        self.last_raw = Some(Vec2::new(raw.x, raw.y));
    }

    /// Makes the most recent raw target the new centre. Depth is untouched.
    ///
    /// Returns the new offset, or `None` if no target has been seen yet.
    pub fn calibrate(&mut self) -> Option<Vec2> {
        let last = self.last_raw?;
        self.offset = last;
        log::info!("Calibrated centre to ({:.4}, {:.4})", last.x, last.y);
        Some(last)
    }

    /// Subtracts the calibration offset from a raw target.
    #[inline]
    pub fn apply(&self, raw: &RawGazeTarget) -> Vec2 {
        Vec2::new(raw.x, raw.y) - self.offset
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(x: f32, y: f32) -> RawGazeTarget {
        RawGazeTarget {
            x,
            y,
            depth: 0.6,
            range_estimate: 0.06,
        }
    }

    #[test]
    fn calibrate_before_any_target_is_noop() {
        let mut store = CalibrationStore::new();
        assert!(store.calibrate().is_none());
        assert_eq!(store.offset(), Vec2::ZERO);
        assert_eq!(store.apply(&raw(0.2, -0.1)), Vec2::new(0.2, -0.1));
    }

    #[test]
    fn calibrate_zeroes_the_latest_target() {
        let mut store = CalibrationStore::new();
        store.record(&raw(0.05, 0.02));
        store.record(&raw(0.12, -0.03));

        assert_eq!(store.calibrate(), Some(Vec2::new(0.12, -0.03)));
        assert_eq!(store.apply(&raw(0.12, -0.03)), Vec2::ZERO);
        assert_eq!(store.apply(&raw(0.22, -0.03)).y, 0.0);
    }
}
