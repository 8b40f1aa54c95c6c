//! The displayed object's transform and its auto-fit baseline.

use crate::config::InteractionConfig;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};

/// Axis-aligned bounding box in model units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point; `None` for an empty or
    /// non-finite point set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        (min.is_finite() && max.is_finite()).then_some(Self { min, max })
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelTransform {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: f32,
}

impl ModelTransform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.orientation, self.position)
    }
}

/// The active model as seen by the interaction layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulableTarget {
    pub transform: ModelTransform,
    base_scale: f32,
}

impl ManipulableTarget {
    /// Places a freshly loaded model at the origin, scaled so its largest
    /// dimension spans `fit_size_m`. The resulting scale is the zoom baseline.
    pub fn fit(bounds: &Aabb, fit_size_m: f32) -> Self {
        let max_dim = bounds.size().max_element();
        let base_scale = if max_dim > f32::EPSILON && max_dim.is_finite() {
            fit_size_m / max_dim
        } else {
            1.0
        };
        Self {
            transform: ModelTransform {
                position: Vec3::ZERO,
                orientation: Quat::IDENTITY,
                scale: base_scale,
            },
            base_scale,
        }
    }

    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    /// Incremental rotation from a drag, composed about world axes.
    pub fn rotate_by(&mut self, delta_px: Vec2, cfg: &InteractionConfig) {
        let pitch = (delta_px.y * cfg.pitch_deg_per_px).to_radians();
        let yaw = (delta_px.x * cfg.yaw_deg_per_px).to_radians();
        let delta = Quat::from_euler(EulerRot::XYZ, pitch, yaw, 0.0);
        self.transform.orientation = (delta * self.transform.orientation).normalize();
    }

    /// Pan in the screen-aligned plane; screen-down moves the object down.
    pub fn pan_by(&mut self, delta_px: Vec2, cfg: &InteractionConfig) {
        self.transform.position.x += delta_px.x * cfg.pan_m_per_px;
        self.transform.position.y -= delta_px.y * cfg.pan_m_per_px;
    }

    /// One wheel notch of uniform rescale, clamped around the auto-fit scale.
    /// Positive `scroll` grows the object.
    pub fn zoom_by(&mut self, scroll: f32, cfg: &InteractionConfig) {
        if scroll == 0.0 || !scroll.is_finite() {
            return;
        }
        let factor = (scroll.signum() * cfg.zoom_intensity).exp();
        let min = self.base_scale * cfg.min_scale_factor;
        let max = self.base_scale * cfg.max_scale_factor;
        self.transform.scale = (self.transform.scale * factor).clamp(min, max);
    }
}
