//! Off-axis projection through a fixed virtual window.
//!
//! The display camera sits exactly at the tracked eye with no rotation; the
//! illusion comes entirely from skewing the frustum so its near-plane
//! rectangle stays aligned with the virtual screen at `z = 0`.

use crate::config::ScreenConfig;
use glam::{Mat4, Quat, Vec3, Vec4};

/// Near-plane extents of an asymmetric perspective frustum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
}

impl Frustum {
    pub fn is_finite(&self) -> bool {
        [self.left, self.right, self.top, self.bottom, self.near, self.far]
            .iter()
            .all(|v| v.is_finite())
    }

    /// Right-handed off-centre perspective matrix with depth mapped to
    /// `[0, 1]`, looking down −Z.
    #[rustfmt::skip]
    pub fn projection_rh(&self) -> Mat4 {
        let (l, r, t, b, n, f) = (self.left, self.right, self.top, self.bottom, self.near, self.far);
        Mat4::from_cols(
            Vec4::new(2.0 * n / (r - l), 0.0,               0.0,               0.0),
            Vec4::new(0.0,               2.0 * n / (t - b), 0.0,               0.0),
            Vec4::new((r + l) / (r - l), (t + b) / (t - b), f / (n - f),       -1.0),
            Vec4::new(0.0,               0.0,               n * f / (n - f),   0.0),
        )
    }

    /// The eight frustum corners in view space, near plane first
    /// (bottom-left, bottom-right, top-right, top-left), then far plane.
    pub fn corners_view(&self) -> [Vec3; 8] {
        let k = self.far / self.near;
        let near = [
            Vec3::new(self.left, self.bottom, -self.near),
            Vec3::new(self.right, self.bottom, -self.near),
            Vec3::new(self.right, self.top, -self.near),
            Vec3::new(self.left, self.top, -self.near),
        ];
        [
            near[0],
            near[1],
            near[2],
            near[3],
            near[0] * k,
            near[1] * k,
            near[2] * k,
            near[3] * k,
        ]
    }
}

/// The head-coupled camera the scene is drawn from in display mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayCamera {
    pub position: Vec3,
    pub orientation: Quat,
    pub frustum: Frustum,
}

impl DisplayCamera {
    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn view_proj(&self) -> Mat4 {
        self.frustum.projection_rh() * self.view()
    }
}

/// Derives the display frustum from the eye position each frame.
#[derive(Debug, Clone)]
pub struct OffAxisProjector {
    config: ScreenConfig,
    screen_height: f32,
    last_valid: Option<Frustum>,
}

impl OffAxisProjector {
    pub fn new(config: ScreenConfig) -> Self {
        Self {
            screen_height: config.width_m,
            config,
            last_valid: None,
        }
    }

    /// Re-derives the virtual screen height so a virtual meter covers the
    /// same number of pixels horizontally and vertically.
    pub fn set_viewport(&mut self, width_px: u32, height_px: u32) {
        if width_px == 0 || height_px == 0 {
            return;
        }
        let aspect = width_px as f32 / height_px as f32;
        self.screen_height = self.config.width_m / aspect;
    }

    pub fn screen_size(&self) -> (f32, f32) {
        (self.config.width_m, self.screen_height)
    }

    /// Asymmetric frustum for an eye at `eye`.
    ///
    /// `|eye.z|` is floored at the configured minimum. A non-finite eye
    /// yields the last valid frustum (or the one for an eye on the axis at
    /// the floor depth if there has never been one).
    pub fn frustum(&mut self, eye: Vec3) -> Frustum {
        if !eye.is_finite() {
            return self
                .last_valid
                .unwrap_or_else(|| self.compute(Vec3::new(0.0, 0.0, self.config.min_eye_depth)));
        }
        let frustum = self.compute(eye);
        self.last_valid = Some(frustum);
        frustum
    }

    /// Frustum plus camera pose: positioned at the eye, unrotated.
    pub fn display_camera(&mut self, eye: Vec3) -> DisplayCamera {
        let frustum = self.frustum(eye);
        let position = if eye.is_finite() {
            eye
        } else {
            log::debug!("Non-finite eye position {eye:?}; keeping last frustum");
            Vec3::new(0.0, 0.0, self.config.min_eye_depth)
        };
        DisplayCamera {
            position,
            orientation: Quat::IDENTITY,
            frustum,
        }
    }

    fn compute(&self, eye: Vec3) -> Frustum {
        let (w, h) = (self.config.width_m, self.screen_height);
        let near = self.config.near;
        let ratio = near / eye.z.abs().max(self.config.min_eye_depth);

        Frustum {
            left: ratio * (-w / 2.0 - eye.x),
            right: ratio * (w / 2.0 - eye.x),
            top: ratio * (h / 2.0 - eye.y),
            bottom: ratio * (-h / 2.0 - eye.y),
            near,
            far: self.config.far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projector() -> OffAxisProjector {
        let mut p = OffAxisProjector::new(ScreenConfig::default());
        p.set_viewport(1600, 900);
        p
    }

    #[test]
    fn on_axis_eye_is_symmetric() {
        let mut p = projector();
        for z in [0.2_f32, 0.6, 1.3, 2.0] {
            let f = p.frustum(Vec3::new(0.0, 0.0, z));
            assert!((f.left + f.right).abs() < 1e-7);
            assert!((f.top + f.bottom).abs() < 1e-7);
            assert!((f.right - 0.1 / z * 0.3).abs() < 1e-6);
        }
    }

    #[test]
    fn lateral_eye_skews_frustum() {
        let mut p = projector();
        let centred = p.frustum(Vec3::new(0.0, 0.0, 0.5));
        let shifted = p.frustum(Vec3::new(0.1, 0.0, 0.5));

        let expected = 0.1 / 0.5 * 0.1;
        assert!((centred.left - shifted.left - expected).abs() < 1e-6);
        assert!((centred.right - shifted.right - expected).abs() < 1e-6);

        // Twice the distance, half the skew.
        let centred_far = p.frustum(Vec3::new(0.0, 0.0, 1.0));
        let shifted_far = p.frustum(Vec3::new(0.1, 0.0, 1.0));
        assert!((centred_far.left - shifted_far.left - expected / 2.0).abs() < 1e-6);
    }

    #[test]
    fn height_follows_aspect() {
        let mut p = projector();
        let (w, h) = p.screen_size();
        assert!((w / h - 16.0 / 9.0).abs() < 1e-5);

        p.set_viewport(1000, 1000);
        let f = p.frustum(Vec3::new(0.0, 0.0, 1.0));
        assert!((f.top - f.right).abs() < 1e-7);

        // Minimised windows report zero; keep the previous height.
        p.set_viewport(0, 0);
        assert_eq!(p.screen_size(), (0.6, 0.6));
    }

    #[test]
    fn degenerate_depth_is_floored() {
        let mut p = projector();
        let f = p.frustum(Vec3::new(0.0, 0.0, 0.0));
        assert!(f.is_finite());
        assert!((f.right - 0.1 / 1e-3 * 0.3).abs() < 1e-2);

        let behind = p.frustum(Vec3::new(0.0, 0.0, -0.5));
        let front = p.frustum(Vec3::new(0.0, 0.0, 0.5));
        assert_eq!(behind, front);
    }

    #[test]
    fn non_finite_eye_reuses_last_frustum() {
        let mut p = projector();
        let good = p.frustum(Vec3::new(0.05, 0.02, 0.7));
        let reused = p.frustum(Vec3::new(f32::NAN, 0.0, 0.7));
        assert_eq!(good, reused);

        let cam = p.display_camera(Vec3::new(0.0, f32::INFINITY, 0.7));
        assert!(cam.position.is_finite());
        assert_eq!(cam.frustum, good);
    }

    #[test]
    fn display_camera_sits_at_eye_unrotated() {
        let mut p = projector();
        let eye = Vec3::new(0.1, -0.05, 0.8);
        let cam = p.display_camera(eye);
        assert_eq!(cam.position, eye);
        assert_eq!(cam.orientation, Quat::IDENTITY);
    }

    #[test]
    fn screen_corners_project_to_ndc_corners() {
        // The virtual screen rectangle at z = 0 must fill the viewport
        // exactly, wherever the eye is.
        let mut p = projector();
        let (w, h) = p.screen_size();
        for eye in [Vec3::new(0.0, 0.0, 0.6), Vec3::new(0.2, -0.1, 0.9)] {
            let cam = p.display_camera(eye);
            let vp = cam.view_proj();
            let bl = vp.project_point3(Vec3::new(-w / 2.0, -h / 2.0, 0.0));
            let tr = vp.project_point3(Vec3::new(w / 2.0, h / 2.0, 0.0));
            assert!((bl.x + 1.0).abs() < 1e-4 && (bl.y + 1.0).abs() < 1e-4);
            assert!((tr.x - 1.0).abs() < 1e-4 && (tr.y - 1.0).abs() < 1e-4);
            assert!(bl.z > 0.0 && bl.z < 1.0);
        }
    }

    #[test]
    fn depth_range_is_zero_to_one() {
        let f = projector().frustum(Vec3::new(0.0, 0.0, 0.6));
        let m = f.projection_rh();
        let near = m.project_point3(Vec3::new(0.0, 0.0, -f.near));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -f.far));
        assert!(near.z.abs() < 1e-5);
        assert!((far.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn far_corners_scale_from_near() {
        let f = projector().frustum(Vec3::new(0.1, 0.1, 0.5));
        let c = f.corners_view();
        assert_eq!(c[0], Vec3::new(f.left, f.bottom, -f.near));
        assert!((c[6].z + f.far).abs() < 1e-3);
        assert!((c[6].x - f.right * f.far / f.near).abs() < 1e-3);
    }
}
