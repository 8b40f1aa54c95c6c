//! Free-flying camera for inspecting the illusion from outside.

use crate::config::ObserverConfig;
use glam::{EulerRot, Mat4, Quat, Vec2, Vec3};
use std::f32::consts::FRAC_PI_2;

/// Accumulated observer angles. `pitch` always stays strictly inside
/// `(−π/2, π/2)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ObserverOrientation {
    pub pitch: f32,
    pub yaw: f32,
}

impl ObserverOrientation {
    /// Yaw about world up, then pitch about the yawed right axis.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    fn clamp_pitch(&mut self, margin: f32) {
        let limit = FRAC_PI_2 - margin;
        self.pitch = self.pitch.clamp(-limit, limit);
    }
}

#[derive(Debug, Clone)]
pub struct ObserverCamera {
    pub position: Vec3,
    pub orientation: Quat,
    angles: ObserverOrientation,
    config: ObserverConfig,
}

impl ObserverCamera {
    /// Starts at the configured position, looking at the configured point.
    /// The stored angles match that pose so the first drag continues from it.
    pub fn new(config: ObserverConfig) -> Self {
        let dir = (config.start_look_at - config.start_position).normalize_or_zero();
        let mut angles = if dir == Vec3::ZERO {
            ObserverOrientation::default()
        } else {
            ObserverOrientation {
                pitch: dir.y.clamp(-1.0, 1.0).asin(),
                yaw: (-dir.x).atan2(-dir.z),
            }
        };
        angles.clamp_pitch(config.pitch_margin);

        Self {
            position: config.start_position,
            orientation: angles.quat(),
            angles,
            config,
        }
    }

    pub fn angles(&self) -> ObserverOrientation {
        self.angles
    }

    /// Drag: Δx turns about world up, Δy tilts.
    pub fn rotate_by(&mut self, delta_px: Vec2) {
        self.angles.yaw -= delta_px.x * self.config.yaw_speed;
        self.angles.pitch -= delta_px.y * self.config.pitch_speed;
        self.angles.clamp_pitch(self.config.pitch_margin);
        self.orientation = self.angles.quat();
    }

    /// Pan: slide along the camera's own right/up axes.
    pub fn strafe_by(&mut self, delta_px: Vec2) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        self.position += right * (-delta_px.x * self.config.move_speed)
            + up * (delta_px.y * self.config.move_speed);
    }

    /// Wheel: one fixed step along the view direction; positive is forward.
    pub fn dolly_by(&mut self, scroll: f32) {
        if scroll == 0.0 || !scroll.is_finite() {
            return;
        }
        self.position += self.forward() * (scroll.signum() * self.config.dolly_step);
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_y_deg.to_radians(),
            aspect.max(f32::EPSILON),
            self.config.near,
            self.config.far,
        )
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        self.projection(aspect) * self.view()
    }
}
