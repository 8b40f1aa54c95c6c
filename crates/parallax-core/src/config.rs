//! Tuning constants for tracking, projection and interaction.
//!
//! Every struct carries the reference values in its `Default` impl; the
//! viewer overrides a handful of them from the command line.

use crate::{Error, Result};
use glam::Vec3;

/// Landmark → raw gaze target conversion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeConfig {
    /// Assumed real inter-eye distance in normalised image units.
    pub inter_eye_constant: f32,
    /// Horizontal sensitivity applied to the centred eye midpoint.
    pub sensitivity_x: f32,
    /// Vertical sensitivity applied to the centred eye midpoint.
    pub sensitivity_y: f32,
    /// Multiplier from the reciprocal depth estimate to render depth.
    pub depth_scale: f32,
    pub min_depth: f32,
    pub max_depth: f32,
    /// Inter-eye distances at or below this are treated as no detection.
    pub min_eye_distance: f32,
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            inter_eye_constant: 0.065,
            sensitivity_x: 2.0,
            sensitivity_y: 1.5,
            depth_scale: 10.0,
            min_depth: 0.2,
            max_depth: 2.0,
            min_eye_distance: 1e-4,
        }
    }
}

/// Exponential smoothing of the eye position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterConfig {
    /// Blend factor toward each new sample, in (0, 1].
    pub alpha: f32,
    /// Eye position before the first detection (meters from screen centre).
    pub initial_eye: Vec3,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            initial_eye: Vec3::new(0.0, 0.0, 0.6),
        }
    }
}

/// The virtual window and the display camera's clip planes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenConfig {
    /// World-space width of the virtual screen in meters. Height follows the
    /// viewport aspect ratio.
    pub width_m: f32,
    pub near: f32,
    pub far: f32,
    /// Smallest eye depth fed into the `near / |z|` ratio.
    pub min_eye_depth: f32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width_m: 0.6,
            near: 0.1,
            far: 100.0,
            min_eye_depth: 1e-3,
        }
    }
}

/// Display-mode object manipulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionConfig {
    /// Degrees of yaw per pixel of horizontal drag.
    pub yaw_deg_per_px: f32,
    /// Degrees of pitch per pixel of vertical drag.
    pub pitch_deg_per_px: f32,
    /// Meters per pixel of pan.
    pub pan_m_per_px: f32,
    /// Exponent applied per wheel notch.
    pub zoom_intensity: f32,
    /// Zoom clamp relative to the auto-fit scale.
    pub min_scale_factor: f32,
    pub max_scale_factor: f32,
    /// Largest dimension of a freshly loaded model, in meters.
    pub fit_size_m: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            yaw_deg_per_px: 0.5,
            pitch_deg_per_px: 0.1,
            pan_m_per_px: 0.001,
            zoom_intensity: 0.05,
            min_scale_factor: 0.01,
            max_scale_factor: 100.0,
            fit_size_m: 0.1,
        }
    }
}

/// Free-flying observer camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObserverConfig {
    /// Radians per pixel.
    pub pitch_speed: f32,
    pub yaw_speed: f32,
    /// Meters per pixel of strafe.
    pub move_speed: f32,
    /// Meters per wheel notch along the view direction.
    pub dolly_step: f32,
    /// Distance kept between |pitch| and π/2.
    pub pitch_margin: f32,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub start_position: Vec3,
    pub start_look_at: Vec3,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            pitch_speed: 0.002,
            yaw_speed: 0.002,
            move_speed: 0.001,
            dolly_step: 0.2,
            pitch_margin: 0.1,
            fov_y_deg: 50.0,
            near: 0.01,
            far: 1000.0,
            start_position: Vec3::new(0.0, 0.5, 2.0),
            start_look_at: Vec3::ZERO,
        }
    }
}

/// Everything a [`crate::Session`] needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionConfig {
    pub gaze: GazeConfig,
    pub filter: FilterConfig,
    pub screen: ScreenConfig,
    pub interaction: InteractionConfig,
    pub observer: ObserverConfig,
}

impl SessionConfig {
    /// Rejects values that would make the projection or filter math degenerate.
    pub fn validate(&self) -> Result<()> {
        if !(self.filter.alpha > 0.0 && self.filter.alpha <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "filter alpha must be in (0, 1], got {}",
                self.filter.alpha
            )));
        }
        if self.gaze.inter_eye_constant <= 0.0 || self.gaze.min_eye_distance <= 0.0 {
            return Err(Error::InvalidConfig(
                "inter-eye constant and minimum eye distance must be positive".into(),
            ));
        }
        if self.gaze.min_depth <= 0.0 || self.gaze.min_depth > self.gaze.max_depth {
            return Err(Error::InvalidConfig(format!(
                "render depth range [{}, {}] is empty or non-positive",
                self.gaze.min_depth, self.gaze.max_depth
            )));
        }
        if !(self.screen.width_m > 0.0 && self.screen.width_m.is_finite()) {
            return Err(Error::InvalidConfig(format!(
                "virtual screen width must be positive, got {}",
                self.screen.width_m
            )));
        }
        if self.screen.near <= 0.0 || self.screen.far <= self.screen.near {
            return Err(Error::InvalidConfig(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.screen.near, self.screen.far
            )));
        }
        if self.screen.min_eye_depth <= 0.0 {
            return Err(Error::InvalidConfig("minimum eye depth must be positive".into()));
        }
        let scale = &self.interaction;
        if scale.min_scale_factor <= 0.0 || scale.min_scale_factor > scale.max_scale_factor {
            return Err(Error::InvalidConfig(format!(
                "zoom clamp [{}, {}] is empty or non-positive",
                scale.min_scale_factor, scale.max_scale_factor
            )));
        }
        let margin = self.observer.pitch_margin;
        if margin <= 0.0 || margin >= std::f32::consts::FRAC_PI_2 {
            return Err(Error::InvalidConfig(format!(
                "observer pitch margin must be in (0, π/2), got {margin}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_alpha_and_clip_planes() {
        let mut cfg = SessionConfig::default();
        cfg.filter.alpha = 0.0;
        assert!(cfg.validate().is_err());

        let mut cfg = SessionConfig::default();
        cfg.screen.far = cfg.screen.near;
        assert!(cfg.validate().is_err());

        let mut cfg = SessionConfig::default();
        cfg.screen.width_m = f32::NAN;
        assert!(cfg.validate().is_err());
    }
}
