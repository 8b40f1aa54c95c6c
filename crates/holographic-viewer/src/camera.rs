//! Window input translation and camera-to-GPU uniform packing.

use crate::data::types::MeshUniformStd140 as MeshUniform;
use glam::{Mat3, Mat4, Vec2, Vec3};
use parallax_core::{PointerButton, PointerEvent};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Pixel-precise wheels report roughly this many pixels per notch.
const PIXELS_PER_NOTCH: f32 = 120.0;

/// Turns winit mouse events into [`PointerEvent`]s.
///
/// winit reports button presses without a position, so the last cursor
/// position is tracked here.
#[derive(Debug, Default)]
pub struct PointerInput {
    cursor: Vec2,
}

impl PointerInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, event: &WindowEvent) -> Option<PointerEvent> {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                let button = pointer_button(*button);
                Some(match state {
                    ElementState::Pressed => PointerEvent::Pressed {
                        button,
                        position: self.cursor,
                    },
                    ElementState::Released => PointerEvent::Released { button },
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(PointerEvent::Moved {
                    position: self.cursor,
                })
            }
            WindowEvent::MouseWheel { delta, .. } => Some(PointerEvent::Scrolled {
                delta: scroll_notches(delta),
            }),
            _ => None,
        }
    }
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        _ => PointerButton::Other,
    }
}

/// Positive means scroll up, matching [`PointerEvent::Scrolled`].
fn scroll_notches(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => *y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_NOTCH,
    }
}

/// Packs the mesh-pass uniforms for one frame.
pub fn make_mesh_uniform(view_proj: Mat4, model: Mat4, light_dir: Vec3, base_color: [f32; 4]) -> MeshUniform {
    let normal_matrix = Mat4::from_mat3(Mat3::from_mat4(model).inverse().transpose());
    MeshUniform {
        view_proj: view_proj.to_cols_array_2d(),
        model: model.to_cols_array_2d(),
        normal_matrix: normal_matrix.to_cols_array_2d(),
        light_dir: light_dir.normalize_or_zero().to_array(),
        _pad0: 0.0,
        base_color,
    }
}
