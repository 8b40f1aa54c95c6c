//! Pointer gesture state machine and per-mode gesture semantics.
//!
//! Gesture state (`Idle`/`Dragging`/`Panning`) is driven purely by button
//! presses and releases. What a drag, pan or scroll *does* is decided by the
//! active [`CameraMode`], each of which maps to a [`ModeControls`] impl.

use crate::config::InteractionConfig;
use crate::observer::ObserverCamera;
use crate::target::ManipulableTarget;
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

/// Input events as consumed by [`InteractionController::handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Pressed { button: PointerButton, position: Vec2 },
    Released { button: PointerButton },
    Moved { position: Vec2 },
    /// Wheel notches; positive means scroll up (away from the user).
    Scrolled { delta: f32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging,
    Panning,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CameraMode {
    /// Head-coupled off-axis camera; gestures manipulate the object.
    #[default]
    Display,
    /// Free camera; gestures fly it around the scene.
    Observer,
}

impl CameraMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Display => Self::Observer,
            Self::Observer => Self::Display,
        }
    }

    /// Gesture behaviour attached to this mode.
    pub fn controls(self) -> &'static dyn ModeControls {
        match self {
            Self::Display => &DisplayControls,
            Self::Observer => &ObserverControls,
        }
    }
}

/// Everything a gesture may mutate.
pub struct Rig<'a> {
    pub target: Option<&'a mut ManipulableTarget>,
    pub observer: &'a mut ObserverCamera,
}

pub trait ModeControls {
    fn drag(&self, delta: Vec2, rig: &mut Rig<'_>, cfg: &InteractionConfig);
    fn pan(&self, delta: Vec2, rig: &mut Rig<'_>, cfg: &InteractionConfig);
    fn scroll(&self, delta: f32, rig: &mut Rig<'_>, cfg: &InteractionConfig);
}

/// Rotate, pan and rescale the displayed object.
pub struct DisplayControls;

impl ModeControls for DisplayControls {
    fn drag(&self, delta: Vec2, rig: &mut Rig<'_>, cfg: &InteractionConfig) {
        if let Some(target) = rig.target.as_deref_mut() {
            target.rotate_by(delta, cfg);
        }
    }

    fn pan(&self, delta: Vec2, rig: &mut Rig<'_>, cfg: &InteractionConfig) {
        if let Some(target) = rig.target.as_deref_mut() {
            target.pan_by(delta, cfg);
        }
    }

    fn scroll(&self, delta: f32, rig: &mut Rig<'_>, cfg: &InteractionConfig) {
        if let Some(target) = rig.target.as_deref_mut() {
            target.zoom_by(delta, cfg);
        }
    }
}

/// Look around, strafe and dolly the observer camera.
pub struct ObserverControls;

impl ModeControls for ObserverControls {
    fn drag(&self, delta: Vec2, rig: &mut Rig<'_>, _cfg: &InteractionConfig) {
        rig.observer.rotate_by(delta);
    }

    fn pan(&self, delta: Vec2, rig: &mut Rig<'_>, _cfg: &InteractionConfig) {
        rig.observer.strafe_by(delta);
    }

    fn scroll(&self, delta: f32, rig: &mut Rig<'_>, _cfg: &InteractionConfig) {
        rig.observer.dolly_by(delta);
    }
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    gesture: Gesture,
    last_pointer: Option<Vec2>,
    config: InteractionConfig,
}

impl InteractionController {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            gesture: Gesture::Idle,
            last_pointer: None,
            config,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Advances the gesture state and applies the event's effect for `mode`.
    pub fn handle(&mut self, event: PointerEvent, mode: CameraMode, rig: &mut Rig<'_>) {
        match event {
            PointerEvent::Pressed { button, position } => {
                self.last_pointer = Some(position);
                self.gesture = match button {
                    PointerButton::Primary => Gesture::Dragging,
                    PointerButton::Secondary => Gesture::Panning,
                    PointerButton::Other => self.gesture,
                };
            }
            PointerEvent::Released { .. } => {
                self.gesture = Gesture::Idle;
            }
            PointerEvent::Moved { position } => {
                let delta = self.last_pointer.map_or(Vec2::ZERO, |last| position - last);
                self.last_pointer = Some(position);
                if delta == Vec2::ZERO {
                    return;
                }
                let controls = mode.controls();
                match self.gesture {
                    Gesture::Idle => {}
                    Gesture::Dragging => controls.drag(delta, rig, &self.config),
                    Gesture::Panning => controls.pan(delta, rig, &self.config),
                }
            }
            PointerEvent::Scrolled { delta } => {
                mode.controls().scroll(delta, rig, &self.config);
            }
        }
    }
}
