// src/lib.rs
//! Head-tracked off-axis display engine.
//!
//! This library turns per-frame face landmarks into a smoothed eye position,
//! derives the asymmetric frustum that keeps a fixed virtual window
//! geometrically consistent from that eye, and runs the pointer interaction
//! state machine for the displayed object and the observer camera.
//!
//! Nothing in here touches the GPU; the viewer crate owns rendering.

pub mod calibration;
pub mod config;
pub mod error;
pub mod filter;
pub mod gaze;
pub mod interaction;
pub mod landmarks;
pub mod observer;
pub mod projection;
pub mod session;
pub mod target;

pub use crate::config::SessionConfig;
pub use crate::error::{Error, Result};
pub use crate::interaction::{CameraMode, PointerButton, PointerEvent};
pub use crate::landmarks::LandmarkFrame;
pub use crate::projection::{DisplayCamera, Frustum};
pub use crate::session::{FrameView, RenderSource, Session, SessionEvent, TrackingStatus};
pub use crate::target::{Aabb, ManipulableTarget};
