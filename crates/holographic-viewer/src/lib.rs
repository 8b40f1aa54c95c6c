//! Head-coupled perspective model viewer.
//!
//! Wires the `parallax_core` session to a wgpu renderer, an egui control
//! panel, a UDP landmark feed and an `.obj` model catalogue.

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod data;
pub mod net;
pub mod renderer;
pub mod ui;
