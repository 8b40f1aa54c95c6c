//! The explicit state object owned by the render loop.
//!
//! Every subsystem lives here and mutates only its own fields. Inputs arrive
//! as [`SessionEvent`]s; the render loop reads a [`FrameView`] once per frame
//! after all pending events for that frame have been applied.

use crate::calibration::CalibrationStore;
use crate::config::SessionConfig;
use crate::filter::EyePositionFilter;
use crate::gaze::{FrameGate, GazeEstimator, RawGazeTarget};
use crate::interaction::{CameraMode, InteractionController, PointerEvent, Rig};
use crate::landmarks::LandmarkFrame;
use crate::observer::ObserverCamera;
use crate::projection::{DisplayCamera, OffAxisProjector};
use crate::target::ManipulableTarget;
use crate::Result;
use glam::{Mat4, Vec3};
use std::fmt;

/// What the status line shows about the landmark source.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingStatus {
    Waiting,
    Tracking,
    NoFace,
    Stalled,
    Unavailable(String),
}

impl fmt::Display for TrackingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Waiting => write!(f, "Waiting for tracker"),
            Self::Tracking => write!(f, "Tracking active"),
            Self::NoFace => write!(f, "No face detected"),
            Self::Stalled => write!(f, "Tracker stalled"),
            Self::Unavailable(reason) => write!(f, "Tracker unavailable: {reason}"),
        }
    }
}

/// Inputs to the session, one per external callback.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Landmarks(LandmarkFrame),
    Pointer(PointerEvent),
    Calibrate,
    SetInvertX(bool),
    SetCameraMode(CameraMode),
    Resized { width: u32, height: u32 },
    SourceStalled,
    SourceUnavailable(String),
}

/// Which camera draws this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderSource {
    Display,
    Observer,
}

/// Per-frame camera data for the renderer.
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub source: RenderSource,
    /// View-projection of the camera selected by `source`.
    pub view_proj: Mat4,
    /// Always present, so the observer view can draw the display frustum.
    pub display: DisplayCamera,
    /// Virtual screen width and height in meters.
    pub screen_size: (f32, f32),
}

pub struct Session {
    config: SessionConfig,
    gate: FrameGate,
    estimator: GazeEstimator,
    calibration: CalibrationStore,
    filter: EyePositionFilter,
    projector: OffAxisProjector,
    controller: InteractionController,
    observer: ObserverCamera,
    target: Option<ManipulableTarget>,
    mode: CameraMode,
    invert_x: bool,
    status: TrackingStatus,
    last_raw: Option<RawGazeTarget>,
    aspect: f32,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            gate: FrameGate::new(),
            estimator: GazeEstimator::new(config.gaze),
            calibration: CalibrationStore::new(),
            filter: EyePositionFilter::new(config.filter.initial_eye, config.filter.alpha),
            projector: OffAxisProjector::new(config.screen),
            controller: InteractionController::new(config.interaction),
            observer: ObserverCamera::new(config.observer),
            target: None,
            mode: CameraMode::Display,
            invert_x: false,
            status: TrackingStatus::Waiting,
            last_raw: None,
            aspect: 1.0,
            config,
        })
    }

    pub fn apply(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Landmarks(frame) => {
                self.ingest(&frame);
            }
            SessionEvent::Pointer(pointer) => self.handle_pointer(pointer),
            SessionEvent::Calibrate => {
                self.calibrate();
            }
            SessionEvent::SetInvertX(on) => self.invert_x = on,
            SessionEvent::SetCameraMode(mode) => self.set_camera_mode(mode),
            SessionEvent::Resized { width, height } => self.set_viewport(width, height),
            SessionEvent::SourceStalled => {
                if self.status != TrackingStatus::Stalled {
                    log::warn!("Landmark source stalled; holding last eye position");
                }
                self.status = TrackingStatus::Stalled;
            }
            SessionEvent::SourceUnavailable(reason) => {
                log::error!("Landmark source unavailable: {reason}");
                self.status = TrackingStatus::Unavailable(reason);
            }
        }
    }

    /// Runs one landmark frame through estimation, calibration and smoothing.
    ///
    /// Returns the new eye position, or `None` when the frame was a repeat or
    /// carried no usable face (the previous eye position stays in effect).
    pub fn ingest(&mut self, frame: &LandmarkFrame) -> Option<Vec3> {
        if !self.gate.admit(frame.timestamp) {
            return None;
        }
        let estimate = frame
            .primary_face()
            .and_then(|face| self.estimator.estimate(face, self.invert_x));
        let Some(raw) = estimate else {
            self.status = TrackingStatus::NoFace;
            return None;
        };

        self.status = TrackingStatus::Tracking;
        self.calibration.record(&raw);
        self.last_raw = Some(raw);
        let centred = self.calibration.apply(&raw);
        Some(self.filter.update(centred.extend(raw.depth)))
    }

    /// Re-zeroes on the most recent raw target. No-op before any detection.
    pub fn calibrate(&mut self) -> bool {
        self.calibration.calibrate().is_some()
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let mut rig = Rig {
            target: self.target.as_mut(),
            observer: &mut self.observer,
        };
        self.controller.handle(event, self.mode, &mut rig);
    }

    pub fn set_camera_mode(&mut self, mode: CameraMode) {
        if mode != self.mode {
            log::debug!("Camera mode: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
        self.projector.set_viewport(width, height);
    }

    /// Swaps in a newly loaded model (or clears it).
    pub fn replace_target(&mut self, target: Option<ManipulableTarget>) {
        self.target = target;
    }

    /// Camera data for this frame. Call after draining the frame's events.
    pub fn frame_view(&mut self) -> FrameView {
        let display = self.projector.display_camera(self.filter.position());
        let (source, view_proj) = match self.mode {
            CameraMode::Display => (RenderSource::Display, display.view_proj()),
            CameraMode::Observer => (RenderSource::Observer, self.observer.view_proj(self.aspect)),
        };
        FrameView {
            source,
            view_proj,
            display,
            screen_size: self.projector.screen_size(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn eye_position(&self) -> Vec3 {
        self.filter.position()
    }

    pub fn last_raw_target(&self) -> Option<RawGazeTarget> {
        self.last_raw
    }

    pub fn calibration(&self) -> &CalibrationStore {
        &self.calibration
    }

    pub fn camera_mode(&self) -> CameraMode {
        self.mode
    }

    pub fn invert_x(&self) -> bool {
        self.invert_x
    }

    pub fn status(&self) -> &TrackingStatus {
        &self.status
    }

    pub fn target(&self) -> Option<&ManipulableTarget> {
        self.target.as_ref()
    }

    pub fn observer(&self) -> &ObserverCamera {
        &self.observer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::PointerButton;
    use crate::landmarks::{FaceLandmarks, Landmark, LEFT_IRIS_CENTER, RIGHT_IRIS_CENTER};
    use crate::target::Aabb;
    use glam::Vec2;

    fn frame(ts: f64, left: (f32, f32), right: (f32, f32)) -> LandmarkFrame {
        let mut points = vec![Landmark { x: 0.5, y: 0.5, z: 0.0 }; 478];
        points[LEFT_IRIS_CENTER] = Landmark { x: left.0, y: left.1, z: 0.0 };
        points[RIGHT_IRIS_CENTER] = Landmark { x: right.0, y: right.1, z: 0.0 };
        LandmarkFrame {
            timestamp: ts,
            faces: vec![FaceLandmarks::new(points)],
        }
    }

    fn session() -> Session {
        let mut s = Session::new(SessionConfig::default()).unwrap();
        s.set_viewport(1280, 720);
        s
    }

    #[test]
    fn repeated_timestamp_is_skipped() {
        let mut s = session();
        assert!(s.ingest(&frame(1.0, (0.6, 0.4), (0.7, 0.4))).is_some());
        let eye = s.eye_position();
        assert!(s.ingest(&frame(1.0, (0.6, 0.4), (0.7, 0.4))).is_none());
        assert_eq!(s.eye_position(), eye);
    }

    #[test]
    fn empty_frame_freezes_eye_and_reports_no_face() {
        let mut s = session();
        s.ingest(&frame(1.0, (0.6, 0.4), (0.7, 0.4)));
        let eye = s.eye_position();

        let empty = LandmarkFrame {
            timestamp: 2.0,
            faces: vec![],
        };
        assert!(s.ingest(&empty).is_none());
        assert_eq!(s.eye_position(), eye);
        assert_eq!(*s.status(), TrackingStatus::NoFace);
        assert_eq!(s.status().to_string(), "No face detected");
    }

    #[test]
    fn calibrate_then_same_detection_is_centred() {
        let mut s = session();
        assert!(!s.calibrate());

        let f = |ts| frame(ts, (0.62, 0.41), (0.71, 0.43));
        s.ingest(&f(1.0));
        assert!(s.calibrate());
        for i in 0..40 {
            s.ingest(&f(2.0 + i as f64));
        }
        let eye = s.eye_position();
        assert!(eye.x.abs() < 1e-5 && eye.y.abs() < 1e-5);
        // Calibration leaves depth alone.
        assert!((eye.z - s.last_raw_target().unwrap().depth).abs() < 1e-5);
    }

    #[test]
    fn invert_x_is_read_per_frame() {
        let mut s = session();
        s.ingest(&frame(1.0, (0.6, 0.5), (0.7, 0.5)));
        let x = s.last_raw_target().unwrap().x;

        s.apply(SessionEvent::SetInvertX(true));
        s.ingest(&frame(2.0, (0.6, 0.5), (0.7, 0.5)));
        assert_eq!(s.last_raw_target().unwrap().x, -x);
    }

    #[test]
    fn render_source_follows_mode_only() {
        let mut s = session();
        assert_eq!(s.frame_view().source, RenderSource::Display);

        s.apply(SessionEvent::SetCameraMode(CameraMode::Observer));
        let view = s.frame_view();
        assert_eq!(view.source, RenderSource::Observer);
        assert_eq!(view.view_proj, s.observer().view_proj(1280.0 / 720.0));
        // The display camera is still derived for the frustum overlay.
        assert_eq!(view.display.position, s.eye_position());
    }

    #[test]
    fn observer_pose_survives_mode_toggles() {
        let mut s = session();
        s.apply(SessionEvent::SetCameraMode(CameraMode::Observer));
        s.apply(SessionEvent::Pointer(PointerEvent::Pressed {
            button: PointerButton::Primary,
            position: Vec2::ZERO,
        }));
        s.apply(SessionEvent::Pointer(PointerEvent::Moved {
            position: Vec2::new(30.0, 10.0),
        }));
        let angles = s.observer().angles();

        s.apply(SessionEvent::SetCameraMode(CameraMode::Display));
        s.apply(SessionEvent::SetCameraMode(CameraMode::Observer));
        assert_eq!(s.observer().angles(), angles);
    }

    #[test]
    fn model_swap_replaces_target() {
        let mut s = session();
        let bounds = Aabb {
            min: Vec3::ZERO,
            max: Vec3::new(2.0, 1.0, 1.0),
        };
        s.replace_target(Some(ManipulableTarget::fit(&bounds, 0.1)));
        s.apply(SessionEvent::Pointer(PointerEvent::Scrolled { delta: 1.0 }));
        assert!(s.target().unwrap().transform.scale > 0.05);

        s.replace_target(Some(ManipulableTarget::fit(&bounds, 0.1)));
        assert_eq!(s.target().unwrap().transform.scale, 0.05);
    }

    #[test]
    fn source_failures_update_status() {
        let mut s = session();
        assert_eq!(*s.status(), TrackingStatus::Waiting);
        s.apply(SessionEvent::SourceStalled);
        assert_eq!(*s.status(), TrackingStatus::Stalled);
        s.apply(SessionEvent::SourceUnavailable("address in use".into()));
        assert_eq!(s.status().to_string(), "Tracker unavailable: address in use");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = SessionConfig::default();
        cfg.filter.alpha = 2.0;
        assert!(Session::new(cfg).is_err());
    }
}
