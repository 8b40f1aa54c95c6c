//! End-to-end: landmark datagrams in, display frustum out.

use glam::Vec3;
use parallax_core::gaze::GazeEstimator;
use parallax_core::{LandmarkFrame, RenderSource, Session, SessionConfig, SessionEvent};

/// A 478-point face with the iris centres at the given image positions.
fn datagram(ts: f64, left: (f32, f32), right: (f32, f32)) -> Vec<u8> {
    let mut points = vec![serde_json::json!({"x": 0.5, "y": 0.5}); 478];
    points[468] = serde_json::json!({"x": left.0, "y": left.1});
    points[473] = serde_json::json!({"x": right.0, "y": right.1});
    serde_json::to_vec(&serde_json::json!({"timestamp": ts, "faces": [points]})).unwrap()
}

#[test]
fn centred_face_at_reference_distance() {
    let frame = LandmarkFrame::from_json(&datagram(0.1, (0.45, 0.5), (0.55, 0.5))).unwrap();
    let raw = GazeEstimator::default()
        .estimate(frame.primary_face().unwrap(), false)
        .unwrap();

    assert!(raw.x.abs() < 1e-6 && raw.y.abs() < 1e-6);
    assert!((raw.range_estimate - 0.65).abs() < 1e-5);
    assert_eq!(raw.depth, 2.0);
}

#[test]
fn head_motion_skews_the_frustum_the_right_way() {
    let mut session = Session::new(SessionConfig::default()).unwrap();
    session.apply(SessionEvent::Resized {
        width: 1920,
        height: 1080,
    });

    // Settle on a centred head, then move right (mirrored image: larger x).
    for i in 0..20 {
        let frame = LandmarkFrame::from_json(&datagram(i as f64, (0.45, 0.5), (0.55, 0.5))).unwrap();
        session.apply(SessionEvent::Landmarks(frame));
    }
    let centred = session.frame_view();
    assert_eq!(centred.source, RenderSource::Display);
    assert!((centred.display.frustum.left + centred.display.frustum.right).abs() < 1e-5);

    for i in 20..40 {
        let frame = LandmarkFrame::from_json(&datagram(i as f64, (0.55, 0.5), (0.65, 0.5))).unwrap();
        session.apply(SessionEvent::Landmarks(frame));
    }
    let moved = session.frame_view();
    assert!(moved.display.position.x > 0.0);
    assert!(moved.display.frustum.left < centred.display.frustum.left);
    assert!(moved.display.frustum.right < centred.display.frustum.right);
    assert!(moved.view_proj.is_finite());
}

#[test]
fn garbage_between_frames_is_harmless() {
    let mut session = Session::new(SessionConfig::default()).unwrap();
    let first = LandmarkFrame::from_json(&datagram(1.0, (0.4, 0.5), (0.5, 0.5))).unwrap();
    session.apply(SessionEvent::Landmarks(first));
    let eye = session.eye_position();

    assert!(LandmarkFrame::from_json(b"{\"timestamp\":").is_err());
    // Degenerate detection: both eyes on the same pixel.
    let degenerate = LandmarkFrame::from_json(&datagram(2.0, (0.5, 0.5), (0.5, 0.5))).unwrap();
    session.apply(SessionEvent::Landmarks(degenerate));

    assert_eq!(session.eye_position(), eye);
    let view = session.frame_view();
    assert!(view.display.frustum.is_finite());
    assert!(session.eye_position().is_finite());
    assert_ne!(session.eye_position(), Vec3::ZERO);
}
