use clap::Parser;
use parallax_core::SessionConfig;
use std::{net::SocketAddr, path::PathBuf, time::Duration};

/// `holographic_viewer` - head-coupled perspective model viewer.
///
/// Renders a 3D model through an off-axis frustum that follows the viewer's
/// eyes, as reported by an external face-landmark tracker over UDP.
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Directory searched recursively for `.obj` models.
    #[arg(long, env = "MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// UDP address the landmark feed listens on.
    ///
    /// The tracker sends one JSON datagram per camera frame to this address.
    #[arg(long, env = "LANDMARK_LISTEN_ADDR", default_value = "127.0.0.1:7878")]
    pub landmark_addr: SocketAddr,

    /// Width of the physical display in meters.
    #[arg(long, env = "SCREEN_WIDTH_M", default_value_t = 0.6)]
    pub screen_width: f32,

    /// Start with horizontal head motion mirrored; trackers sending
    /// un-mirrored (raw camera) coordinates must set this.
    ///
    /// Landmarks are expected in selfie-mirrored image space by default.
    #[arg(long, env = "INVERT_X")]
    pub invert_x: bool,

    /// Silence on the feed longer than this marks the tracker as stalled.
    #[arg(long, env = "FEED_TIMEOUT_MS", default_value_t = 1000)]
    pub feed_timeout_ms: u64,
}

impl Config {
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_millis(self.feed_timeout_ms.max(1))
    }

    /// Session tuning with the command-line overrides applied.
    pub fn session(&self) -> SessionConfig {
        let mut session = SessionConfig::default();
        session.screen.width_m = self.screen_width;
        session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::try_parse_from(["holographic_viewer"]).unwrap();
        assert_eq!(cfg.models_dir, PathBuf::from("models"));
        assert_eq!(cfg.landmark_addr, "127.0.0.1:7878".parse().unwrap());
        assert!(!cfg.invert_x);
        assert_eq!(cfg.feed_timeout(), Duration::from_secs(1));
        assert_eq!(cfg.session().screen.width_m, 0.6);
    }

    #[test]
    fn overrides() {
        let cfg = Config::try_parse_from([
            "holographic_viewer",
            "--screen-width",
            "0.34",
            "--invert-x",
            "--landmark-addr",
            "0.0.0.0:9000",
        ])
        .unwrap();
        assert!(cfg.invert_x);
        assert_eq!(cfg.session().screen.width_m, 0.34);
        assert_eq!(cfg.landmark_addr.port(), 9000);
    }

    #[test]
    fn invert_x_help_names_unmirrored_trackers() {
        use clap::CommandFactory;
        let cmd = Config::command();
        let arg = cmd
            .get_arguments()
            .find(|a| a.get_id() == "invert_x")
            .unwrap();
        let help = arg.get_help().unwrap().to_string();
        assert!(help.contains("un-mirrored"), "{help}");
    }
}
