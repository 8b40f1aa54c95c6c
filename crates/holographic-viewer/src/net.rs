//! Landmark feed: JSON datagrams from the face tracker, received on a
//! background thread and handed to the render loop through a bounded channel.

use crossbeam_channel::{Sender, TrySendError};
use parallax_core::LandmarkFrame;
use std::{
    net::{SocketAddr, UdpSocket as StdUdpSocket},
    thread,
    time::Duration,
};

/// Largest datagram accepted; a 478-point face encodes to well under this.
const MAX_DATAGRAM: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub enum FeedMessage {
    Frame(LandmarkFrame),
    /// Nothing arrived within the configured timeout.
    Stalled,
    /// The feed stopped and will not recover.
    Unavailable(String),
}

/// A bound, not yet running, landmark socket.
pub struct LandmarkFeed {
    socket: StdUdpSocket,
}

impl LandmarkFeed {
    pub fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
        let socket = StdUdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    /// Runs the receive loop on its own thread until the receiver hangs up.
    pub fn spawn(self, timeout: Duration, tx: Sender<FeedMessage>) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_io()
                .enable_time()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    let _ = tx.send(FeedMessage::Unavailable(format!("runtime: {e}")));
                    return;
                }
            };

            rt.block_on(async move {
                match run_feed_loop(self.socket, timeout, &tx).await {
                    Ok(()) => log::info!("Landmark feed closed"),
                    Err(e) => {
                        log::error!("Landmark feed error: {e}");
                        let _ = tx.send(FeedMessage::Unavailable(e.to_string()));
                    }
                }
            });
        })
    }
}

async fn run_feed_loop(
    socket: StdUdpSocket,
    timeout: Duration,
    tx: &Sender<FeedMessage>,
) -> anyhow::Result<()> {
    let socket = tokio::net::UdpSocket::from_std(socket)?;
    log::info!("Listening for landmarks on {}", socket.local_addr()?);

    let mut buf = vec![0u8; MAX_DATAGRAM];
    let mut stalled = false;

    loop {
        match tokio::time::timeout(timeout, socket.recv_from(&mut buf)).await {
            Err(_elapsed) => {
                if !stalled {
                    stalled = true;
                    if tx.send(FeedMessage::Stalled).is_err() {
                        return Ok(());
                    }
                }
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok((len, peer))) => {
                let Some(frame) = decode_datagram(&buf[..len], peer) else {
                    continue;
                };
                stalled = false;
                // Drop the frame if the render loop hasn't consumed the previous ones.
                match tx.try_send(FeedMessage::Frame(frame)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => {
                        log::debug!("Dropped landmark frame (render loop busy)");
                    }
                    Err(TrySendError::Disconnected(_)) => return Ok(()),
                }
            }
        }
    }
}

/// Malformed datagrams are logged and skipped.
fn decode_datagram(bytes: &[u8], peer: SocketAddr) -> Option<LandmarkFrame> {
    match LandmarkFrame::from_json(bytes) {
        Ok(frame) => Some(frame),
        Err(e) => {
            log::warn!("Discarding malformed landmark datagram from {peer}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn peer() -> SocketAddr {
        "127.0.0.1:1".parse().unwrap()
    }

    #[test]
    fn decodes_tracker_datagrams() {
        let json = br#"{"timestamp": 12.5, "faces": [[{"x": 0.4, "y": 0.5, "z": -0.01}]]}"#;
        let frame = decode_datagram(json, peer()).unwrap();
        assert_eq!(frame.timestamp, 12.5);
        assert_eq!(frame.faces.len(), 1);

        let no_faces = decode_datagram(br#"{"timestamp": 1.0}"#, peer()).unwrap();
        assert!(no_faces.primary_face().is_none());

        assert!(decode_datagram(b"\x00\x01garbage", peer()).is_none());
    }

    #[test]
    fn delivers_frames_then_reports_stall() {
        let feed = LandmarkFeed::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = feed.local_addr().unwrap();
        let (tx, rx) = bounded(4);
        let _handle = feed.spawn(Duration::from_millis(100), tx);

        let sender = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        sender.send_to(b"not json", addr).unwrap();
        let datagram = serde_json::json!({"timestamp": 3.0, "faces": []});
        sender
            .send_to(&serde_json::to_vec(&datagram).unwrap(), addr)
            .unwrap();

        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            FeedMessage::Frame(frame) => assert_eq!(frame.timestamp, 3.0),
            other => panic!("expected a frame, got {other:?}"),
        }
        match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            FeedMessage::Stalled => {}
            other => panic!("expected a stall, got {other:?}"),
        }
    }
}
