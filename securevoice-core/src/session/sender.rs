use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use super::shared::SessionShared;
use crate::crypto::codec::CryptoCodec;
use crate::models::config::StreamConfiguration;
use crate::models::error::StreamError;
use crate::models::state::{SessionRole, SessionState, Termination};
use crate::processing::level;
use crate::storage::recorder::Recorder;
use crate::traits::capture_source::CaptureSource;
use crate::traits::session_delegate::SessionDelegate;
use crate::transport::frame;

/// Sending half: capture → (record) → encrypt → frame → transmit.
///
/// ```text
/// [CaptureSource] → chunk ─┬→ [CryptoCodec] → [write_frame] → TCP
///                          └→ [Recorder] (while saving is enabled)
/// ```
pub struct SenderSession {
    config: StreamConfiguration,
    codec: CryptoCodec,
    capture: Box<dyn CaptureSource>,
    recorder: Option<Recorder>,
    pub(crate) shared: Arc<SessionShared>,
}

impl SenderSession {
    pub fn new(
        config: StreamConfiguration,
        codec: CryptoCodec,
        capture: impl CaptureSource + 'static,
    ) -> Self {
        Self {
            config,
            codec,
            capture: Box::new(capture),
            recorder: None,
            shared: SessionShared::new(SessionRole::Sender),
        }
    }

    /// Tap every captured chunk into `recorder` (kept only while it is enabled).
    pub fn with_recorder(mut self, recorder: Recorder) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.shared.set_delegate(delegate);
    }

    pub fn config(&self) -> &StreamConfiguration {
        &self.config
    }

    /// Connect and stream until capture ends, something fails, or the
    /// session is closed.
    pub fn run(&mut self) -> Result<Termination, StreamError> {
        if !self.shared.state().is_idle() {
            return Err(StreamError::ConfigurationFailed(
                "session already started; create a new session to stream again".into(),
            ));
        }

        self.shared.status("Sending encrypted audio...");
        let outcome = self.stream();
        self.shared.finish(outcome)
    }

    fn stream(&mut self) -> Result<Termination, StreamError> {
        self.config
            .validate()
            .map_err(StreamError::ConfigurationFailed)?;

        self.shared.set_state(SessionState::Connecting);
        // A pending connect cannot be interrupted; `connect_timeout` bounds it.
        if self.shared.is_closed() {
            return Ok(Termination::Closed);
        }
        let mut stream = connect(&self.config.address, self.config.connect_timeout)?;
        if let Err(e) = stream.set_nodelay(true) {
            log::warn!("Failed to disable Nagle on sender socket: {}", e);
        }

        self.shared.attach(&stream)?;
        if self.shared.is_closed() {
            return Ok(Termination::Closed);
        }

        self.shared
            .status(&format!("Connected to receiver at {}", self.config.address));
        self.shared.set_state(SessionState::Streaming);

        loop {
            if self.shared.is_closed() {
                return Ok(Termination::Closed);
            }

            let chunk = match self.capture.next_chunk() {
                Ok(Some(chunk)) => chunk,
                Ok(None) => {
                    let _ = stream.shutdown(Shutdown::Write);
                    return Ok(Termination::CaptureFinished);
                }
                Err(_) if self.shared.is_closed() => return Ok(Termination::Closed),
                Err(e) => return Err(e),
            };

            let recorded = self
                .recorder
                .as_ref()
                .is_some_and(|recorder| recorder.append(&chunk));

            let payload = self.codec.encrypt(&chunk)?;

            if let Err(e) = frame::write_frame(&mut stream, &payload) {
                if self.shared.is_closed() {
                    return Ok(Termination::Closed);
                }
                return Err(e);
            }

            self.shared.update_stats(|stats| {
                stats.frames += 1;
                stats.payload_bytes += payload.len() as u64;
                stats.plaintext_bytes += chunk.len() as u64;
                if recorded {
                    stats.chunks_recorded += 1;
                }
            });
            self.shared
                .activity(level::activity_level(&chunk, &self.config.audio));
        }
    }
}

/// Resolve `address` and connect to the first endpoint that accepts.
fn connect(address: &str, timeout: Option<Duration>) -> Result<TcpStream, StreamError> {
    let Some(timeout) = timeout else {
        return TcpStream::connect(address)
            .map_err(|e| StreamError::Connection(format!("failed to connect to {}: {}", address, e)));
    };

    let addrs = address
        .to_socket_addrs()
        .map_err(|e| StreamError::Connection(format!("failed to resolve {}: {}", address, e)))?;

    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }

    Err(StreamError::Connection(match last_error {
        Some(e) => format!("failed to connect to {}: {}", address, e),
        None => format!("{} did not resolve to any address", address),
    }))
}
