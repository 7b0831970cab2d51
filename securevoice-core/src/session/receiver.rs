use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use super::shared::SessionShared;
use crate::crypto::codec::CryptoCodec;
use crate::models::config::StreamConfiguration;
use crate::models::error::StreamError;
use crate::models::state::{SessionRole, SessionState, Termination};
use crate::processing::level;
use crate::traits::chunk_sink::ChunkSink;
use crate::traits::session_delegate::SessionDelegate;
use crate::transport::frame;

/// Receiving half: accept one sender, then read → decrypt → deliver.
///
/// A receiver serves exactly one connection. Once that peer leaves, the
/// session is over and a new one must be built to listen again.
pub struct ReceiverSession {
    config: StreamConfiguration,
    codec: CryptoCodec,
    sink: Box<dyn ChunkSink>,
    listener: Option<TcpListener>,
    pub(crate) shared: Arc<SessionShared>,
}

impl ReceiverSession {
    pub fn new(config: StreamConfiguration, codec: CryptoCodec, sink: impl ChunkSink + 'static) -> Self {
        Self {
            config,
            codec,
            sink: Box::new(sink),
            listener: None,
            shared: SessionShared::new(SessionRole::Receiver),
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.shared.set_delegate(delegate);
    }

    pub fn config(&self) -> &StreamConfiguration {
        &self.config
    }

    /// Bind and listen without waiting for the sender yet.
    ///
    /// Transitions idle → connecting and returns the bound address (useful
    /// when binding port 0). `run` binds on its own if this was not called.
    pub fn bind(&mut self) -> Result<SocketAddr, StreamError> {
        if let Some(ref listener) = self.listener {
            return listener
                .local_addr()
                .map_err(|e| StreamError::Connection(format!("failed to read bound address: {}", e)));
        }
        if !self.shared.state().is_idle() {
            return Err(StreamError::ConfigurationFailed(
                "session already started; create a new session to listen again".into(),
            ));
        }

        match self.listen() {
            Ok(addr) => Ok(addr),
            Err(e) => {
                // Reports the failure and moves to terminated.
                let _ = self.shared.finish(Err(e.clone()));
                Err(e)
            }
        }
    }

    fn listen(&mut self) -> Result<SocketAddr, StreamError> {
        self.config
            .validate()
            .map_err(StreamError::ConfigurationFailed)?;

        self.shared.set_state(SessionState::Connecting);
        let listener = TcpListener::bind(&self.config.address).map_err(|e| {
            StreamError::Connection(format!("failed to listen on {}: {}", self.config.address, e))
        })?;
        let addr = listener
            .local_addr()
            .map_err(|e| StreamError::Connection(format!("failed to read bound address: {}", e)))?;

        self.shared.set_listen_addr(Some(addr));
        self.listener = Some(listener);
        self.shared
            .status(&format!("Waiting for sender to connect on {}...", addr));
        Ok(addr)
    }

    /// Accept the sender and deliver its chunks until the stream ends, a
    /// frame or payload is bad, or the session is closed.
    pub fn run(&mut self) -> Result<Termination, StreamError> {
        if self.listener.is_none() {
            self.bind()?;
        }

        let outcome = self.stream();
        self.shared.finish(outcome)
    }

    fn stream(&mut self) -> Result<Termination, StreamError> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| StreamError::ConfigurationFailed("receiver is not listening".into()))?;

        if self.shared.is_closed() {
            return Ok(Termination::Closed);
        }

        let accepted = listener.accept();
        // One peer per session: stop listening as soon as accept returns.
        drop(listener);
        self.shared.set_listen_addr(None);

        let (mut stream, peer) = match accepted {
            Ok(pair) => pair,
            Err(_) if self.shared.is_closed() => return Ok(Termination::Closed),
            Err(e) => {
                return Err(StreamError::Connection(format!("accept failed: {}", e)));
            }
        };

        self.shared.attach(&stream)?;
        if self.shared.is_closed() {
            return Ok(Termination::Closed);
        }

        self.shared
            .status(&format!("Connection established with sender {}", peer));
        self.shared.set_state(SessionState::Streaming);

        loop {
            let payload = match frame::read_frame(&mut stream, self.config.max_frame_size) {
                Ok(Some(payload)) => payload,
                Ok(None) if self.shared.is_closed() => return Ok(Termination::Closed),
                Ok(None) => return Ok(Termination::EndOfStream),
                Err(_) if self.shared.is_closed() => return Ok(Termination::Closed),
                Err(e) => return Err(e),
            };

            let chunk = self.codec.decrypt(&payload)?;
            self.sink.deliver(&chunk)?;

            self.shared.update_stats(|stats| {
                stats.frames += 1;
                stats.payload_bytes += payload.len() as u64;
                stats.plaintext_bytes += chunk.len() as u64;
            });
            self.shared
                .activity(level::activity_level(&chunk, &self.config.audio));
        }
    }
}
