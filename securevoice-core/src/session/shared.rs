use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::StreamError;
use crate::models::recording_result::SessionStats;
use crate::models::state::{SessionRole, SessionState, Termination};
use crate::traits::session_delegate::SessionDelegate;

/// State shared between a session's worker and its closers.
pub(crate) struct SessionShared {
    role: SessionRole,
    state: Mutex<SessionState>,
    stats: Mutex<SessionStats>,
    delegate: Mutex<Option<Arc<dyn SessionDelegate>>>,
    closed: AtomicBool,
    // Clone of the live connection, kept so `close` can shut it down.
    connection: Mutex<Option<TcpStream>>,
    listen_addr: Mutex<Option<SocketAddr>>,
}

impl SessionShared {
    pub(crate) fn new(role: SessionRole) -> Arc<Self> {
        Arc::new(Self {
            role,
            state: Mutex::new(SessionState::Idle),
            stats: Mutex::new(SessionStats::default()),
            delegate: Mutex::new(None),
            closed: AtomicBool::new(false),
            connection: Mutex::new(None),
            listen_addr: Mutex::new(None),
        })
    }

    pub(crate) fn role(&self) -> SessionRole {
        self.role
    }

    pub(crate) fn set_delegate(&self, delegate: Arc<dyn SessionDelegate>) {
        *self.delegate.lock() = Some(delegate);
    }

    fn delegate(&self) -> Option<Arc<dyn SessionDelegate>> {
        self.delegate.lock().clone()
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    pub(crate) fn stats(&self) -> SessionStats {
        *self.stats.lock()
    }

    pub(crate) fn update_stats(&self, update: impl FnOnce(&mut SessionStats)) {
        update(&mut *self.stats.lock());
    }

    pub(crate) fn set_state(&self, new_state: SessionState) {
        *self.state.lock() = new_state.clone();
        log::debug!("{} state: {:?}", self.role.as_str(), new_state);
        if let Some(delegate) = self.delegate() {
            delegate.on_state_changed(self.role, &new_state);
        }
    }

    pub(crate) fn status(&self, message: &str) {
        log::info!("{}: {}", self.role.as_str(), message);
        if let Some(delegate) = self.delegate() {
            delegate.on_status(message);
        }
    }

    pub(crate) fn activity(&self, level: u8) {
        if let Some(delegate) = self.delegate() {
            delegate.on_activity_level(level);
        }
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Keep a handle on the live connection for `close`.
    ///
    /// Callers check `is_closed` after attaching; together with `close`
    /// taking the same lock, a close can never slip between the two.
    pub(crate) fn attach(&self, stream: &TcpStream) -> Result<(), StreamError> {
        let clone = stream
            .try_clone()
            .map_err(|e| StreamError::Connection(format!("failed to clone connection: {}", e)))?;
        *self.connection.lock() = Some(clone);
        Ok(())
    }

    pub(crate) fn set_listen_addr(&self, addr: Option<SocketAddr>) {
        *self.listen_addr.lock() = addr;
    }

    /// Mark the session closed and unblock whatever the worker is waiting on.
    pub(crate) fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        log::info!("{}: close requested", self.role.as_str());

        if let Some(ref stream) = *self.connection.lock() {
            let _ = stream.shutdown(Shutdown::Both);
        }

        // A pending accept only returns once someone connects.
        let listen_addr = *self.listen_addr.lock();
        if let Some(mut addr) = listen_addr {
            if addr.ip().is_unspecified() {
                addr.set_ip(match addr {
                    SocketAddr::V4(_) => std::net::Ipv4Addr::LOCALHOST.into(),
                    SocketAddr::V6(_) => std::net::Ipv6Addr::LOCALHOST.into(),
                });
            }
            let _ = TcpStream::connect(addr);
        }
    }

    /// Move to `Terminated`, release the connection and report the outcome.
    pub(crate) fn finish(
        &self,
        outcome: Result<Termination, StreamError>,
    ) -> Result<Termination, StreamError> {
        *self.connection.lock() = None;
        *self.listen_addr.lock() = None;

        let termination = outcome.unwrap_or_else(Termination::Failed);
        match termination {
            Termination::EndOfStream => self.status("Peer disconnected; stream ended"),
            Termination::CaptureFinished => self.status("Capture finished; connection closed"),
            Termination::Closed => self.status("Session closed"),
            Termination::Failed(ref e) => {
                log::error!("{} session failed: {}", self.role.as_str(), e);
                self.status(&format!("{} failed: {}", self.role.as_str(), e));
            }
        }
        self.set_state(SessionState::Terminated(termination.clone()));

        match termination {
            Termination::Failed(e) => Err(e),
            ended => Ok(ended),
        }
    }
}
