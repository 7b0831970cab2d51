//! Long-running streaming sessions.
//!
//! A [`Session`] is one of two roles behind a single interface. Each runs a
//! blocking loop, usually on its own worker via [`Session::spawn`], and can be
//! stopped from any thread through a [`SessionCloser`], which closes the
//! underlying socket so the blocked accept, read or write returns.

pub mod receiver;
pub mod sender;
mod shared;

use std::sync::Arc;
use std::thread;

use crate::models::error::StreamError;
use crate::models::recording_result::SessionStats;
use crate::models::state::{SessionRole, SessionState, Termination};
use crate::traits::session_delegate::SessionDelegate;

pub use receiver::ReceiverSession;
pub use sender::SenderSession;
use shared::SessionShared;

/// A sending or receiving session.
pub enum Session {
    Sender(SenderSession),
    Receiver(ReceiverSession),
}

impl Session {
    fn shared(&self) -> &Arc<SessionShared> {
        match self {
            Self::Sender(s) => &s.shared,
            Self::Receiver(r) => &r.shared,
        }
    }

    pub fn role(&self) -> SessionRole {
        self.shared().role()
    }

    pub fn state(&self) -> SessionState {
        self.shared().state()
    }

    /// The error that ended the session, if it ended in failure.
    pub fn terminal_error(&self) -> Option<StreamError> {
        self.state().terminal_error().cloned()
    }

    pub fn stats(&self) -> SessionStats {
        self.shared().stats()
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.shared().set_delegate(delegate);
    }

    /// Handle that can stop this session from another thread.
    pub fn closer(&self) -> SessionCloser {
        SessionCloser {
            shared: Arc::clone(self.shared()),
        }
    }

    /// Run the session loop on the calling thread until it terminates.
    ///
    /// `Ok` carries a normal ending (peer closed, capture finished, closed
    /// locally); `Err` is a failure, also recorded as the terminal error.
    pub fn run(&mut self) -> Result<Termination, StreamError> {
        match self {
            Self::Sender(s) => s.run(),
            Self::Receiver(r) => r.run(),
        }
    }

    /// Run the session on a dedicated named worker thread.
    pub fn spawn(mut self) -> Result<SessionHandle, StreamError> {
        let closer = self.closer();
        let name = format!("securevoice-{}", self.role().as_str());

        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || self.run())
            .map_err(|e| StreamError::Worker(format!("failed to spawn session thread: {}", e)))?;

        Ok(SessionHandle { closer, handle })
    }
}

impl From<SenderSession> for Session {
    fn from(session: SenderSession) -> Self {
        Self::Sender(session)
    }
}

impl From<ReceiverSession> for Session {
    fn from(session: ReceiverSession) -> Self {
        Self::Receiver(session)
    }
}

/// Stops a session from outside its worker.
///
/// Closing shuts down the live connection, or wakes a receiver still waiting
/// for its peer. The session then terminates with [`Termination::Closed`].
/// Closing twice, or after the session ended, does nothing.
#[derive(Clone)]
pub struct SessionCloser {
    shared: Arc<SessionShared>,
}

impl SessionCloser {
    pub fn close(&self) {
        self.shared.close();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn stats(&self) -> SessionStats {
        self.shared.stats()
    }
}

/// A session running on its own worker thread.
pub struct SessionHandle {
    closer: SessionCloser,
    handle: thread::JoinHandle<Result<Termination, StreamError>>,
}

impl SessionHandle {
    pub fn closer(&self) -> &SessionCloser {
        &self.closer
    }

    pub fn close(&self) {
        self.closer.close();
    }

    pub fn state(&self) -> SessionState {
        self.closer.state()
    }

    /// Wait for the worker and return how the session ended.
    pub fn join(self) -> Result<Termination, StreamError> {
        self.handle
            .join()
            .map_err(|_| StreamError::Worker("session thread panicked".into()))?
    }
}
