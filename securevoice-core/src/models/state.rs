use super::error::StreamError;

/// Which end of the stream a session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionRole {
    Sender,
    Receiver,
}

impl SessionRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sender => "sender",
            Self::Receiver => "receiver",
        }
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// The peer closed the connection at a frame boundary.
    EndOfStream,
    /// The capture source reported the end of its input.
    CaptureFinished,
    /// `SessionCloser::close` was invoked.
    Closed,
    Failed(StreamError),
}

impl Termination {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Session state machine.
///
/// State transitions:
/// ```text
/// idle → connecting → streaming → terminated
///            ↓                        ↑
///            └────────────────────────┘
/// ```
/// `Terminated` is absorbing: there is no reconnect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Streaming,
    Terminated(Termination),
}

impl SessionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated(_))
    }

    /// The error that ended the session, if it ended in failure.
    pub fn terminal_error(&self) -> Option<&StreamError> {
        match self {
            Self::Terminated(Termination::Failed(e)) => Some(e),
            _ => None,
        }
    }
}
