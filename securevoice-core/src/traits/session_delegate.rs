use crate::models::recording_result::RecordingResult;
use crate::models::state::{SessionRole, SessionState};

/// Observer for session and recording notifications.
///
/// All methods are called from worker threads, not the UI thread.
/// Implementations should marshal to the UI thread if needed.
pub trait SessionDelegate: Send + Sync {
    /// Human-readable status line (start, success, terminal failure).
    fn on_status(&self, message: &str);

    /// Called when a session's connection state changes.
    fn on_state_changed(&self, role: SessionRole, state: &SessionState);

    /// Activity level of the last chunk sent or received, 0–100.
    fn on_activity_level(&self, _level: u8) {}

    /// Called when a recording has been flushed to its destination.
    fn on_recording_saved(&self, _result: &RecordingResult) {}
}
