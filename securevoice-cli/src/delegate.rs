use securevoice_core::{RecordingResult, SessionDelegate, SessionRole, SessionState};

/// Reports session events as log lines on stderr.
pub struct LogDelegate;

impl SessionDelegate for LogDelegate {
    fn on_status(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_state_changed(&self, role: SessionRole, state: &SessionState) {
        let label = match state {
            SessionState::Idle => "not connected",
            SessionState::Connecting => "connecting",
            SessionState::Streaming => "connected",
            SessionState::Terminated(t) if t.is_failure() => "disconnected (failed)",
            SessionState::Terminated(_) => "disconnected",
        };
        log::info!("[{}] {}", role.as_str(), label);
    }

    fn on_activity_level(&self, level: u8) {
        log::trace!("activity level {}", level);
    }

    fn on_recording_saved(&self, result: &RecordingResult) {
        log::info!(
            "Recording {} ({:.1}s, sha256 {})",
            result.file_path.display(),
            result.duration_secs,
            result.checksum
        );
    }
}
