use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::AudioFormat;

/// Result returned when a recording has been flushed to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub metadata: RecordingMetadata,
    pub checksum: String,
}

/// Metadata stored alongside a saved recording.
///
/// Serializable for the JSON sidecar written next to the `.enc` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub file_path: String,
    pub chunk_count: usize,
    pub plaintext_bytes: u64,
    pub file_bytes: u64,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
    pub checksum: String,
    pub encryption_algorithm: String,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn new(
        file_path: &str,
        chunk_count: usize,
        plaintext_bytes: u64,
        file_bytes: u64,
        format: &AudioFormat,
        checksum: &str,
        encryption_algorithm: &str,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: file_path.to_string(),
            chunk_count,
            plaintext_bytes,
            file_bytes,
            duration_secs: format.duration_secs(plaintext_bytes),
            sample_rate: format.sample_rate,
            channels: format.channels,
            bit_depth: format.bit_depth,
            checksum: checksum.to_string(),
            encryption_algorithm: encryption_algorithm.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Counters for one session's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub frames: u64,
    pub payload_bytes: u64,
    pub plaintext_bytes: u64,
    pub chunks_recorded: u64,
}
