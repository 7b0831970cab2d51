use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use super::file_codec::FileCodec;
use crate::models::config::AudioFormat;
use crate::models::error::StreamError;
use crate::models::recording_result::{RecordingMetadata, RecordingResult};
use crate::traits::session_delegate::SessionDelegate;

/// Chunks captured while saving is enabled, protected by `parking_lot::Mutex`.
#[derive(Debug, Default)]
struct Recording {
    enabled: bool,
    chunks: Vec<Vec<u8>>,
    byte_len: u64,
}

/// Taps the sender's raw chunks into an in-memory recording and flushes it
/// to an encrypted file when saving is switched off.
///
/// Cloning yields another handle to the same recording: the sending worker
/// appends through one clone while the control path enables and disables
/// through another. The enabled check and the append happen under one lock,
/// so a chunk is either in the flushed recording or dropped, never both.
#[derive(Clone)]
pub struct Recorder {
    recording: Arc<Mutex<Recording>>,
    codec: FileCodec,
    format: AudioFormat,
    delegate: Option<Arc<dyn SessionDelegate>>,
}

impl Recorder {
    pub fn new(codec: FileCodec, format: AudioFormat) -> Self {
        Self {
            recording: Arc::new(Mutex::new(Recording::default())),
            codec,
            format,
            delegate: None,
        }
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SessionDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Clear the recording and start capturing into it.
    pub fn enable(&self) {
        let mut recording = self.recording.lock();
        recording.enabled = true;
        recording.chunks.clear();
        recording.byte_len = 0;
        log::info!("Recording enabled");
    }

    pub fn is_enabled(&self) -> bool {
        self.recording.lock().enabled
    }

    /// Append a chunk if saving is enabled. Returns whether it was kept.
    pub fn append(&self, chunk: &[u8]) -> bool {
        let mut recording = self.recording.lock();
        if !recording.enabled {
            return false;
        }
        recording.byte_len += chunk.len() as u64;
        recording.chunks.push(chunk.to_vec());
        true
    }

    pub fn chunk_count(&self) -> usize {
        self.recording.lock().chunks.len()
    }

    pub fn byte_len(&self) -> u64 {
        self.recording.lock().byte_len
    }

    /// Stop capturing and flush the recording to `destination`.
    ///
    /// Returns `Ok(None)` without touching the filesystem when nothing was
    /// recorded. The file is written atomically; on failure nothing appears
    /// at `destination` and the chunks are kept so a later `disable` can
    /// retry with another path (a new `enable` discards them).
    pub fn disable(&self, destination: &Path) -> Result<Option<RecordingResult>, StreamError> {
        let (chunks, byte_len) = {
            let mut recording = self.recording.lock();
            recording.enabled = false;
            let byte_len = std::mem::take(&mut recording.byte_len);
            (std::mem::take(&mut recording.chunks), byte_len)
        };

        if chunks.is_empty() {
            log::debug!("Recording disabled with no audio; nothing to save");
            return Ok(None);
        }

        match self.flush(&chunks, byte_len, destination) {
            Ok(result) => {
                log::info!(
                    "Saved {} chunks ({} bytes) to {}",
                    chunks.len(),
                    byte_len,
                    destination.display()
                );
                if let Some(ref delegate) = self.delegate {
                    delegate.on_status(&format!(
                        "Encrypted audio saved to: {}",
                        destination.display()
                    ));
                    delegate.on_recording_saved(&result);
                }
                Ok(Some(result))
            }
            Err(e) => {
                log::error!("Failed to save recording to {}: {}", destination.display(), e);
                if let Some(ref delegate) = self.delegate {
                    delegate.on_status(&format!("Failed to save recording: {}", e));
                }

                let mut recording = self.recording.lock();
                if !recording.enabled && recording.chunks.is_empty() {
                    recording.chunks = chunks;
                    recording.byte_len = byte_len;
                }
                Err(e)
            }
        }
    }

    fn flush(
        &self,
        chunks: &[Vec<u8>],
        byte_len: u64,
        destination: &Path,
    ) -> Result<RecordingResult, StreamError> {
        let file = self.codec.write_file(destination, chunks)?;

        let checksum = hex::encode(Sha256::digest(&file));
        let metadata = RecordingMetadata::new(
            &destination.to_string_lossy(),
            chunks.len(),
            byte_len,
            file.len() as u64,
            &self.format,
            &checksum,
            self.codec.crypto().algorithm(),
        );

        Ok(RecordingResult {
            file_path: destination.to_path_buf(),
            duration_secs: metadata.duration_secs,
            metadata,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::codec::CryptoCodec;
    use crate::crypto::key::SessionKey;
    use crate::models::state::{SessionRole, SessionState};
    use std::fs;
    use std::thread;

    #[derive(Default)]
    struct StatusLog(Mutex<Vec<String>>);

    impl SessionDelegate for StatusLog {
        fn on_status(&self, message: &str) {
            self.0.lock().push(message.to_string());
        }

        fn on_state_changed(&self, _role: SessionRole, _state: &SessionState) {}
    }

    fn recorder() -> Recorder {
        let codec = FileCodec::new(CryptoCodec::new(SessionKey::new([0x33; 16])));
        Recorder::new(codec, AudioFormat::default())
    }

    fn chunk(tag: u8) -> Vec<u8> {
        vec![tag; 2048]
    }

    #[test]
    fn five_chunks_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("call.enc");
        let recorder = recorder();

        recorder.enable();
        let chunks: Vec<Vec<u8>> = (1..=5).map(chunk).collect();
        for c in &chunks {
            assert!(recorder.append(c));
        }

        let result = recorder.disable(&path).unwrap().expect("recording saved");
        assert_eq!(result.file_path, path);
        assert_eq!(result.metadata.chunk_count, 5);
        assert_eq!(result.metadata.plaintext_bytes, 5 * 2048);
        assert_eq!(result.checksum.len(), 64);

        let codec = FileCodec::new(CryptoCodec::new(SessionKey::new([0x33; 16])));
        assert_eq!(codec.read_file(&path).unwrap(), chunks.concat());
        assert!(!recorder.is_enabled());
        assert_eq!(recorder.chunk_count(), 0);
    }

    #[test]
    fn empty_recording_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.enc");
        let recorder = recorder();

        recorder.enable();
        assert_eq!(recorder.disable(&path).unwrap(), None);
        assert!(!path.exists());
    }

    #[test]
    fn append_ignored_while_disabled() {
        let recorder = recorder();
        assert!(!recorder.append(&chunk(1)));
        assert_eq!(recorder.chunk_count(), 0);
    }

    #[test]
    fn enable_clears_previous_recording() {
        let recorder = recorder();
        recorder.enable();
        recorder.append(&chunk(1));
        recorder.append(&chunk(2));
        assert_eq!(recorder.byte_len(), 4096);

        recorder.enable();
        assert_eq!(recorder.chunk_count(), 0);
        assert_eq!(recorder.byte_len(), 0);
    }

    #[test]
    fn failed_flush_leaves_no_file_and_keeps_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let occupied = dir.path().join("occupied");
        fs::create_dir(&occupied).unwrap();

        let mut recorder = recorder();
        let log = Arc::new(StatusLog::default());
        recorder.set_delegate(log.clone());

        recorder.enable();
        recorder.append(&chunk(7));
        let err = recorder.disable(&occupied).unwrap_err();
        assert_eq!(err.kind(), "storage");
        assert!(occupied.is_dir());
        assert_eq!(recorder.chunk_count(), 1);
        assert!(log.0.lock()[0].starts_with("Failed to save recording"));

        let retry = dir.path().join("retry.enc");
        assert!(recorder.disable(&retry).unwrap().is_some());
        assert!(retry.exists());
        assert!(log.0.lock()[1].starts_with("Encrypted audio saved to"));
    }

    #[test]
    fn concurrent_append_and_flush_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = recorder();
        let codec = FileCodec::new(CryptoCodec::new(SessionKey::new([0x33; 16])));
        recorder.enable();

        let writer = recorder.clone();
        let producer = thread::spawn(move || {
            let mut kept = Vec::new();
            for i in 0..5000u32 {
                let c = i.to_be_bytes().to_vec();
                if writer.append(&c) {
                    kept.push(c);
                }
            }
            kept
        });

        // disable immediately followed by enable: anything refused in
        // between was never kept, so nothing kept can be cleared.
        let mut flushed = Vec::new();
        for round in 0..50 {
            let path = dir.path().join(format!("part-{}.enc", round));
            if let Some(result) = recorder.disable(&path).unwrap() {
                flushed.push(codec.read_file(&result.file_path).unwrap());
            }
            recorder.enable();
        }
        let kept = producer.join().unwrap();

        let last = dir.path().join("last.enc");
        if let Some(result) = recorder.disable(&last).unwrap() {
            flushed.push(codec.read_file(&result.file_path).unwrap());
        }

        assert_eq!(flushed.concat(), kept.concat());
    }
}
