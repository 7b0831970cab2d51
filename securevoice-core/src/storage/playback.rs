use std::path::Path;

use super::atomic::write_atomically;
use super::file_codec::FileCodec;
use crate::models::config::AudioFormat;
use crate::models::error::StreamError;
use crate::processing::wav_format;

/// Write decrypted PCM as a playable WAV file.
pub fn export_wav(pcm: &[u8], format: &AudioFormat, path: &Path) -> Result<(), StreamError> {
    let wav = wav_format::to_wav_bytes(pcm, format)?;
    write_atomically(path, &wav)
}

/// Decrypt a saved recording and export it as WAV for an external player.
///
/// Returns the number of PCM bytes written.
pub fn decrypt_to_wav(
    codec: &FileCodec,
    source: &Path,
    destination: &Path,
    format: &AudioFormat,
) -> Result<usize, StreamError> {
    format.validate().map_err(StreamError::ConfigurationFailed)?;
    let pcm = codec.read_file(source)?;
    export_wav(&pcm, format, destination)?;
    log::info!(
        "Decrypted {} ({} bytes of audio) to {}",
        source.display(),
        pcm.len(),
        destination.display()
    );
    Ok(pcm.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::codec::CryptoCodec;
    use crate::crypto::key::SessionKey;
    use crate::processing::wav_format::WAV_HEADER_SIZE;
    use std::fs;

    #[test]
    fn decrypts_recording_into_wav() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("rec.enc");
        let destination = dir.path().join("rec.wav");
        let codec = FileCodec::new(CryptoCodec::new(SessionKey::new([1; 16])));

        let pcm = vec![0x10u8; 4096];
        fs::write(&source, codec.encode(&[&pcm[..2048], &pcm[2048..]]).unwrap()).unwrap();

        let written = decrypt_to_wav(&codec, &source, &destination, &AudioFormat::default()).unwrap();
        assert_eq!(written, 4096);

        let wav = fs::read(&destination).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[WAV_HEADER_SIZE..], pcm.as_slice());
    }

    #[test]
    fn wrong_key_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("rec.enc");
        let destination = dir.path().join("rec.wav");

        let writer = FileCodec::new(CryptoCodec::new(SessionKey::new([1; 16])));
        fs::write(&source, writer.encode(&[vec![0u8; 1024]]).unwrap()).unwrap();

        let reader = FileCodec::new(CryptoCodec::new(SessionKey::new([2; 16])));
        // Wrong key almost always breaks the padding; if it happens not to,
        // the output is still garbage rather than the original audio.
        match decrypt_to_wav(&reader, &source, &destination, &AudioFormat::default()) {
            Err(e) => {
                assert_eq!(e.kind(), "crypto");
                assert!(!destination.exists());
            }
            Ok(_) => {
                let wav = fs::read(&destination).unwrap();
                assert_ne!(&wav[WAV_HEADER_SIZE..], vec![0u8; 1024].as_slice());
            }
        }
    }

    #[test]
    fn invalid_format_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("out.wav");
        let format = AudioFormat {
            sample_rate: 4_000_000_000,
            channels: 2,
            bit_depth: 16,
        };

        let err = export_wav(&[0u8; 4], &format, &destination).unwrap_err();
        assert!(matches!(err, StreamError::ConfigurationFailed(_)));
        assert!(!destination.exists());
    }
}
