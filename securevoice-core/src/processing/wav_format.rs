//! WAV container helpers for playing back decrypted recordings.
//!
//! Decrypted recordings are headerless PCM; an external player needs the
//! standard 44-byte RIFF header in front of them.

use crate::models::config::AudioFormat;
use crate::models::error::StreamError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Largest PCM body a RIFF header can describe.
pub const MAX_WAV_DATA_SIZE: usize = (u32::MAX - 36) as usize;

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian. Fails with
/// `ConfigurationFailed` when `format` cannot be described by a header.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(
    format: &AudioFormat,
    data_size: u32,
) -> Result<[u8; WAV_HEADER_SIZE], StreamError> {
    format.validate().map_err(StreamError::ConfigurationFailed)?;
    let (Some(byte_rate), Some(block_align)) = (format.byte_rate(), format.block_align()) else {
        return Err(StreamError::ConfigurationFailed(
            "audio format does not fit in a WAV header".into(),
        ));
    };

    let mut header = [0u8; WAV_HEADER_SIZE];
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&data_size.saturating_add(36).to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&format.bit_depth.to_le_bytes());

    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}

/// Wrap raw PCM in a complete in-memory WAV file.
pub fn to_wav_bytes(pcm: &[u8], format: &AudioFormat) -> Result<Vec<u8>, StreamError> {
    if pcm.len() > MAX_WAV_DATA_SIZE {
        return Err(StreamError::StorageError(format!(
            "{} bytes of PCM do not fit in a WAV file",
            pcm.len()
        )));
    }

    let header = generate_wav_header(format, pcm.len() as u32)?;
    let mut wav = Vec::with_capacity(WAV_HEADER_SIZE + pcm.len());
    wav.extend_from_slice(&header);
    wav.extend_from_slice(pcm);
    Ok(wav)
}
