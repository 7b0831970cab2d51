//! Activity metering for the level indicator.

use crate::models::config::AudioFormat;

/// Decode little-endian PCM into normalized samples in `[-1.0, 1.0]`.
///
/// 8-bit PCM is unsigned; wider depths are signed. Trailing bytes that do
/// not form a whole sample are ignored.
pub fn normalized_samples(pcm: &[u8], bit_depth: u16) -> Vec<f32> {
    match bit_depth {
        8 => pcm.iter().map(|&b| (b as f32 - 128.0) / 128.0).collect(),
        16 => pcm
            .chunks_exact(2)
            .map(|s| i16::from_le_bytes([s[0], s[1]]) as f32 / 32768.0)
            .collect(),
        24 => pcm
            .chunks_exact(3)
            .map(|s| {
                // Sign-extend through the top byte of an i32.
                let v = i32::from_le_bytes([0, s[0], s[1], s[2]]) >> 8;
                v as f32 / 8_388_608.0
            })
            .collect(),
        32 => pcm
            .chunks_exact(4)
            .map(|s| i32::from_le_bytes([s[0], s[1], s[2], s[3]]) as f32 / 2_147_483_648.0)
            .collect(),
        _ => Vec::new(),
    }
}

/// Root-mean-square level of normalized samples.
pub fn rms_level(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Activity level of a raw chunk on a 0–100 scale (RMS, linear).
pub fn activity_level(chunk: &[u8], format: &AudioFormat) -> u8 {
    let rms = rms_level(&normalized_samples(chunk, format.bit_depth));
    (rms * 100.0).round().clamp(0.0, 100.0) as u8
}
