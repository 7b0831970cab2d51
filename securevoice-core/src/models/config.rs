use std::time::Duration;

/// Default cap on an incoming frame's announced length (1 MiB).
///
/// A 1024-sample 16-bit chunk is about 2 KiB once encrypted, so this leaves
/// ample room while refusing absurd length prefixes.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1024 * 1024;

/// Default peer address, matching the fixed host/port both ends agree on.
pub const DEFAULT_ADDRESS: &str = "127.0.0.1:9999";

/// PCM layout of the raw chunks flowing through a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioFormat {
    /// Sample rate in Hz (default: 44100).
    pub sample_rate: u32,

    /// Number of interleaved channels (default: 1).
    pub channels: u16,

    /// Bit depth of each sample (default: 16).
    pub bit_depth: u16,
}

impl AudioFormat {
    /// Bytes per second as stored in a WAV header, if it fits in 32 bits.
    pub fn byte_rate(&self) -> Option<u32> {
        self.sample_rate
            .checked_mul(self.channels as u32)?
            .checked_mul(self.bit_depth as u32)
            .map(|bits| bits / 8)
    }

    /// Bytes per sample frame across all channels, if it fits in 16 bits.
    pub fn block_align(&self) -> Option<u16> {
        self.channels
            .checked_mul(self.bit_depth)
            .map(|bits| bits / 8)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![8, 16, 24, 32].contains(&self.bit_depth) {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        if self.byte_rate().is_none() || self.block_align().is_none() {
            return Err(format!(
                "{} Hz x {} channels x {} bits is too large for a PCM stream",
                self.sample_rate, self.channels, self.bit_depth
            ));
        }
        Ok(())
    }

    pub fn bytes_per_second(&self) -> u64 {
        self.sample_rate as u64 * self.channels as u64 * self.bit_depth as u64 / 8
    }

    /// Playback duration of `byte_len` bytes of PCM in this format.
    pub fn duration_secs(&self, byte_len: u64) -> f64 {
        match self.bytes_per_second() {
            0 => 0.0,
            rate => byte_len as f64 / rate as f64,
        }
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            channels: 1,
            bit_depth: 16,
        }
    }
}

/// Configuration for a streaming session.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfiguration {
    /// `host:port` the sender connects to or the receiver binds.
    pub address: String,

    /// Largest frame the receiver accepts (None = unlimited).
    pub max_frame_size: Option<usize>,

    /// Bound on the sender's connect attempt (None = OS default).
    pub connect_timeout: Option<Duration>,

    /// Layout of the raw chunks, used for activity metering and recordings.
    pub audio: AudioFormat,
}

impl StreamConfiguration {
    pub fn with_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("address must not be empty".into());
        }
        if self.max_frame_size == Some(0) {
            return Err("max frame size must be positive".into());
        }
        if self.connect_timeout == Some(Duration::ZERO) {
            return Err("connect timeout must be positive".into());
        }
        self.audio.validate()
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            max_frame_size: Some(DEFAULT_MAX_FRAME_SIZE),
            connect_timeout: None,
            audio: AudioFormat::default(),
        }
    }
}
