use thiserror::Error;

/// Failures of the symmetric payload codec.
///
/// Every variant means the payload cannot be trusted: corruption,
/// truncation, or a key that does not match the sender's.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("encrypted payload too short: {len} bytes")]
    TooShort { len: usize },

    #[error("ciphertext length {len} is not a multiple of the block size")]
    Misaligned { len: usize },

    #[error("malformed padding after decryption")]
    BadPadding,

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),
}

/// Errors that can end a streaming session or a file operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StreamError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("framing error: {0}")]
    Framing(String),

    #[error("file format error: {0}")]
    FileFormat(String),

    #[error("capture failed: {0}")]
    Capture(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

impl StreamError {
    /// Short label for the error kind, used in status lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Crypto(_) => "crypto",
            Self::Connection(_) => "connection",
            Self::Framing(_) => "framing",
            Self::FileFormat(_) => "file-format",
            Self::Capture(_) => "capture",
            Self::Playback(_) => "playback",
            Self::StorageError(_) => "storage",
            Self::ConfigurationFailed(_) => "configuration",
            Self::Worker(_) => "worker",
        }
    }
}
