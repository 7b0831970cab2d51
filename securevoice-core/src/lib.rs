//! # securevoice-core
//!
//! Encrypted point-to-point audio streaming.
//!
//! Raw audio chunks from a capture source are encrypted one by one, framed
//! with a length prefix and sent over TCP to a single receiver, which
//! deframes, decrypts and hands them to a playback sink. The same chunks can
//! be tapped into an encrypted recording and replayed later.
//!
//! Audio devices and any user interface stay outside this crate; they plug
//! in through `CaptureSource`, `ChunkSink` and `SessionDelegate`.
//!
//! ## Architecture
//!
//! ```text
//! securevoice-core (this crate)
//! ├── crypto/       ← CryptoCodec (AES-128-CBC + PKCS#7), SessionKey
//! ├── transport/    ← length-prefixed frames over any Read/Write
//! ├── session/      ← SenderSession, ReceiverSession, Session, SessionCloser
//! ├── storage/      ← Recorder, FileCodec ("SVCA" files), WAV export, metadata
//! ├── processing/   ← activity level, WAV header generation
//! ├── traits/       ← CaptureSource, ChunkSink, SessionDelegate
//! └── models/       ← StreamError, SessionState, StreamConfiguration, results
//! ```

pub mod crypto;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;
pub mod transport;

// Re-export key types at crate root for convenience.
pub use crypto::codec::CryptoCodec;
pub use crypto::key::SessionKey;
pub use models::config::{AudioFormat, StreamConfiguration};
pub use models::error::{CryptoError, StreamError};
pub use models::recording_result::{RecordingMetadata, RecordingResult, SessionStats};
pub use models::state::{SessionRole, SessionState, Termination};
pub use session::{ReceiverSession, SenderSession, Session, SessionCloser, SessionHandle};
pub use storage::file_codec::FileCodec;
pub use storage::recorder::Recorder;
pub use traits::capture_source::CaptureSource;
pub use traits::chunk_sink::ChunkSink;
pub use traits::session_delegate::SessionDelegate;
