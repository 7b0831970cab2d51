pub mod atomic;
pub mod file_codec;
pub mod metadata;
pub mod playback;
pub mod recorder;
