use crate::models::error::StreamError;

/// Consumer of decrypted chunks on the receiving side (speaker, visualizer).
///
/// Called on the receiving worker thread; implementations should hand the
/// chunk off quickly rather than block.
pub trait ChunkSink: Send {
    fn deliver(&mut self, chunk: &[u8]) -> Result<(), StreamError>;
}

impl<F> ChunkSink for F
where
    F: FnMut(&[u8]) -> Result<(), StreamError> + Send,
{
    fn deliver(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        self(chunk)
    }
}
