use crate::models::error::StreamError;

/// Source of raw audio chunks for a sending session.
///
/// Implemented by the front-end (microphone, stdin, test fixtures).
/// `next_chunk` may block until audio is available; the sending worker owns
/// that suspension point.
pub trait CaptureSource: Send {
    /// Next raw chunk, or `Ok(None)` once the source has no more audio.
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError>;
}

impl<F> CaptureSource for F
where
    F: FnMut() -> Result<Option<Vec<u8>>, StreamError> + Send,
{
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        self()
    }
}
