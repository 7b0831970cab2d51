//! Stdin/stdout stand-ins for the microphone and speaker.

use std::io::{self, Read, Write};

use securevoice_core::{CaptureSource, ChunkSink, StreamError};

/// Reads fixed-size chunks of raw PCM from any reader (stdin in practice).
pub struct ReaderSource<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self { reader, chunk_size }
    }
}

impl<R: Read + Send> CaptureSource for ReaderSource<R> {
    fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, StreamError> {
        let mut chunk = vec![0u8; self.chunk_size];
        let mut filled = 0;
        while filled < chunk.len() {
            match self.reader.read(&mut chunk[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StreamError::Capture(format!("input read failed: {}", e))),
            }
        }

        if filled == 0 {
            return Ok(None);
        }
        chunk.truncate(filled);
        Ok(Some(chunk))
    }
}

/// Writes every delivered chunk straight through to a writer (stdout in practice).
pub struct WriterSink<W> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> ChunkSink for WriterSink<W> {
    fn deliver(&mut self, chunk: &[u8]) -> Result<(), StreamError> {
        self.writer
            .write_all(chunk)
            .and_then(|_| self.writer.flush())
            .map_err(|e| StreamError::Playback(format!("output write failed: {}", e)))
    }
}
