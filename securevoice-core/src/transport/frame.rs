//! Length-prefixed framing over a byte stream.
//!
//! ```text
//! +--------+--------+--------+--------+----...----+
//! |   length (u32 big-endian, 4 bytes) |  payload  |
//! +--------+--------+--------+--------+----...----+
//! ```
//!
//! The length counts payload bytes only. Payloads are opaque here; in a
//! session they are always encrypted chunks.

use std::io::{self, Read, Write};

use crate::models::error::StreamError;

/// Size of the length prefix in bytes.
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Largest slice read into the payload buffer per call, so a huge announced
/// length only costs memory as bytes actually arrive.
const READ_STEP: usize = 64 * 1024;

/// Write one frame: the 4-byte length prefix, then the whole payload.
pub fn write_frame<W: Write>(writer: &mut W, payload: &[u8]) -> Result<(), StreamError> {
    let length = u32::try_from(payload.len()).map_err(|_| {
        StreamError::Framing(format!(
            "payload of {} bytes exceeds the 4-byte length field",
            payload.len()
        ))
    })?;

    writer
        .write_all(&length.to_be_bytes())
        .and_then(|_| writer.write_all(payload))
        .and_then(|_| writer.flush())
        .map_err(|e| StreamError::Connection(format!("frame write failed: {}", e)))
}

/// Read one frame's payload.
///
/// Returns `Ok(None)` when the peer closed cleanly before sending any byte of
/// the next frame. A close part-way through the prefix or the payload is a
/// [`StreamError::Framing`]; other I/O failures are [`StreamError::Connection`].
pub fn read_frame<R: Read>(
    reader: &mut R,
    max_frame_size: Option<usize>,
) -> Result<Option<Vec<u8>>, StreamError> {
    let mut len_buf = [0u8; LENGTH_FIELD_SIZE];
    let filled = read_full(reader, &mut len_buf)?;
    if filled == 0 {
        return Ok(None);
    }
    if filled < LENGTH_FIELD_SIZE {
        return Err(StreamError::Framing(format!(
            "connection closed after {} of {} length bytes",
            filled, LENGTH_FIELD_SIZE
        )));
    }

    let length = u32::from_be_bytes(len_buf) as usize;
    if let Some(max) = max_frame_size {
        if length > max {
            return Err(StreamError::Framing(format!(
                "frame of {} bytes exceeds the maximum of {} bytes",
                length, max
            )));
        }
    }

    let mut payload = Vec::with_capacity(length.min(READ_STEP));
    while payload.len() < length {
        let start = payload.len();
        let step = (length - start).min(READ_STEP);
        payload.resize(start + step, 0);

        let n = read_full(reader, &mut payload[start..])?;
        payload.truncate(start + n);
        if n < step {
            return Err(StreamError::Framing(format!(
                "connection closed after {} of {} payload bytes",
                payload.len(),
                length
            )));
        }
    }

    Ok(Some(payload))
}

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns how many bytes were read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, StreamError> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(StreamError::Connection(format!("frame read failed: {}", e)));
            }
        }
    }
    Ok(filled)
}
