use std::fs;
use std::path::Path;

use crate::crypto::codec::CryptoCodec;
use crate::models::error::StreamError;
use crate::storage::atomic::write_atomically;

/// Marker at the start of every encrypted recording ("Secure Voice Chat App").
pub const MAGIC: &[u8; 4] = b"SVCA";

/// Encrypted recording envelope.
///
/// ## File Format
///
/// ```text
/// [4-byte magic "SVCA"]
/// [16-byte IV]
/// [AES-128-CBC ciphertext of all chunks concatenated in capture order]
/// ```
#[derive(Clone, Debug)]
pub struct FileCodec {
    crypto: CryptoCodec,
}

impl FileCodec {
    pub fn new(crypto: CryptoCodec) -> Self {
        Self { crypto }
    }

    pub fn crypto(&self) -> &CryptoCodec {
        &self.crypto
    }

    /// Concatenate `chunks`, encrypt the result, and prepend the magic marker.
    pub fn encode<C: AsRef<[u8]>>(&self, chunks: &[C]) -> Result<Vec<u8>, StreamError> {
        let total: usize = chunks.iter().map(|c| c.as_ref().len()).sum();
        let mut raw = Vec::with_capacity(total);
        for chunk in chunks {
            raw.extend_from_slice(chunk.as_ref());
        }

        let sealed = self.crypto.encrypt(&raw)?;

        let mut file = Vec::with_capacity(MAGIC.len() + sealed.len());
        file.extend_from_slice(MAGIC);
        file.extend_from_slice(&sealed);
        Ok(file)
    }

    /// Check the magic marker, then decrypt the remainder into the original
    /// concatenated audio.
    pub fn decode(&self, file_bytes: &[u8]) -> Result<Vec<u8>, StreamError> {
        let sealed = file_bytes.strip_prefix(MAGIC.as_slice()).ok_or_else(|| {
            StreamError::FileFormat("not an encrypted recording (missing SVCA marker)".into())
        })?;
        Ok(self.crypto.decrypt(sealed)?)
    }

    /// Read and decode a saved recording.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>, StreamError> {
        let data = fs::read(path).map_err(|e| {
            StreamError::StorageError(format!("failed to read {}: {}", path.display(), e))
        })?;
        self.decode(&data)
    }

    /// Encode `chunks` and write them atomically to `path`, returning the
    /// bytes that were written.
    pub fn write_file<C: AsRef<[u8]>>(
        &self,
        path: &Path,
        chunks: &[C],
    ) -> Result<Vec<u8>, StreamError> {
        let file = self.encode(chunks)?;
        write_atomically(path, &file)?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::codec::IV_SIZE;
    use crate::crypto::key::SessionKey;
    use crate::models::error::CryptoError;

    fn file_codec() -> FileCodec {
        FileCodec::new(CryptoCodec::new(SessionKey::new([0x42; 16])))
    }

    #[test]
    fn chunks_concatenate_in_order() {
        let codec = file_codec();
        let chunks = vec![vec![1u8; 10], vec![2u8; 3], vec![3u8; 7]];

        let file = codec.encode(&chunks).unwrap();
        assert_eq!(&file[..4], b"SVCA");

        let decoded = codec.decode(&file).unwrap();
        assert_eq!(decoded, chunks.concat());
    }

    #[test]
    fn empty_recording_still_produces_a_valid_file() {
        let codec = file_codec();
        let file = codec.encode::<Vec<u8>>(&[]).unwrap();
        assert_eq!(file.len(), 4 + IV_SIZE + 16);
        assert!(codec.decode(&file).unwrap().is_empty());
    }

    #[test]
    fn corrupted_magic_fails_before_decryption() {
        let codec = file_codec();
        let mut file = codec.encode(&[b"abc".to_vec()]).unwrap();
        file[0] = b'X';

        let err = codec.decode(&file).unwrap_err();
        assert!(matches!(err, StreamError::FileFormat(_)));
    }

    #[test]
    fn short_file_is_format_error() {
        let err = file_codec().decode(b"SV").unwrap_err();
        assert!(matches!(err, StreamError::FileFormat(_)));
    }

    #[test]
    fn crypto_errors_propagate_unchanged() {
        let codec = file_codec();
        let err = codec.decode(b"SVCAtoo-short").unwrap_err();
        assert_eq!(err, StreamError::Crypto(CryptoError::TooShort { len: 9 }));
    }

    #[test]
    fn read_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.enc");
        let codec = file_codec();

        let written = codec.write_file(&path, &[vec![9u8; 2048]]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), written);
        assert_eq!(codec.read_file(&path).unwrap(), vec![9u8; 2048]);

        let missing = codec.read_file(&dir.path().join("missing.enc")).unwrap_err();
        assert_eq!(missing.kind(), "storage");
    }
}
