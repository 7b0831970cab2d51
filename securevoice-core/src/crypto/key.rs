use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::models::error::StreamError;

/// Length of the AES-128 pre-shared key in bytes.
pub const KEY_SIZE: usize = 16;

/// Pre-shared symmetric key, injected when a codec is built.
///
/// Both peers must hold the same key; how it gets there is outside this crate.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionKey([u8; KEY_SIZE]);

impl SessionKey {
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Draw a fresh key from the OS random number generator.
    pub fn generate() -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Parse a key from 32 hex characters.
    pub fn from_hex(encoded: &str) -> Result<Self, StreamError> {
        let decoded = hex::decode(encoded.trim())
            .map_err(|e| StreamError::ConfigurationFailed(format!("invalid hex key: {}", e)))?;
        let bytes: [u8; KEY_SIZE] = decoded.as_slice().try_into().map_err(|_| {
            StreamError::ConfigurationFailed(format!(
                "key must be {} bytes, got {}",
                KEY_SIZE,
                decoded.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; KEY_SIZE]> for SessionKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

// Never print key material.
impl fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trip() {
        let key = SessionKey::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        assert_eq!(key.as_bytes()[15], 0x0f);
        assert_eq!(key.to_hex(), "000102030405060708090a0b0c0d0e0f");
    }

    #[test]
    fn rejects_wrong_length_and_garbage() {
        assert_eq!(
            SessionKey::from_hex("0001").unwrap_err(),
            StreamError::ConfigurationFailed("key must be 16 bytes, got 2".into())
        );
        let garbage = SessionKey::from_hex("zz0102030405060708090a0b0c0d0e0f").unwrap_err();
        assert_eq!(garbage.kind(), "configuration");
    }

    #[test]
    fn debug_hides_key_bytes() {
        let key = SessionKey::new([0xAB; KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "SessionKey(..)");
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(SessionKey::generate(), SessionKey::generate());
    }
}
