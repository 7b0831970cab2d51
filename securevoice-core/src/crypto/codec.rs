use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::rngs::OsRng;
use rand::RngCore;

use super::key::SessionKey;
use crate::models::error::CryptoError;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// AES block size in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Size of the random IV prepended to every payload.
pub const IV_SIZE: usize = 16;

/// Smallest valid payload: an IV plus one ciphertext block.
pub const MIN_PAYLOAD_SIZE: usize = IV_SIZE + BLOCK_SIZE;

/// Symmetric payload codec: AES-128-CBC with PKCS#7 padding.
///
/// Payload format:
/// ```text
/// [16-byte random IV] [ciphertext, a positive multiple of 16 bytes]
/// ```
///
/// Holds only the immutable key, so one codec can be cloned into every
/// worker and used concurrently.
#[derive(Clone, Debug)]
pub struct CryptoCodec {
    key: SessionKey,
}

impl CryptoCodec {
    pub fn new(key: SessionKey) -> Self {
        Self { key }
    }

    /// Algorithm identifier recorded in recording metadata.
    pub fn algorithm(&self) -> &'static str {
        "AES-128-CBC"
    }

    /// Encrypt `plaintext` under a fresh random IV.
    ///
    /// Returns: `IV (16 bytes) || ciphertext`
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let mut iv = [0u8; IV_SIZE];
        OsRng
            .try_fill_bytes(&mut iv)
            .map_err(|e| CryptoError::EncryptionFailed(format!("IV generation failed: {}", e)))?;

        let cipher = Aes128CbcEnc::new_from_slices(self.key.as_bytes(), &iv)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext);

        let mut sealed = Vec::with_capacity(IV_SIZE + ciphertext.len());
        sealed.extend_from_slice(&iv);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Decrypt a payload produced by [`encrypt`](Self::encrypt).
    ///
    /// Fails rather than returning plaintext whenever the length is impossible
    /// or the padding does not check out.
    pub fn decrypt(&self, payload: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if payload.len() < MIN_PAYLOAD_SIZE {
            return Err(CryptoError::TooShort { len: payload.len() });
        }

        let (iv, ciphertext) = payload.split_at(IV_SIZE);
        if ciphertext.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::Misaligned {
                len: ciphertext.len(),
            });
        }

        let cipher = Aes128CbcDec::new_from_slices(self.key.as_bytes(), iv)
            .map_err(|_| CryptoError::TooShort { len: payload.len() })?;
        cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::BadPadding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> CryptoCodec {
        CryptoCodec::new(SessionKey::new(*b"ThisIsASecretKey"))
    }

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 251) as u8).collect()
    }

    #[test]
    fn round_trip_across_block_boundaries() {
        let codec = codec();
        for len in [0, 1, 15, 16, 17, 1024, 65536] {
            let plaintext = pattern(len);
            let sealed = codec.encrypt(&plaintext).unwrap();
            assert_eq!(codec.decrypt(&sealed).unwrap(), plaintext, "length {}", len);
        }
    }

    #[test]
    fn ciphertext_is_padded_to_whole_blocks() {
        let codec = codec();
        // A block-aligned plaintext still gets a full block of padding.
        assert_eq!(codec.encrypt(&[]).unwrap().len(), IV_SIZE + 16);
        assert_eq!(codec.encrypt(&[0u8; 15]).unwrap().len(), IV_SIZE + 16);
        assert_eq!(codec.encrypt(&[0u8; 16]).unwrap().len(), IV_SIZE + 32);
        assert_eq!(codec.encrypt(&[0u8; 17]).unwrap().len(), IV_SIZE + 32);
    }

    #[test]
    fn fresh_iv_per_call() {
        let codec = codec();
        let plaintext = pattern(1024);
        let first = codec.encrypt(&plaintext).unwrap();
        let second = codec.encrypt(&plaintext).unwrap();

        assert_ne!(first, second);
        assert_ne!(first[..IV_SIZE], second[..IV_SIZE]);
        assert_eq!(codec.decrypt(&first).unwrap(), plaintext);
        assert_eq!(codec.decrypt(&second).unwrap(), plaintext);
    }

    #[test]
    fn rejects_undersized_payload() {
        let codec = codec();
        assert_eq!(codec.decrypt(&[]), Err(CryptoError::TooShort { len: 0 }));
        assert_eq!(
            codec.decrypt(&[0u8; IV_SIZE]),
            Err(CryptoError::TooShort { len: IV_SIZE })
        );
        assert_eq!(
            codec.decrypt(&[0u8; MIN_PAYLOAD_SIZE - 1]),
            Err(CryptoError::TooShort {
                len: MIN_PAYLOAD_SIZE - 1
            })
        );
    }

    #[test]
    fn rejects_truncated_ciphertext() {
        let codec = codec();
        let sealed = codec.encrypt(&[0u8; 1024]).unwrap();

        let cut_byte = &sealed[..sealed.len() - 1];
        assert_eq!(
            codec.decrypt(cut_byte),
            Err(CryptoError::Misaligned {
                len: cut_byte.len() - IV_SIZE
            })
        );

        // Dropping the padding block leaves a zero byte where the pad length
        // should be, which is never valid PKCS#7.
        let cut_block = &sealed[..sealed.len() - BLOCK_SIZE];
        assert_eq!(codec.decrypt(cut_block), Err(CryptoError::BadPadding));
    }

    #[test]
    fn rejects_bit_flip_in_padding_block() {
        let codec = codec();
        let mut sealed = codec.encrypt(&pattern(1024)).unwrap();

        // The last plaintext block is sixteen 0x10 pad bytes. Flipping a bit
        // in the preceding ciphertext block flips the same bit of the pad
        // length, giving 0x30.
        let idx = sealed.len() - BLOCK_SIZE - 1;
        sealed[idx] ^= 0x20;
        assert_eq!(codec.decrypt(&sealed), Err(CryptoError::BadPadding));
    }

    #[test]
    fn rejects_bit_flip_in_iv_of_single_block() {
        let codec = codec();
        let mut sealed = codec.encrypt(b"hello").unwrap();

        // Pad byte for a 5-byte plaintext is 0x0b; the IV flip turns it into 0x1b.
        sealed[IV_SIZE - 1] ^= 0x10;
        assert_eq!(codec.decrypt(&sealed), Err(CryptoError::BadPadding));
    }

    #[test]
    fn wrong_key_never_yields_original_plaintext() {
        let plaintext = pattern(1024);
        let sealed = codec().encrypt(&plaintext).unwrap();
        let other = CryptoCodec::new(SessionKey::new([7u8; 16]));

        match other.decrypt(&sealed) {
            Ok(garbage) => assert_ne!(garbage, plaintext),
            Err(e) => assert_eq!(e, CryptoError::BadPadding),
        }
    }
}
