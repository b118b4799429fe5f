use aes_gcm::{
    aead::{AeadInPlace, KeyInit, OsRng},
    Aes256Gcm, Nonce, Tag,
};
use aes_gcm::aead::rand_core::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};
use crate::error::{AppError, Result};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;
/// The size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    ///
    /// # Arguments
    ///
    /// * `key` - A 32-byte array representing the AES-256 key.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Creates a `SecureKey` from a slice, failing unless it is exactly 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let bytes: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| AppError::InvalidKeyLength(key.len()))?;
        Ok(Self(bytes))
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SecureKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecureKey(<redacted>)")
    }
}

/// Output of a single AES-256-GCM sealing operation.
pub struct Sealed {
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_SIZE],
}

/// Generates a new random AES-256 key.
///
/// # Returns
///
/// A `SecureKey` containing the generated key.
pub fn generate_key() -> SecureKey {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    SecureKey::new(key)
}

/// Generates a new random AES-GCM nonce.
fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts a plaintext using AES-256-GCM with a freshly drawn nonce.
///
/// The nonce is never caller-supplied.
///
/// # Arguments
///
/// * `key` - The AES-256 key.
/// * `plaintext` - The data to encrypt.
///
/// # Returns
///
/// The nonce, the ciphertext and the detached authentication tag.
pub fn seal(key: &SecureKey, plaintext: &[u8]) -> Result<Sealed> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce = generate_nonce();
    let mut buffer = plaintext.to_vec();

    let tag = cipher
        .encrypt_in_place_detached(Nonce::from_slice(&nonce), b"", &mut buffer)
        .map_err(|e| AppError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut tag_bytes = [0u8; TAG_SIZE];
    tag_bytes.copy_from_slice(&tag);

    Ok(Sealed {
        nonce,
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypts a ciphertext using AES-256-GCM.
///
/// The tag is verified before any plaintext is produced; on failure the
/// caller gets `DecryptionFailed` and nothing else.
///
/// # Arguments
///
/// * `key` - The AES-256 key.
/// * `nonce` - The nonce used for encryption.
/// * `ciphertext` - The data to decrypt.
/// * `tag` - The detached authentication tag.
pub fn open(
    key: &SecureKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let mut buffer = ciphertext.to_vec();

    match cipher.decrypt_in_place_detached(
        Nonce::from_slice(nonce),
        b"",
        &mut buffer,
        Tag::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(AppError::DecryptionFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_and_open() {
        let key = generate_key();
        let sealed = seal(&key, b"hello vault").unwrap();
        assert_ne!(sealed.ciphertext, b"hello vault");

        let plain = open(&key, &sealed.nonce, &sealed.ciphertext, &sealed.tag).unwrap();
        assert_eq!(plain, b"hello vault");
    }

    #[test]
    fn from_slice_rejects_wrong_lengths() {
        assert_eq!(
            SecureKey::from_slice(&[0u8; 16]).unwrap_err(),
            AppError::InvalidKeyLength(16)
        );
        assert!(SecureKey::from_slice(&[0u8; 32]).is_ok());
    }

    #[test]
    fn flipped_tag_bit_fails() {
        let key = generate_key();
        let sealed = seal(&key, b"payload").unwrap();
        let mut tag = sealed.tag;
        tag[0] ^= 0x01;

        let err = open(&key, &sealed.nonce, &sealed.ciphertext, &tag).unwrap_err();
        assert_eq!(err, AppError::DecryptionFailed);
    }

    #[test]
    fn debug_does_not_print_key_bytes() {
        let key = SecureKey::new([0xAB; KEY_SIZE]);
        assert_eq!(format!("{:?}", key), "SecureKey(<redacted>)");
    }
}
