use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;
use crate::crypto::aes::{SecureKey, KEY_SIZE};
use crate::error::{AppError, Result};

/// PBKDF2-HMAC-SHA256 iteration count for passphrase-derived keys.
pub const PBKDF2_ITERATIONS: u32 = 600_000;
/// The size of a freshly generated derivation salt in bytes.
pub const SALT_SIZE: usize = 32;

/// Generates a new random derivation salt.
pub fn generate_salt() -> [u8; SALT_SIZE] {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives a 32-byte key from a passphrase and salt using PBKDF2-HMAC-SHA256.
///
/// When `salt` is `None` a fresh 32-byte salt is drawn. The returned salt must
/// be persisted next to anything the key protects; the same passphrase and
/// salt always reproduce the same key.
///
/// # Arguments
///
/// * `passphrase` - The human-supplied secret.
/// * `salt` - An existing salt, or `None` to generate one.
///
/// # Returns
///
/// The derived key together with the salt that produced it.
pub fn derive_key(passphrase: &str, salt: Option<&[u8]>) -> Result<(SecureKey, Vec<u8>)> {
    let salt = match salt {
        Some([]) => {
            return Err(AppError::Encryption("Key derivation salt must not be empty".to_string()));
        }
        Some(existing) => existing.to_vec(),
        None => generate_salt().to_vec(),
    };

    let mut key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), &salt, PBKDF2_ITERATIONS, &mut key);

    tracing::debug!("Key derived with PBKDF2 ({} iterations)", PBKDF2_ITERATIONS);
    Ok((SecureKey::new(key), salt))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_passphrase_and_salt_reproduce_the_key() {
        let (first, salt) = derive_key("correct horse battery staple", None).unwrap();
        assert_eq!(salt.len(), SALT_SIZE);

        let (second, same_salt) = derive_key("correct horse battery staple", Some(salt.as_slice())).unwrap();
        assert_eq!(same_salt, salt);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn different_salts_give_different_keys() {
        let (first, _) = derive_key("passphrase", Some(b"salt-number-one".as_slice())).unwrap();
        let (second, _) = derive_key("passphrase", Some(b"salt-number-two".as_slice())).unwrap();
        assert_ne!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn empty_salt_is_rejected() {
        assert!(matches!(derive_key("passphrase", Some(&[][..])), Err(AppError::Encryption(_))));
    }
}
