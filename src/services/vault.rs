use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use crate::config::Config;
use crate::crypto::aes::{self, SecureKey, NONCE_SIZE, TAG_SIZE};
use crate::crypto::kdf;
use crate::crypto::mac;
use crate::error::{AppError, Result};
use crate::models::pii::{Pii, RedactedPii};
use crate::models::record::{EncryptedPayload, EncryptedPiiRecord, PAYLOAD_ALGORITHM};
use crate::validation::pii::validate_pii;

/// Length of an audit fingerprint in hex characters.
pub const AUDIT_FINGERPRINT_LEN: usize = 16;

const MASK: char = '*';

/// Derives a 32-byte key from a passphrase; see [`kdf::derive_key`].
pub fn derive_key(passphrase: &str, salt: Option<&[u8]>) -> Result<(SecureKey, Vec<u8>)> {
    kdf::derive_key(passphrase, salt)
}

/// Generates 32 random bytes for machine-managed vault keys.
pub fn generate_key() -> SecureKey {
    aes::generate_key()
}

/// Encrypts `plaintext` with AES-256-GCM under a 32-byte key.
///
/// A fresh nonce is drawn on every call.
///
/// # Arguments
///
/// * `plaintext` - The text to protect.
/// * `key` - Raw key bytes; anything but 32 bytes fails with `InvalidKeyLength`.
pub fn encrypt(plaintext: &str, key: &[u8]) -> Result<EncryptedPayload> {
    let key = SecureKey::from_slice(key)?;
    let sealed = aes::seal(&key, plaintext.as_bytes())?;

    Ok(EncryptedPayload {
        iv: hex::encode(sealed.nonce),
        ciphertext: hex::encode(&sealed.ciphertext),
        auth_tag: hex::encode(sealed.tag),
        algorithm: PAYLOAD_ALGORITHM.to_string(),
    })
}

/// Decrypts a payload produced by [`encrypt`].
///
/// Any corruption of the transport fields, a wrong key or a failed tag check
/// yields `DecryptionFailed`; no partial plaintext is ever returned.
pub fn decrypt(payload: &EncryptedPayload, key: &[u8]) -> Result<Zeroizing<String>> {
    let key = SecureKey::from_slice(key)?;

    if payload.algorithm != PAYLOAD_ALGORITHM {
        return Err(AppError::DecryptionFailed);
    }

    let nonce: [u8; NONCE_SIZE] = decode_fixed(&payload.iv)?;
    let tag: [u8; TAG_SIZE] = decode_fixed(&payload.auth_tag)?;
    let ciphertext = hex::decode(&payload.ciphertext).map_err(|_| AppError::DecryptionFailed)?;

    let plaintext = aes::open(&key, &nonce, &ciphertext, &tag).inspect_err(|_| {
        tracing::warn!("Decryption failed: authentication tag mismatch");
    })?;

    String::from_utf8(plaintext).map(Zeroizing::new).map_err(|e| {
        e.into_bytes().zeroize();
        AppError::DecryptionFailed
    })
}

fn decode_fixed<const N: usize>(field: &str) -> Result<[u8; N]> {
    hex::decode(field)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or(AppError::DecryptionFailed)
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Salted one-way digest over normalized identity fields.
///
/// Only for equality checks between records; the output is opaque.
pub fn hash_pii(first_name: &str, last_name: &str, birth_date: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(first_name).as_bytes());
    hasher.update(b"|");
    hasher.update(normalize(last_name).as_bytes());
    hasher.update(b"|");
    hasher.update(birth_date.trim().as_bytes());
    hasher.update(b"|");
    hasher.update(salt.as_bytes());
    hex::encode(hasher.finalize())
}

/// Short unsalted digest for log correlation.
///
/// Collisions at this length are expected to be rare, not impossible, so the
/// fingerprint is never a key.
pub fn create_audit_fingerprint(pii: &Pii) -> String {
    let input = format!(
        "{}|{}|{}",
        normalize(&pii.first_name),
        normalize(&pii.last_name),
        pii.birth_date.trim()
    );
    let digest = blake3::hash(input.as_bytes());
    digest.to_hex().as_str()[..AUDIT_FINGERPRINT_LEN].to_string()
}

fn mask_name(name: &str) -> String {
    let trimmed = name.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(_)) => std::iter::once(first)
            .chain(std::iter::repeat_n(MASK, chars.count() + 1))
            .collect(),
        (Some(_), None) => MASK.to_string(),
        (None, _) => String::new(),
    }
}

fn mask_date(date: &str) -> String {
    let total_digits = date.chars().filter(|c| c.is_ascii_digit()).count();
    let mut seen = 0;
    date.chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen > total_digits.saturating_sub(2) { c } else { MASK }
            } else {
                c
            }
        })
        .collect()
}

fn mask_location(location: &str) -> String {
    let mut segments = location.split(',');
    let first = segments.next().unwrap_or_default().trim();
    if segments.next().is_some() {
        format!("{}, ***", first)
    } else {
        first.to_string()
    }
}

/// Produces the only representation of PII allowed to reach a log sink.
pub fn redact(pii: &Pii) -> RedactedPii {
    RedactedPii {
        first_name: mask_name(&pii.first_name),
        last_name: mask_name(&pii.last_name),
        birth_date: mask_date(&pii.birth_date),
        location: pii.location.as_deref().map(mask_location),
        has_email: pii.email.as_deref().is_some_and(|e| !e.trim().is_empty()),
        has_phone: pii.phone.as_deref().is_some_and(|p| !p.trim().is_empty()),
    }
}

/// Encrypts and fingerprints PII records.
///
/// Holds only the process-wide hashing salt; keys are supplied per call and
/// never retained.
#[derive(Clone)]
pub struct PiiVault {
    salt: Zeroizing<String>,
}

impl PiiVault {
    /// Creates a new `PiiVault` from the process configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            salt: config.pii_salt.clone(),
        }
    }

    /// The salted content hash of `pii` under this vault's salt.
    pub fn content_hash(&self, pii: &Pii) -> String {
        hash_pii(&pii.first_name, &pii.last_name, &pii.birth_date, &self.salt)
    }

    /// Whether `record` holds the same identity as `pii`.
    pub fn matches(&self, record: &EncryptedPiiRecord, pii: &Pii) -> bool {
        mac::constant_time_eq(
            self.content_hash(pii).as_bytes(),
            record.content_hash.as_bytes(),
        )
    }

    /// Validates, serializes and encrypts `pii` into a new record.
    ///
    /// # Arguments
    ///
    /// * `id` - The record identifier chosen by the storage collaborator.
    /// * `pii` - The plaintext record.
    /// * `key` - 32 raw key bytes.
    pub fn create_encrypted_record(
        &self,
        id: Uuid,
        pii: &Pii,
        key: &[u8],
    ) -> Result<EncryptedPiiRecord> {
        validate_pii(pii)?;

        let json = Zeroizing::new(
            sonic_rs::to_string(pii)
                .map_err(|e| AppError::Encryption(format!("PII serialization failed: {}", e)))?,
        );
        let encrypted_payload = encrypt(&json, key)?;
        let audit_fingerprint = create_audit_fingerprint(pii);
        let now = Utc::now();

        tracing::debug!(
            record_id = %id,
            fingerprint = %audit_fingerprint,
            "Encrypted PII record created"
        );

        Ok(EncryptedPiiRecord {
            id,
            encrypted_payload,
            content_hash: self.content_hash(pii),
            audit_fingerprint,
            created_at: now,
            updated_at: now,
        })
    }

    /// Decrypts and validates the PII held by `record`.
    pub fn open_encrypted_record(&self, record: &EncryptedPiiRecord, key: &[u8]) -> Result<Pii> {
        let json = decrypt(&record.encrypted_payload, key).inspect_err(|e| {
            tracing::warn!(
                record_id = %record.id,
                fingerprint = %record.audit_fingerprint,
                reason = e.kind(),
                "Failed to open PII record"
            );
        })?;

        let pii: Pii = sonic_rs::from_str(&json)
            .map_err(|_| AppError::InvalidPii("decrypted record is not valid PII".to_string()))?;
        validate_pii(&pii)?;

        tracing::debug!(record_id = %record.id, "PII record opened");
        Ok(pii)
    }

    /// Re-encrypts `record` under `new_key`, producing the superseding record.
    ///
    /// The identifier and creation time carry over; the payload, nonce and
    /// update time are new.
    pub fn rotate_record(
        &self,
        record: &EncryptedPiiRecord,
        old_key: &[u8],
        new_key: &[u8],
    ) -> Result<EncryptedPiiRecord> {
        let pii = self.open_encrypted_record(record, old_key)?;
        let rotated = self.create_encrypted_record(record.id, &pii, new_key)?;

        tracing::info!(record_id = %record.id, "🔑 PII record re-encrypted under new key");

        Ok(EncryptedPiiRecord {
            created_at: record.created_at,
            ..rotated
        })
    }
}
