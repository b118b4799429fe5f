use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Algorithm identifier written into every encrypted payload.
pub const PAYLOAD_ALGORITHM: &str = "aes-256-gcm";

/// The transport form of one AES-256-GCM encryption.
///
/// All binary fields are lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayload {
    /// 12-byte nonce, fresh per encryption.
    pub iv: String,
    pub ciphertext: String,
    /// 16-byte GCM tag.
    pub auth_tag: String,
    pub algorithm: String,
}

/// An encrypted PII record ready to hand to a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPiiRecord {
    pub id: Uuid,
    pub encrypted_payload: EncryptedPayload,
    /// Salted SHA-256 over normalized identity fields, for duplicate detection.
    pub content_hash: String,
    /// Short unsalted digest, usable as a log correlation key only.
    pub audit_fingerprint: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
