use thiserror::Error;

/// The crate's error type.
///
/// Every variant is deterministic: retrying the same inputs reproduces the
/// same failure, so nothing here is ever retried internally.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// The claims supplied for token issuance are malformed.
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    /// The token could not be parsed into header, payload and signature.
    #[error("Malformed token")]
    MalformedToken,

    /// The recomputed signature does not match the supplied one.
    #[error("Signature mismatch")]
    SignatureMismatch,

    /// The token signature is valid but its lifetime has elapsed.
    #[error("Token expired")]
    TokenExpired,

    /// No verified principal was presented.
    #[error("Authentication required")]
    Unauthenticated,

    /// The principal's tier is not in the allowed set.
    #[error("Insufficient tier")]
    InsufficientTier,

    /// A symmetric key of the wrong length was supplied.
    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// Authenticated decryption failed.
    #[error("Decryption failed")]
    DecryptionFailed,

    /// A PII record does not conform to the schema.
    #[error("Invalid PII: {0}")]
    InvalidPii(String),

    /// An underlying primitive failed for reasons unrelated to caller input.
    #[error("Encryption error: {0}")]
    Encryption(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Whether this error is one of the causes `verify_token` collapses into
    /// "no principal".
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self,
            AppError::MalformedToken | AppError::SignatureMismatch | AppError::TokenExpired
        )
    }

    /// A stable, log-safe name for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidClaims(_) => "invalid_claims",
            AppError::MalformedToken => "malformed_token",
            AppError::SignatureMismatch => "signature_mismatch",
            AppError::TokenExpired => "token_expired",
            AppError::Unauthenticated => "unauthenticated",
            AppError::InsufficientTier => "insufficient_tier",
            AppError::InvalidKeyLength(_) => "invalid_key_length",
            AppError::DecryptionFailed => "decryption_failed",
            AppError::InvalidPii(_) => "invalid_pii",
            AppError::Encryption(_) => "encryption",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_rejections_are_grouped() {
        assert!(AppError::MalformedToken.is_token_rejection());
        assert!(AppError::SignatureMismatch.is_token_rejection());
        assert!(AppError::TokenExpired.is_token_rejection());
        assert!(!AppError::InsufficientTier.is_token_rejection());
        assert!(!AppError::DecryptionFailed.is_token_rejection());
    }

    #[test]
    fn key_length_message_names_the_length() {
        let err = AppError::InvalidKeyLength(16);
        assert_eq!(err.to_string(), "Invalid key length: expected 32 bytes, got 16");
        assert_eq!(err.kind(), "invalid_key_length");
    }
}
