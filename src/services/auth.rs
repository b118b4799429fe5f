use argon2::{Algorithm, Argon2, Params, Version};
use chrono::Utc;
use rand::{rngs::OsRng, RngCore};
use zeroize::{Zeroize, Zeroizing};

use crate::config::Config;
use crate::crypto::mac;
use crate::error::{AppError, Result};
use crate::models::principal::{Principal, TokenClaims};
use crate::models::session::{TokenHeader, TokenState};
use crate::validation::auth::{validate_claims, validate_principal};

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The default number of Argon2 passes recorded in new password records.
pub const ARGON2_ITERATIONS: u32 = 3;
/// The largest pass count accepted from a stored record.
const ARGON2_MAX_ITERATIONS: u32 = 64;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 1;
/// The size of a password salt in bytes.
const PASSWORD_SALT_SIZE: usize = 16;
/// The size of a password digest in bytes.
const PASSWORD_DIGEST_SIZE: usize = 32;

/// Issues and verifies signed session tokens.
///
/// Holds only the immutable signing secret and token lifetime, so a single
/// instance can be shared across threads without locking.
#[derive(Clone)]
pub struct TokenAuthority {
    signing_secret: Zeroizing<Vec<u8>>,
    lifetime_secs: i64,
}

impl TokenAuthority {
    /// Creates a new `TokenAuthority` from the process configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            signing_secret: Zeroizing::new(config.signing_secret.as_bytes().to_vec()),
            lifetime_secs: config.token_lifetime_secs,
        }
    }

    /// Issues a token for `claims`, valid from now for the configured lifetime.
    pub fn issue_token(&self, claims: &TokenClaims) -> Result<String> {
        self.issue_token_at(claims, Utc::now().timestamp())
    }

    /// Issues a token as if the current time were `now` (Unix seconds).
    ///
    /// # Arguments
    ///
    /// * `claims` - Subject, email and tier of the principal.
    /// * `now` - The issuance instant.
    ///
    /// # Returns
    ///
    /// The encoded `header.payload.signature` string, or `InvalidClaims` when
    /// the claims are malformed or the expiry cannot be represented.
    pub fn issue_token_at(&self, claims: &TokenClaims, now: i64) -> Result<String> {
        let subject = validate_claims(claims)?;
        let expires_at = now.checked_add(self.lifetime_secs).ok_or_else(|| {
            AppError::InvalidClaims("issuance time leaves no room for the token lifetime".to_string())
        })?;

        let principal = Principal {
            subject,
            email: claims.email.clone(),
            tier: claims.tier,
            issued_at: now,
            expires_at,
        };

        let header_json = sonic_rs::to_string(&TokenHeader::default())
            .map_err(|e| AppError::Encryption(format!("Header serialization failed: {}", e)))?;
        let payload_json = sonic_rs::to_string(&principal)
            .map_err(|e| AppError::Encryption(format!("Payload serialization failed: {}", e)))?;

        let signing_input = format!(
            "{}.{}",
            mac::encode_segment(header_json.as_bytes()),
            mac::encode_segment(payload_json.as_bytes())
        );
        let signature = mac::sign(&self.signing_secret, signing_input.as_bytes())?;

        tracing::debug!(
            subject = %principal.subject,
            tier = %principal.tier,
            expires_at = principal.expires_at,
            "Token issued"
        );

        Ok(format!("{}.{}", signing_input, mac::encode_segment(&signature)))
    }

    /// Verifies a token against the current time.
    ///
    /// Every failure (malformed, tampered, expired) yields `None`.
    pub fn verify_token(&self, token: &str) -> Option<Principal> {
        self.verify_token_at(token, Utc::now().timestamp())
    }

    /// Verifies a token as if the current time were `now` (Unix seconds).
    pub fn verify_token_at(&self, token: &str, now: i64) -> Option<Principal> {
        match self.inspect_token_at(token, now) {
            Ok(principal) => Some(principal),
            Err(e) => {
                tracing::warn!(reason = e.kind(), "Token rejected");
                None
            }
        }
    }

    /// Projects a token onto its lifecycle state at `now`.
    pub fn state_at(&self, token: &str, now: i64) -> TokenState {
        match self.inspect_token_at(token, now) {
            Ok(_) => TokenState::Valid,
            Err(AppError::TokenExpired) => TokenState::Expired,
            Err(_) => TokenState::Invalid,
        }
    }

    /// Verifies a token and reports the precise cause of any rejection.
    ///
    /// This is the diagnostic form of [`Self::verify_token_at`]; request
    /// handling must not expose the distinction between its errors.
    ///
    /// # Returns
    ///
    /// The principal, or one of `MalformedToken`, `SignatureMismatch`,
    /// `TokenExpired`.
    pub fn inspect_token_at(&self, token: &str, now: i64) -> Result<Principal> {
        let mut parts = token.split('.');
        let (header_b64, payload_b64, signature_b64) =
            match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(h), Some(p), Some(s), None)
                    if !h.is_empty() && !p.is_empty() && !s.is_empty() =>
                {
                    (h, p, s)
                }
                _ => return Err(AppError::MalformedToken),
            };

        let supplied = mac::decode_segment(signature_b64).ok_or(AppError::MalformedToken)?;

        let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
        let expected = mac::sign(&self.signing_secret, signing_input.as_bytes())
            .map_err(|_| AppError::SignatureMismatch)?;

        if !mac::constant_time_eq(&expected, &supplied) {
            return Err(AppError::SignatureMismatch);
        }

        let header_bytes = mac::decode_segment(header_b64).ok_or(AppError::MalformedToken)?;
        let header: TokenHeader =
            sonic_rs::from_slice(&header_bytes).map_err(|_| AppError::MalformedToken)?;
        if header != TokenHeader::default() {
            return Err(AppError::MalformedToken);
        }

        let payload_bytes = mac::decode_segment(payload_b64).ok_or(AppError::MalformedToken)?;
        let principal: Principal =
            sonic_rs::from_slice(&payload_bytes).map_err(|_| AppError::MalformedToken)?;
        validate_principal(&principal)?;

        if principal.expires_at <= now {
            return Err(AppError::TokenExpired);
        }

        Ok(principal)
    }
}

fn argon2_with_iterations(iterations: u32) -> Result<Argon2<'static>> {
    let params = Params::new(
        ARGON2_MEMORY_MB * 1024,
        iterations,
        ARGON2_PARALLELISM,
        Some(PASSWORD_DIGEST_SIZE),
    )
    .map_err(|e| AppError::Encryption(format!("Argon2 params: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

fn compute_password_digest(
    password: &str,
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; PASSWORD_DIGEST_SIZE]>> {
    let mut digest = Zeroizing::new([0u8; PASSWORD_DIGEST_SIZE]);
    argon2_with_iterations(iterations)?
        .hash_password_into(password.as_bytes(), salt, &mut digest[..])
        .map_err(|e| AppError::Encryption(format!("Argon2 hash error: {}", e)))?;
    Ok(digest)
}

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A record of the form `iterations:salt_hex:digest_hex`.
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt = [0u8; PASSWORD_SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let digest = compute_password_digest(password, &salt, ARGON2_ITERATIONS)?;
    let record = format!(
        "{}:{}:{}",
        ARGON2_ITERATIONS,
        hex::encode(salt),
        hex::encode(&digest[..])
    );

    salt.zeroize();
    tracing::debug!("Password hashed successfully with Argon2");
    Ok(record)
}

/// Verifies a password against a stored record.
///
/// The record's own iteration count and salt are replayed verbatim. Any parse
/// failure or digest mismatch returns `false`.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `record` - The stored `iterations:salt:digest` record.
pub fn verify_password(password: &str, record: &str) -> bool {
    let Some((iterations, salt, stored)) = parse_password_record(record) else {
        tracing::warn!("Password record could not be parsed");
        return false;
    };

    let computed = match compute_password_digest(password, &salt, iterations) {
        Ok(digest) => digest,
        Err(e) => {
            tracing::warn!(reason = e.kind(), "Password verification could not run");
            return false;
        }
    };

    let matched = mac::constant_time_eq(&computed[..], &stored);
    tracing::debug!("Password verification completed");
    matched
}

/// Whether a record was produced with a work factor other than the current one.
pub fn needs_rehash(record: &str) -> bool {
    match parse_password_record(record) {
        Some((iterations, _, _)) => iterations != ARGON2_ITERATIONS,
        None => true,
    }
}

fn parse_password_record(record: &str) -> Option<(u32, Vec<u8>, Vec<u8>)> {
    let mut fields = record.split(':');
    let (iterations, salt, digest) = match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(i), Some(s), Some(d), None) => (i, s, d),
        _ => return None,
    };

    let iterations: u32 = iterations.parse().ok()?;
    if iterations == 0 || iterations > ARGON2_MAX_ITERATIONS {
        return None;
    }

    let salt = hex::decode(salt).ok()?;
    let digest = hex::decode(digest).ok()?;
    if salt.is_empty() || digest.len() != PASSWORD_DIGEST_SIZE {
        return None;
    }

    Some((iterations, salt, digest))
}
