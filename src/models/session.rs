use serde::{Deserialize, Serialize};

/// The signing algorithm tag written into every token header.
pub const TOKEN_ALGORITHM: &str = "HS256";
/// The token type written into every token header.
pub const TOKEN_TYPE: &str = "JWT";

/// The fixed header segment of a session token.
///
/// Wire format: `base64url(header).base64url(payload).base64url(signature)`,
/// where the signature is HMAC-SHA256 over the first two encoded segments
/// joined by `.`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for TokenHeader {
    fn default() -> Self {
        Self {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: TOKEN_TYPE.to_string(),
        }
    }
}

/// Projection of a token onto its lifecycle at a given instant.
///
/// `Invalid` and `Expired` look identical to callers of `verify_token`; the
/// distinction exists for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Valid,
    Invalid,
    Expired,
}
