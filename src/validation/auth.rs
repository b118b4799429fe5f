use garde::Validate;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::principal::{Principal, TokenClaims};

/// Checks that a subject is a syntactically valid UUID.
pub fn validate_subject(value: &str, _ctx: &()) -> garde::Result {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| garde::Error::new("subject must be a UUID"))
}

/// Validates claims supplied for token issuance.
///
/// # Arguments
///
/// * `claims` - The claims to validate.
///
/// # Returns
///
/// The parsed subject on success, `InvalidClaims` otherwise.
pub fn validate_claims(claims: &TokenClaims) -> Result<Uuid> {
    claims
        .validate()
        .map_err(|report| AppError::InvalidClaims(report.to_string()))?;

    Uuid::parse_str(&claims.subject)
        .map_err(|_| AppError::InvalidClaims("subject must be a UUID".to_string()))
}

/// Structurally validates a decoded token payload.
///
/// A payload that fails here was signed by us but does not describe a usable
/// principal, so it is reported as a malformed token.
pub fn validate_principal(principal: &Principal) -> Result<()> {
    principal.validate().map_err(|report| {
        tracing::debug!("Decoded principal failed validation: {}", report);
        AppError::MalformedToken
    })?;

    if principal.expires_at <= principal.issued_at {
        return Err(AppError::MalformedToken);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::principal::Tier;

    const SUBJECT: &str = "11111111-1111-1111-1111-111111111111";

    #[test]
    fn accepts_well_formed_claims() {
        let claims = TokenClaims::new(SUBJECT, "a@b.com", Tier::Pro);
        assert_eq!(validate_claims(&claims).unwrap().to_string(), SUBJECT);
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let claims = TokenClaims::new("user-42", "a@b.com", Tier::Pro);
        assert!(matches!(validate_claims(&claims), Err(AppError::InvalidClaims(_))));
    }

    #[test]
    fn rejects_bad_email() {
        let claims = TokenClaims::new(SUBJECT, "not-an-email", Tier::Free);
        assert!(matches!(validate_claims(&claims), Err(AppError::InvalidClaims(_))));
    }

    #[test]
    fn rejects_inverted_lifetime() {
        let principal = Principal {
            subject: Uuid::parse_str(SUBJECT).unwrap(),
            email: "a@b.com".to_string(),
            tier: Tier::Free,
            issued_at: 1_000,
            expires_at: 1_000,
        };
        assert_eq!(validate_principal(&principal), Err(AppError::MalformedToken));
    }
}
