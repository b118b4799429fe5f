use crate::{
    error::{AppError, Result},
    models::principal::{Principal, Tier},
    services::auth::TokenAuthority,
};

/// Extracts the token from an `Authorization` header value.
///
/// # Arguments
///
/// * `header_value` - The raw header value, e.g. `Bearer eyJ...`.
///
/// # Returns
///
/// An `Option` containing the token if the scheme is `Bearer` and the token
/// is non-empty.
pub fn extract_bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Resolves an `Authorization` header value to a verified principal.
pub fn authenticate(authority: &TokenAuthority, header_value: Option<&str>) -> Option<Principal> {
    tracing::debug!("🔐 Checking authentication...");

    let Some(token) = header_value.and_then(extract_bearer_token) else {
        tracing::warn!("❌ No bearer token found");
        return None;
    };

    let principal = authority.verify_token(token)?;
    tracing::debug!("✅ User authenticated: {}", principal.subject);
    Some(principal)
}

/// A reusable authorization check over the set of allowed tiers.
#[derive(Debug, Clone)]
pub struct TierGuard {
    allowed: Vec<Tier>,
}

/// Builds a guard admitting principals whose tier is in `allowed`.
pub fn require_tier(allowed: &[Tier]) -> TierGuard {
    TierGuard {
        allowed: allowed.to_vec(),
    }
}

impl TierGuard {
    /// Checks a verified principal against the guard.
    ///
    /// # Returns
    ///
    /// The principal, `Unauthenticated` when none is present, or
    /// `InsufficientTier` when its tier is not allowed.
    pub fn check<'a>(&self, principal: Option<&'a Principal>) -> Result<&'a Principal> {
        let principal = principal.ok_or(AppError::Unauthenticated)?;

        if !self.allowed.contains(&principal.tier) {
            tracing::warn!(
                subject = %principal.subject,
                tier = %principal.tier,
                "Tier not permitted"
            );
            return Err(AppError::InsufficientTier);
        }

        Ok(principal)
    }

    /// Authenticates a header value and checks the resulting principal.
    pub fn authorize(
        &self,
        authority: &TokenAuthority,
        header_value: Option<&str>,
    ) -> Result<Principal> {
        let principal = authenticate(authority, header_value);
        self.check(principal.as_ref()).cloned()
    }
}
