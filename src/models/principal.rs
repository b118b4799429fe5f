use std::fmt;
use std::str::FromStr;
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::validation::auth::validate_subject;

/// The subscription tier carried in a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Pro,
    Enterprise,
}

impl Tier {
    /// The wire name of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Free => "free",
            Tier::Pro => "pro",
            Tier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "enterprise" => Ok(Tier::Enterprise),
            other => Err(AppError::InvalidClaims(format!("unknown tier: {}", other))),
        }
    }
}

/// Caller-supplied claims for token issuance.
#[derive(Debug, Clone, Validate)]
pub struct TokenClaims {
    /// The subject identifier; must be a UUID.
    #[garde(custom(validate_subject))]
    pub subject: String,
    /// The subject's email address.
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub tier: Tier,
}

impl TokenClaims {
    pub fn new(subject: impl Into<String>, email: impl Into<String>, tier: Tier) -> Self {
        Self {
            subject: subject.into(),
            email: email.into(),
            tier,
        }
    }
}

/// The verified identity decoded from a token payload.
///
/// Immutable once embedded in a token; a change of any field means issuing a
/// new token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Principal {
    #[garde(skip)]
    pub subject: Uuid,
    #[garde(email)]
    pub email: String,
    #[garde(skip)]
    pub tier: Tier,
    /// Unix seconds.
    #[garde(skip)]
    pub issued_at: i64,
    /// Unix seconds, strictly after `issued_at`.
    #[garde(skip)]
    pub expires_at: i64,
}
