use std::fmt;
use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::validation::pii::{validate_birth_date, validate_name, validate_phone};

/// A personally identifiable record as handled by the vault.
///
/// Never log this type directly; go through [`crate::services::vault::redact`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Pii {
    #[garde(custom(validate_name))]
    pub first_name: String,
    #[garde(custom(validate_name))]
    pub last_name: String,
    /// `YYYY-MM-DD`.
    #[garde(custom(validate_birth_date))]
    pub birth_date: String,
    /// Free-text location, comma-delimited from most to least specific.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(length(min = 1, max = 200))]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(email)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[garde(custom(validate_phone))]
    pub phone: Option<String>,
}

impl fmt::Debug for Pii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pii(<redacted>)")
    }
}

/// A log-safe rendering of [`Pii`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedactedPii {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub has_email: bool,
    pub has_phone: bool,
}

impl fmt::Display for RedactedPii {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({}) location={} email={} phone={}",
            self.first_name,
            self.last_name,
            self.birth_date,
            self.location.as_deref().unwrap_or("-"),
            self.has_email,
            self.has_phone
        )
    }
}
