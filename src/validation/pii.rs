use chrono::{NaiveDate, Utc};
use garde::Validate;

use crate::error::{AppError, Result};
use crate::models::pii::Pii;

/// Maximum length of a name field in characters.
const MAX_NAME_CHARS: usize = 100;
/// Minimum number of digits in a phone number.
const MIN_PHONE_DIGITS: usize = 7;

/// Validates a first or last name.
pub fn validate_name(value: &str, _ctx: &()) -> garde::Result {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(garde::Error::new("name cannot be empty"));
    }

    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(garde::Error::new("name must be at most 100 characters"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'' || c == '.')
    {
        return Err(garde::Error::new(
            "name can only contain letters, spaces, hyphens, apostrophes and periods",
        ));
    }

    Ok(())
}

/// Validates a `YYYY-MM-DD` birth date that is a real day not in the future.
pub fn validate_birth_date(value: &str, _ctx: &()) -> garde::Result {
    if value.len() != 10 {
        return Err(garde::Error::new("birth date must be YYYY-MM-DD"));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| garde::Error::new("birth date must be YYYY-MM-DD"))?;

    if date > Utc::now().date_naive() {
        return Err(garde::Error::new("birth date cannot be in the future"));
    }

    Ok(())
}

/// Validates an optional phone number.
pub fn validate_phone(value: &Option<String>, _ctx: &()) -> garde::Result {
    let Some(phone) = value else {
        return Ok(());
    };

    if phone.len() < MIN_PHONE_DIGITS || phone.len() > 20 {
        return Err(garde::Error::new("phone must be 7 to 20 characters"));
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '(' | ')' | '-'))
    {
        return Err(garde::Error::new("phone contains invalid characters"));
    }

    if phone.chars().filter(|c| c.is_ascii_digit()).count() < MIN_PHONE_DIGITS {
        return Err(garde::Error::new("phone must contain at least 7 digits"));
    }

    Ok(())
}

/// Validates a PII record against the schema.
///
/// # Returns
///
/// `InvalidPii` carrying the field report, never the field values.
pub fn validate_pii(pii: &Pii) -> Result<()> {
    pii.validate()
        .map_err(|report| AppError::InvalidPii(report.to_string()))
}
