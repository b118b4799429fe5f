use std::env;
use std::fmt;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Minimum accepted length of the token signing secret, in characters.
pub const MIN_SIGNING_SECRET_LEN: usize = 32;
/// Minimum accepted length of the PII hashing salt, in characters.
pub const MIN_PII_SALT_LEN: usize = 16;
/// Token lifetime used when `TOKEN_LIFETIME_SECS` is not set.
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
/// Longest accepted token lifetime (30 days).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 3600;

/// Process-wide secret material, built once at startup and passed explicitly
/// to the token authority and the PII vault.
#[derive(Clone)]
pub struct Config {
    /// The secret keying the token signatures.
    pub signing_secret: Zeroizing<String>,
    /// The salt mixed into PII content hashes.
    pub pii_salt: Zeroizing<String>,
    /// The lifetime of an issued token in seconds.
    pub token_lifetime_secs: i64,
}

impl Config {
    /// Creates a new `Config`, enforcing the minimum secret lengths.
    ///
    /// # Arguments
    ///
    /// * `signing_secret` - At least 32 characters.
    /// * `pii_salt` - At least 16 characters.
    /// * `token_lifetime_secs` - Strictly positive, at most 30 days.
    pub fn new(
        signing_secret: impl Into<String>,
        pii_salt: impl Into<String>,
        token_lifetime_secs: i64,
    ) -> Result<Self> {
        let signing_secret = Zeroizing::new(signing_secret.into());
        let pii_salt = Zeroizing::new(pii_salt.into());

        if signing_secret.chars().count() < MIN_SIGNING_SECRET_LEN {
            anyhow::bail!(
                "signing secret must be at least {} characters",
                MIN_SIGNING_SECRET_LEN
            );
        }

        if pii_salt.chars().count() < MIN_PII_SALT_LEN {
            anyhow::bail!("PII salt must be at least {} characters", MIN_PII_SALT_LEN);
        }

        if token_lifetime_secs <= 0 {
            anyhow::bail!("token lifetime must be positive, got {}", token_lifetime_secs);
        }

        if token_lifetime_secs > MAX_TOKEN_LIFETIME_SECS {
            anyhow::bail!(
                "token lifetime must be at most {} seconds, got {}",
                MAX_TOKEN_LIFETIME_SECS,
                token_lifetime_secs
            );
        }

        Ok(Self {
            signing_secret,
            pii_salt,
            token_lifetime_secs,
        })
    }

    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let signing_secret = Zeroizing::new(
            env::var("TOKEN_SIGNING_SECRET")
                .context("TOKEN_SIGNING_SECRET must be set (generate with: openssl rand -hex 32)")?,
        );

        let pii_salt = Zeroizing::new(
            env::var("PII_HASH_SALT").context("PII_HASH_SALT must be set")?,
        );

        let token_lifetime_secs = env::var("TOKEN_LIFETIME_SECS")
            .unwrap_or_else(|_| DEFAULT_TOKEN_LIFETIME_SECS.to_string())
            .parse()
            .context("Invalid TOKEN_LIFETIME_SECS")?;

        Self::new(signing_secret.as_str(), pii_salt.as_str(), token_lifetime_secs)
            .context("Invalid secret configuration")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("signing_secret", &"<redacted>")
            .field("pii_salt", &"<redacted>")
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn accepts_minimum_lengths() {
        let config = Config::new(SECRET, "0123456789abcdef", 60).unwrap();
        assert_eq!(config.token_lifetime_secs, 60);
    }

    #[test]
    fn rejects_short_signing_secret() {
        assert!(Config::new("too-short", "0123456789abcdef", 60).is_err());
    }

    #[test]
    fn rejects_short_salt() {
        assert!(Config::new(SECRET, "short", 60).is_err());
    }

    #[test]
    fn rejects_non_positive_lifetime() {
        assert!(Config::new(SECRET, "0123456789abcdef", 0).is_err());
    }

    #[test]
    fn lifetime_has_an_upper_bound() {
        assert!(Config::new(SECRET, "0123456789abcdef", MAX_TOKEN_LIFETIME_SECS).is_ok());
        assert!(Config::new(SECRET, "0123456789abcdef", MAX_TOKEN_LIFETIME_SECS + 1).is_err());
        assert!(Config::new(SECRET, "0123456789abcdef", i64::MAX).is_err());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = Config::new(SECRET, "0123456789abcdef", 60).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains(SECRET));
        assert!(rendered.contains("<redacted>"));
    }
}
