//! Session tokens and PII encryption for the request layer.
//!
//! - [`services::auth::TokenAuthority`] issues and verifies HMAC-signed
//!   session tokens and hashes passwords with Argon2id.
//! - [`services::vault::PiiVault`] encrypts PII with AES-256-GCM, derives
//!   keys, fingerprints records and redacts them for logging.
//!
//! Both take their secrets from a [`config::Config`] built once at startup.
//! Every operation is synchronous and free of shared mutable state.

pub mod config;
pub mod error;

pub mod crypto {
    pub mod aes;
    pub mod kdf;
    pub mod mac;
}

pub mod models {
    pub mod principal;
    pub mod session;
    pub mod pii;
    pub mod record;
}

pub mod services {
    pub mod auth;
    pub mod vault;
}

pub mod middleware_layer {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
    pub mod pii;
}

pub use config::Config;
pub use error::{AppError, Result};
pub use models::pii::{Pii, RedactedPii};
pub use models::principal::{Principal, Tier, TokenClaims};
pub use models::record::{EncryptedPayload, EncryptedPiiRecord};
pub use models::session::TokenState;
pub use services::auth::{hash_password, verify_password, TokenAuthority};
pub use services::vault::PiiVault;
