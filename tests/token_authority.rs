use chrono::Utc;
use once_cell::sync::Lazy;
use serde_json::{json, Value};

use credential_vault::{
    hash_password,
    middleware_layer::auth::require_tier,
    verify_password, AppError, Config, Principal, Tier, TokenAuthority, TokenClaims, TokenState,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

// Shared test context
static CONFIG: Lazy<Config> = Lazy::new(|| {
    Config::new(
        "integration-signing-secret-abcdefghijklmnop",
        "integration-pii-salt",
        3600,
    )
    .unwrap()
});

const SUBJECT: &str = "11111111-1111-1111-1111-111111111111";

fn authority() -> TokenAuthority {
    TokenAuthority::new(&CONFIG)
}

fn claims(tier: Tier) -> TokenClaims {
    TokenClaims::new(SUBJECT, "a@b.com", tier)
}

fn decode_payload(token: &str) -> Value {
    let payload = token.split('.').nth(1).unwrap();
    serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap()
}

#[test]
fn test_issue_then_verify_immediately() {
    let authority = authority();
    let before = Utc::now().timestamp();
    let token = authority.issue_token(&claims(Tier::Pro)).unwrap();

    let principal: Principal = authority.verify_token(&token).expect("token should verify");
    assert_eq!(principal.subject.to_string(), SUBJECT);
    assert_eq!(principal.email, "a@b.com");
    assert_eq!(principal.tier, Tier::Pro);
    assert!(principal.issued_at >= before);
    assert_eq!(principal.expires_at - principal.issued_at, 3600);
}

#[test]
fn test_payload_has_exact_keys() {
    let token = authority().issue_token(&claims(Tier::Free)).unwrap();
    let payload = decode_payload(&token);

    let mut keys: Vec<&str> = payload.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["email", "expiresAt", "issuedAt", "subject", "tier"]);
    assert!(payload["issuedAt"].is_i64());
}

#[test]
fn test_tier_escalation_without_resigning_fails() {
    let authority = authority();
    let token = authority.issue_token(&claims(Tier::Pro)).unwrap();

    let mut payload = decode_payload(&token);
    payload["tier"] = json!("enterprise");
    let forged = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());

    let parts: Vec<&str> = token.split('.').collect();
    let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);

    assert!(authority.verify_token(&tampered).is_none());
    assert_eq!(
        authority.inspect_token_at(&tampered, Utc::now().timestamp()),
        Err(AppError::SignatureMismatch)
    );
}

#[test]
fn test_expired_token_yields_no_principal() {
    let authority = authority();
    let issued = Utc::now().timestamp() - 7200;
    let token = authority.issue_token_at(&claims(Tier::Enterprise), issued).unwrap();

    assert!(authority.verify_token(&token).is_none());
    assert_eq!(authority.state_at(&token, Utc::now().timestamp()), TokenState::Expired);
    assert_eq!(authority.state_at(&token, issued + 1), TokenState::Valid);
}

#[test]
fn test_rejections_collapse_to_none() {
    let authority = authority();
    for token in ["", "...", "a.b.c", "onlyonepart", "x.y.z.w"] {
        assert!(authority.verify_token(token).is_none(), "token {:?}", token);
    }
}

#[test]
fn test_tier_guard_over_real_token() {
    let authority = authority();
    let token = authority.issue_token(&claims(Tier::Free)).unwrap();
    let header = format!("Bearer {}", token);

    let free_only = require_tier(&[Tier::Free]);
    assert!(free_only.authorize(&authority, Some(header.as_str())).is_ok());

    let paid = require_tier(&[Tier::Pro, Tier::Enterprise]);
    assert_eq!(
        paid.authorize(&authority, Some(header.as_str())),
        Err(AppError::InsufficientTier)
    );
}

#[test]
fn test_authority_is_shared_across_threads() {
    let authority = authority();
    let tiers = [Tier::Free, Tier::Pro, Tier::Enterprise];

    std::thread::scope(|scope| {
        for tier in tiers {
            let authority = &authority;
            scope.spawn(move || {
                for _ in 0..50 {
                    let token = authority.issue_token(&claims(tier)).unwrap();
                    let principal = authority.verify_token(&token).unwrap();
                    assert_eq!(principal.tier, tier);
                }
            });
        }
    });
}

#[test]
fn test_password_contract() {
    let record = hash_password("correct horse battery staple").unwrap();
    assert!(verify_password("correct horse battery staple", &record));
    assert!(!verify_password("correct horse battery stapler", &record));
    assert!(!verify_password("correct horse battery staple", "not-a-record"));
}
