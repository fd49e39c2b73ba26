//! Token validation and claim helpers.
//!
//! Tokens are minted locally with the HS256 secret the server accepts when
//! `SUPABASE_JWT_SECRET` is set. No running server or database is needed.
//!
//! Run with: `cargo test --test auth_test`
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use uuid::Uuid;

use freehub_backend::auth::jwt::{Claims, UserMetadata, validate_token_with_secret};
use freehub_backend::config::parse_project_ref;

const TEST_SECRET: &str = "test-secret-at-least-256-bits-long-for-hs256-xxxxxxx";

fn sign(claims: &Claims, secret: &str) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

fn claims_for(sub: &str, email: &str, full_name: &str) -> Claims {
    let now = Utc::now().timestamp() as usize;

    Claims {
        sub: sub.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: Some("https://example.supabase.co/auth/v1".to_string()),
        email: Some(email.to_string()),
        role: Some("authenticated".to_string()),
        user_metadata: Some(UserMetadata {
            full_name: Some(full_name.to_string()),
            name: None,
            avatar_url: Some("https://example.com/avatar.png".to_string()),
            picture: None,
            email: Some(email.to_string()),
            email_verified: Some(true),
        }),
    }
}

#[test]
fn test_valid_token_decodes_correctly() {
    let user_id = Uuid::new_v4();
    let token = sign(
        &claims_for(&user_id.to_string(), "alice@example.com", "Alice Smith"),
        TEST_SECRET,
    );

    let claims = validate_token_with_secret(&token, TEST_SECRET).expect("Token should be valid");

    assert_eq!(claims.user_id().unwrap(), user_id);
    assert_eq!(claims.user_email().as_deref(), Some("alice@example.com"));
    assert_eq!(claims.name().as_deref(), Some("Alice Smith"));
    assert_eq!(
        claims.picture().as_deref(),
        Some("https://example.com/avatar.png")
    );
}

#[test]
fn test_expired_token_is_rejected() {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        exp: now - 300, // well past the default 60s leeway
        iat: Some(now - 3600),
        ..claims_for(&Uuid::new_v4().to_string(), "expired@example.com", "Old Token")
    };

    let err = validate_token_with_secret(&sign(&claims, TEST_SECRET), TEST_SECRET).unwrap_err();
    assert!(err.contains("ExpiredSignature"), "{err}");
}

#[test]
fn test_wrong_secret_is_rejected() {
    let token = sign(
        &claims_for(&Uuid::new_v4().to_string(), "bob@example.com", "Bob Jones"),
        TEST_SECRET,
    );

    let err = validate_token_with_secret(&token, "completely-wrong-secret-xxxxxxxxxxxxxxxxxxx")
        .unwrap_err();
    assert!(err.contains("InvalidSignature"), "{err}");
}

#[test]
fn test_garbage_token_is_rejected() {
    assert!(validate_token_with_secret("not.a.valid.jwt", TEST_SECRET).is_err());
}

#[test]
fn test_non_uuid_subject_is_rejected() {
    let claims = claims_for("service-role", "svc@example.com", "Service");
    assert!(claims.user_id().is_err());
}

#[test]
fn test_claims_helpers_fall_back() {
    let now = Utc::now().timestamp() as usize;

    let bare = Claims {
        sub: Uuid::new_v4().to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some("bare@example.com".to_string()),
        role: None,
        user_metadata: None,
    };
    assert_eq!(bare.user_email().as_deref(), Some("bare@example.com"));
    assert!(bare.name().is_none());
    assert!(bare.picture().is_none());

    // Providers that only fill `name`/`picture`, and no top-level email.
    let github = Claims {
        email: None,
        user_metadata: Some(UserMetadata {
            full_name: None,
            name: Some("octocat".to_string()),
            avatar_url: None,
            picture: Some("https://example.com/octocat.png".to_string()),
            email: Some("octo@example.com".to_string()),
            email_verified: None,
        }),
        ..bare
    };
    assert_eq!(github.user_email().as_deref(), Some("octo@example.com"));
    assert_eq!(github.name().as_deref(), Some("octocat"));
    assert_eq!(
        github.picture().as_deref(),
        Some("https://example.com/octocat.png")
    );
}

#[test]
fn test_project_ref_is_parsed_from_supabase_url() {
    assert_eq!(
        parse_project_ref("https://abcd1234.supabase.co").unwrap(),
        "abcd1234"
    );
    assert_eq!(
        parse_project_ref("https://abcd1234.supabase.co/").unwrap(),
        "abcd1234"
    );
    assert!(parse_project_ref("http://abcd1234.supabase.co").is_err());
    assert!(parse_project_ref("https://example.com").is_err());
}
