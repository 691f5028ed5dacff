//! Token minting for authenticated test requests.

#![allow(dead_code)]

use bindery_api::auth::JwtClaims;
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

/// JWT secret for tests (must match the jwt_secret in the test config).
pub const TEST_JWT_SECRET: &str = "test-secret-key-min-32-characters-long-for-testing";

/// An author principal with a token the middleware will accept.
pub struct TestAuthor {
    pub author_id: Uuid,
    pub token: String,
}

/// Mint a fresh author identity with a one-hour token.
pub fn test_author() -> TestAuthor {
    let author_id = Uuid::new_v4();
    let claims = JwtClaims::for_author(author_id, 1);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode test token");
    TestAuthor { author_id, token }
}

/// `Authorization` header value for this author.
pub fn bearer(author: &TestAuthor) -> String {
    format!("Bearer {}", author.token)
}
