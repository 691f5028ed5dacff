use crate::error::ErrorResponse;
use axum::extract::FromRequestParts;
use axum::http::{request::Parts, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // author_id
    pub exp: i64,  // expiration timestamp
    pub iat: i64,  // issued at timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>, // not-before timestamp (optional)
}

impl JwtClaims {
    /// Claims for `author_id`, valid for `expiry_hours` from now.
    pub fn for_author(author_id: Uuid, expiry_hours: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: author_id,
            exp: now + expiry_hours * 3600,
            iat: now,
            nbf: None,
        }
    }
}

/// Author principal extracted from a verified JWT and stored in request
/// extensions by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthorContext {
    pub author_id: Uuid,
}

// FromRequestParts rather than Extension: multipart handlers consume the
// request body, and Extension cannot be combined with Multipart.
impl<S> FromRequestParts<S> for AuthorContext
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthorContext>()
            .cloned()
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(ErrorResponse::new(
                        "Missing author context",
                        "MISSING_AUTHOR_CONTEXT",
                    )),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_expiry_follows_issue_time() {
        let claims = JwtClaims::for_author(Uuid::new_v4(), 24);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert!(claims.nbf.is_none());
    }
}
