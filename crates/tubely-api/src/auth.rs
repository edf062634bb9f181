//! Bearer token authentication.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use tubely_models::UserId;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Issuer stamped into and required on every access token.
pub const TOKEN_ISSUER: &str = "tubely-access";

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// User ID
    pub sub: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// Sign an HS256 access token for `user`.
pub fn issue_access_token(user: UserId, secret: &str, ttl: Duration) -> ApiResult<String> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user.to_string(),
        iat: now,
        exp: now + ttl.as_secs() as i64,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to sign token: {}", e)))
}

/// Validate a raw `Authorization` header value and return the user it names.
pub fn validate_bearer_token(header: Option<&str>, secret: &str) -> ApiResult<UserId> {
    let header = header.ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let mut parts = header.split_whitespace();
    let token = match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => token,
        _ => return Err(ApiError::unauthorized("Invalid Authorization header format")),
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[TOKEN_ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss", "sub"]);

    let token_data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| {
            debug!("Token validation failed: {}", e);
            ApiError::unauthorized(format!("Token validation failed: {}", e))
        })?;

    token_data
        .claims
        .sub
        .parse::<UserId>()
        .map_err(|_| ApiError::unauthorized("Token subject is not a user id"))
}

/// Validate the `Authorization` header of a request.
pub fn authenticate(headers: &HeaderMap, secret: &str) -> ApiResult<UserId> {
    let header = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    validate_bearer_token(header, secret)
}

/// Authenticated user extracted from the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: UserId,
}

/// Axum extractor for authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = authenticate(&parts.headers, &state.config.jwt_secret)?;
        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_issue_and_validate() {
        let user = UserId::new();
        let token = issue_access_token(user, SECRET, Duration::from_secs(3600)).unwrap();

        let header = format!("Bearer {}", token);
        assert_eq!(validate_bearer_token(Some(&header), SECRET).unwrap(), user);
    }

    #[test]
    fn test_missing_header() {
        let err = validate_bearer_token(None, SECRET).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn test_wrong_scheme() {
        let token = issue_access_token(UserId::new(), SECRET, Duration::from_secs(60)).unwrap();
        let header = format!("Basic {}", token);
        assert!(validate_bearer_token(Some(&header), SECRET).is_err());
        assert!(validate_bearer_token(Some("Bearer"), SECRET).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = issue_access_token(UserId::new(), SECRET, Duration::from_secs(60)).unwrap();
        let header = format!("Bearer {}", token);
        assert!(validate_bearer_token(Some(&header), "other-secret").is_err());
    }

    #[test]
    fn test_expired_token() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: TOKEN_ISSUER.to_string(),
            sub: UserId::new().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let header = format!("Bearer {}", token);
        assert!(validate_bearer_token(Some(&header), SECRET).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            iss: "someone-else".to_string(),
            sub: UserId::new().to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let header = format!("Bearer {}", token);
        assert!(validate_bearer_token(Some(&header), SECRET).is_err());
    }
}
