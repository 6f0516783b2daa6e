use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::auth::{verify_token, Role};
use crate::error::ApiError;

/// Authenticated caller extracted from a verified bearer token.
///
/// The gate runs before any handler logic: extraction fails with 401 when
/// the token is missing, 401/400 when verification fails, and handlers
/// enforce their route's allow-list with [`AuthUser::require`] (403).
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub cognito_id: String,
    pub role: Role,
}

impl AuthUser {
    /// Allow-list check for the current route.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden("Access denied"))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let claims = verify_token(&token)?;
        Ok(AuthUser {
            cognito_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.to_string()),
        Some(_) => Err(ApiError::unauthorized("Empty bearer token")),
        None => Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        )),
    }
}
