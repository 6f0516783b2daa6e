use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ApiError;

/// Role claim carried by identity-provider tokens under `custom:role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Manager,
    Tenant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Manager => write!(f, "manager"),
            Role::Tenant => write!(f, "tenant"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Identity-provider user id (cognito id).
    pub sub: String,
    #[serde(rename = "custom:role")]
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(sub: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            sub,
            role,
            exp: (now + Duration::hours(24)).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Verify a bearer token's signature and expiry, then return its claims.
///
/// Decoding always validates against the configured key material. Failure
/// modes map onto the gate's contract: expired or bad signature is 401, a
/// token that does not parse at all (or carries an unknown role) is 400.
pub fn verify_token(token: &str) -> Result<Claims, ApiError> {
    let secret = &config::config().security.token_secret;
    if secret.is_empty() {
        tracing::error!("AUTH_TOKEN_SECRET is not configured");
        return Err(ApiError::service_unavailable("Authentication unavailable"));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims),
        Err(err) => {
            use jsonwebtoken::errors::ErrorKind;
            match err.kind() {
                ErrorKind::ExpiredSignature
                | ErrorKind::InvalidSignature
                | ErrorKind::ImmatureSignature => {
                    Err(ApiError::unauthorized("Invalid or expired token"))
                }
                _ => Err(ApiError::bad_request("Malformed token")),
            }
        }
    }
}

/// Issue a signed token carrying the role claim. Used by local tooling and
/// the test suite; production tokens come from the identity provider.
pub fn issue_token(sub: impl Into<String>, role: Role) -> Result<String, ApiError> {
    let secret = &config::config().security.token_secret;
    if secret.is_empty() {
        return Err(ApiError::service_unavailable("Authentication unavailable"));
    }

    let claims = Claims::new(sub.into(), role);
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| {
            tracing::error!("token generation error: {}", e);
            ApiError::internal_server_error("Failed to issue token")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_claims() {
        let token = issue_token("us-east-1:abc123", Role::Tenant).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.sub, "us-east-1:abc123");
        assert_eq!(claims.role, Role::Tenant);
    }

    #[test]
    fn garbage_token_is_bad_request() {
        let err = verify_token("not-a-jwt").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let secret = &config::config().security.token_secret;
        let mut claims = Claims::new("user".into(), Role::Manager);
        claims.exp = (Utc::now() - Duration::hours(2)).timestamp();
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        let err = verify_token(&token).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn tampered_signature_is_unauthorized() {
        let token = issue_token("user", Role::Manager).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        parts[2] = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
        let forged = parts.join(".");

        let err = verify_token(&forged).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn role_claim_uses_custom_field() {
        let json = serde_json::to_value(Claims::new("u".into(), Role::Manager)).unwrap();
        assert_eq!(json["custom:role"], "manager");
    }
}
