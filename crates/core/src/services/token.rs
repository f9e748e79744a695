//! Bearer token issuance and verification.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use murmur_common::{AppError, AppResult, config::AuthConfig};
use serde::{Deserialize, Serialize};

use crate::context::Actor;

/// Issues and verifies bearer tokens.
///
/// Stateless: a token carries everything needed to verify it.
pub trait TokenService: Send + Sync {
    /// Issue a token bound to `user_id`.
    fn issue(&self, user_id: &str, email: &str) -> AppResult<String>;

    /// Verify a token and return the identity it was issued to.
    ///
    /// Fails with [`AppError::Unauthorized`] for malformed, tampered or
    /// expired tokens.
    fn verify(&self, token: &str) -> AppResult<Actor>;
}

/// Shared handle to a token service.
pub type SharedTokenService = Arc<dyn TokenService>;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// HS256 JWT implementation of [`TokenService`].
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl JwtTokenService {
    /// Create a token service signing with `secret`.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Create a token service from the `auth` configuration section.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_secs)
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, user_id: &str, email: &str) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    fn verify(&self, token: &str) -> AppResult<Actor> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("token expired".to_string()),
                _ => AppError::Unauthorized("invalid token".to_string()),
            }
        })?;

        Ok(Actor {
            user_id: data.claims.sub,
            email: data.claims.email,
        })
    }
}
