//! Account registration and authentication.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use murmur_common::{AppError, AppResult};
use murmur_db::{NewUser, SharedUserStore};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::context::Actor;
use crate::services::token::SharedTokenService;

/// Credentials submitted to `POST /api/authenticate`.
///
/// `username` is only consulted when the e-mail address is new.
#[derive(Debug, Deserialize, Validate)]
pub struct AuthenticateInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 128))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,
}

/// Result of [`AccountService::register_or_authenticate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AuthOutcome {
    /// A new account was created. No token is issued; the client
    /// authenticates with a second call.
    Registered { user_id: String },
    /// Existing account, credentials accepted.
    Authenticated { user_id: String, token: String },
}

/// Account service.
#[derive(Clone)]
pub struct AccountService {
    users: SharedUserStore,
    tokens: SharedTokenService,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub fn new(users: SharedUserStore, tokens: SharedTokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a new account, or log into the existing one with this e-mail.
    pub async fn register_or_authenticate(
        &self,
        input: AuthenticateInput,
    ) -> AppResult<AuthOutcome> {
        if let Some(user) = self.users.find_by_email(&input.email).await? {
            if !verify_password(&input.password, &user.credential_hash)? {
                tracing::debug!(user_id = %user.id, "Rejected credentials");
                return Err(AppError::Unauthorized("invalid credentials".to_string()));
            }

            let token = self.tokens.issue(&user.id, &user.email)?;
            tracing::debug!(user_id = %user.id, "Authenticated user");
            return Ok(AuthOutcome::Authenticated {
                user_id: user.id,
                token,
            });
        }

        input.validate()?;

        let credential_hash = hash_password(&input.password)?;
        let user = self
            .users
            .create(NewUser {
                username: input.username,
                email: input.email,
                credential_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");
        Ok(AuthOutcome::Registered { user_id: user.id })
    }

    /// Verify a bearer token.
    pub fn resolve_token(&self, token: &str) -> AppResult<Actor> {
        self.tokens.verify(token)
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::token::{JwtTokenService, TokenService};
    use murmur_db::{MemoryStore, UserStore};
    use std::sync::Arc;

    fn create_test_service() -> (AccountService, MemoryStore) {
        let store = MemoryStore::new();
        let service = AccountService::new(
            Arc::new(store.clone()),
            Arc::new(JwtTokenService::new("secret", 3600)),
        );
        (service, store)
    }

    fn input(username: &str, email: &str, password: &str) -> AuthenticateInput {
        AuthenticateInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[tokio::test]
    async fn test_first_call_registers_without_token() {
        let (service, store) = create_test_service();

        let outcome = service
            .register_or_authenticate(input("alice", "a@x.com", "password1"))
            .await
            .unwrap();

        let AuthOutcome::Registered { user_id } = outcome else {
            panic!("expected Registered, got {outcome:?}");
        };
        let user = store.find_by_id(&user_id).await.unwrap().unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.followers.is_empty());
        assert_ne!(user.credential_hash, "password1");
    }

    #[tokio::test]
    async fn test_second_call_authenticates() {
        let (service, _) = create_test_service();
        service
            .register_or_authenticate(input("alice", "a@x.com", "password1"))
            .await
            .unwrap();

        let outcome = service
            .register_or_authenticate(input("", "a@x.com", "password1"))
            .await
            .unwrap();

        let AuthOutcome::Authenticated { user_id, token } = outcome else {
            panic!("expected Authenticated, got {outcome:?}");
        };
        let actor = service.resolve_token(&token).unwrap();
        assert_eq!(actor.user_id, user_id);
        assert_eq!(actor.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let (service, _) = create_test_service();
        service
            .register_or_authenticate(input("alice", "a@x.com", "password1"))
            .await
            .unwrap();

        let result = service
            .register_or_authenticate(input("alice", "a@x.com", "password2"))
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized(msg)) if msg == "invalid credentials"));
    }

    #[tokio::test]
    async fn test_registration_validates_input() {
        let (service, store) = create_test_service();

        for bad in [
            input("", "a@x.com", "password1"),
            input("alice", "not-an-email", "password1"),
            input("alice", "a@x.com", "short"),
        ] {
            let result = service.register_or_authenticate(bad).await;
            assert!(matches!(result, Err(AppError::Validation(_))));
        }
        assert!(store.find_by_email("a@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_token_rejects_foreign_token() {
        let (service, _) = create_test_service();
        let foreign = JwtTokenService::new("other", 3600)
            .issue("user1", "a@x.com")
            .unwrap();

        assert!(matches!(
            service.resolve_token(&foreign),
            Err(AppError::Unauthorized(_))
        ));
    }
}
