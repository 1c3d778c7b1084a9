/// Account service - sign-up, login, and profile status.
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crypto_core::jwt::TokenCodec;
use crypto_core::password;

use crate::error::{AppError, FieldError, Result};
use crate::models::User;
use crate::store::UserStore;
use crate::validators;

/// Status every fresh account starts with.
pub const DEFAULT_STATUS: &str = "I am new!";

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    codec: TokenCodec,
}

/// A successful login: bearer token plus the identity it encodes.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: Uuid,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, codec: TokenCodec) -> Self {
        Self { users, codec }
    }

    /// Register a new account.
    ///
    /// All field violations are collected into one validation failure; a
    /// taken email address is reported the same way.
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<User> {
        let mut errors = validators::sign_up_errors(name, email, password);

        let email = email.trim().to_lowercase();
        if errors.is_empty() && self.users.user_by_email(&email).await?.is_some() {
            errors.push(FieldError::new(
                "email",
                "Email exists already, please pick a different one",
            ));
        }

        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            email,
            password_hash: password::hash_password(password.trim())?,
            status: DEFAULT_STATUS.to_string(),
            post_ids: vec![],
            created_at: now,
            updated_at: now,
        };

        self.users.insert_user(&user).await?;

        tracing::info!(user_id = %user.id, "account created");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    ///
    /// An unknown email and a wrong password produce the same error, so the
    /// response does not reveal which part was wrong.
    pub async fn log_in(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim().to_lowercase();

        let user = self
            .users
            .user_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".to_string()))?;

        let matches = password::verify_password(password.trim(), &user.password_hash)?;
        if !matches {
            return Err(AppError::Unauthenticated(
                "Invalid email or password".to_string(),
            ));
        }

        let token = self
            .codec
            .issue(user.id, &user.email)
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        Ok(Session {
            token,
            user_id: user.id,
        })
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User> {
        self.users
            .user_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn update_status(&self, user_id: Uuid, status: &str) -> Result<User> {
        if !validators::validate_status(status) {
            return Err(AppError::Validation(vec![FieldError::new(
                "status",
                "Status cannot be empty",
            )]));
        }

        self.users
            .set_status(user_id, status.trim(), Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> AccountService {
        AccountService::new(Arc::new(MemoryStore::new()), TokenCodec::new("test-secret"))
    }

    #[tokio::test]
    async fn test_sign_up_and_log_in_roundtrip() {
        let accounts = service();

        let user = accounts
            .sign_up("Jane", "jane@example.com", "secret1")
            .await
            .expect("sign up");
        assert_eq!(user.status, DEFAULT_STATUS);
        assert!(user.post_ids.is_empty());

        let session = accounts
            .log_in("jane@example.com", "secret1")
            .await
            .expect("login");
        assert_eq!(session.user_id, user.id);

        // The issued token decodes back to the same identity
        let claims = TokenCodec::new("test-secret")
            .verify(&session.token)
            .expect("token verifies");
        assert_eq!(claims.user_id().unwrap(), user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_validation_failure() {
        let accounts = service();
        accounts
            .sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap();

        let err = accounts
            .sign_up("Janet", "jane@example.com", "secret2")
            .await
            .unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "email");
            }
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_sign_up_collects_all_errors() {
        let err = service().sign_up("J", "nope", "ab").await.unwrap_err();
        match err {
            AppError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let accounts = service();
        accounts
            .sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap();

        let wrong_password = accounts
            .log_in("jane@example.com", "wrong1")
            .await
            .unwrap_err();
        let unknown_email = accounts
            .log_in("ghost@example.com", "secret1")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, AppError::Unauthenticated(_)));
        assert!(matches!(unknown_email, AppError::Unauthenticated(_)));
    }

    #[tokio::test]
    async fn test_update_status() {
        let accounts = service();
        let user = accounts
            .sign_up("Jane", "jane@example.com", "secret1")
            .await
            .unwrap();

        let updated = accounts
            .update_status(user.id, "Shipping things")
            .await
            .unwrap();
        assert_eq!(updated.status, "Shipping things");

        let err = accounts.update_status(user.id, "   ").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = accounts
            .update_status(Uuid::new_v4(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
