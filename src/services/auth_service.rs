//! Authentication service - console login and account provisioning.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Password, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::UserRepository;

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a new account with a hashed password.
    async fn register(&self, login: &str, password: &str, role: UserRole) -> AppResult<User>;

    /// Authenticate and return the account.
    async fn login(&self, login: &str, password: &str) -> AppResult<User>;
}

/// Concrete implementation of AuthService.
pub struct Authenticator {
    users: Arc<dyn UserRepository>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, login: &str, password: &str, role: UserRole) -> AppResult<User> {
        let login = login.trim();
        if login.is_empty() {
            return Err(AppError::validation("Login must not be empty"));
        }

        let password_hash = Password::new(password)?.into_string();
        self.users.create(login, &password_hash, role).await
    }

    async fn login(&self, login: &str, password: &str) -> AppResult<User> {
        let user = self.users.find_by_login(login.trim()).await?;

        // Verify against a dummy hash when the login is unknown so the
        // response time does not reveal which logins exist.
        let dummy_hash =
            "$argon2id$v=19$m=19456,t=2,p=1$dummysalt123456$dummyhash1234567890123456789012";
        let (hash, known) = match &user {
            Some(u) => (u.password_hash.as_str(), true),
            None => (dummy_hash, false),
        };

        let valid = Password::from_hash(hash.to_string()).verify(password);
        if !known || !valid {
            return Err(AppError::InvalidCredentials);
        }

        // known is true here, so the user exists
        user.ok_or(AppError::InvalidCredentials)
    }
}
