//! User repository - account persistence for console logins.

use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

use super::entities::user;
use crate::domain::{User, UserRole};
use crate::errors::{AppError, AppResult};

/// User persistence trait for dependency injection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new account. Fails when the login is taken.
    async fn create(&self, login: &str, password_hash: &str, role: UserRole) -> AppResult<User>;

    /// Find an account by login.
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;
}

/// PostgreSQL-backed user store.
pub struct PgUserStore {
    db: DatabaseConnection,
}

impl PgUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_domain(row: user::Model) -> AppResult<User> {
    let role = UserRole::parse(&row.role)
        .ok_or_else(|| AppError::internal(format!("Unknown role in users table: {}", row.role)))?;
    Ok(User {
        id: row.id,
        login: row.login,
        password_hash: row.password_hash,
        role,
        created_at: row.created_at,
    })
}

#[async_trait]
impl UserRepository for PgUserStore {
    async fn create(&self, login: &str, password_hash: &str, role: UserRole) -> AppResult<User> {
        if self.find_by_login(login).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let domain_user = User::new(login.to_string(), password_hash.to_string(), role);
        let model = user::ActiveModel {
            id: Set(domain_user.id),
            login: Set(domain_user.login.clone()),
            password_hash: Set(domain_user.password_hash.clone()),
            role: Set(domain_user.role.to_string()),
            created_at: Set(domain_user.created_at),
        };

        user::Entity::insert(model)
            .exec_without_returning(&self.db)
            .await?;

        Ok(domain_user)
    }

    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let row = user::Entity::find()
            .filter(user::Column::Login.eq(login))
            .one(&self.db)
            .await?;

        row.map(to_domain).transpose()
    }
}
