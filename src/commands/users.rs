//! Users command - account provisioning.

use std::sync::Arc;

use crate::cli::{UsersAction, UsersArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{Database, PgUserStore};
use crate::services::{AuthService, Authenticator};

/// Execute the users command
pub async fn execute(args: UsersArgs, config: Config) -> AppResult<()> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::validation("DATABASE_URL must be set to manage accounts"))?;

    let db = Database::connect(url)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        UsersAction::Create {
            login,
            password,
            role,
        } => {
            let auth = Authenticator::new(Arc::new(PgUserStore::new(db.get_connection())));
            let user = auth.register(&login, &password, role.into()).await?;
            println!("Created {} ({})", user.login, user.role);
        }
    }

    Ok(())
}
