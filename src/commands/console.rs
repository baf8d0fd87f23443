//! Console command - run the interactive market console.

use std::sync::Arc;

use crate::config::Config;
use crate::console::Console;
use crate::errors::AppResult;
use crate::infra::Database;
use crate::services::Services;

/// Execute the console command.
///
/// Connects to PostgreSQL when DATABASE_URL is set; otherwise (or when
/// initialization fails) falls back to the in-memory backend.
pub async fn execute(config: Config) -> AppResult<()> {
    let services = match &config.database_url {
        Some(url) => match Database::connect(url).await {
            Ok(db) => {
                tracing::info!("Running with PostgreSQL");
                Services::postgres(db.get_connection())
            }
            Err(e) => {
                tracing::error!(
                    "Failed to initialize database, falling back to in-memory: {}",
                    e
                );
                in_memory()?
            }
        },
        None => {
            tracing::info!("DATABASE_URL is not set. Running in in-memory mode.");
            in_memory()?
        }
    };

    let stdin = std::io::stdin().lock();
    let stdout = std::io::stdout();
    let mut console = Console::new(stdin, stdout, Arc::new(services));
    console.run().await
}

fn in_memory() -> AppResult<Services> {
    tracing::info!("Demo accounts: admin/admin123, seller/seller123");
    Services::in_memory()
}
