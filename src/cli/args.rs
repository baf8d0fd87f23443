//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::UserRole;

/// Market Exchange - console marketplace over PostgreSQL
#[derive(Parser, Debug)]
#[command(name = "market")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to the interactive console when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive market console
    Console,

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Manage user accounts
    Users(UsersArgs),
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the users command
#[derive(Parser, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub action: UsersAction,
}

/// User account actions
#[derive(Subcommand, Debug)]
pub enum UsersAction {
    /// Create an account in the database
    Create {
        /// Login name
        #[arg(long)]
        login: String,

        /// Plain-text password (hashed before storage)
        #[arg(long)]
        password: String,

        /// Account role
        #[arg(long, value_enum)]
        role: RoleArg,
    },
}

/// Role accepted on the command line
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum RoleArg {
    Admin,
    Seller,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Seller => UserRole::Seller,
        }
    }
}
