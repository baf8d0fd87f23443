//! CLI command implementations.

pub mod console;
pub mod migrate;
pub mod users;
