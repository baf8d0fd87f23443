//! Application configuration and constants.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
