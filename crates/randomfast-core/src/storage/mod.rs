mod blob;
mod config;
pub mod database;
pub mod migrations;

pub use blob::{BlobStore, MemoryStore};
pub use config::{Config, DisplayConfig, FastsConfig, LoggingConfig, SamplerConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Returns the directory holding the database and `config.toml`.
///
/// `RANDOMFAST_HOME` wins when set. Otherwise `~/.config/randomfast[-dev]/`,
/// with `RANDOMFAST_ENV=dev` selecting the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("RANDOMFAST_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .ok_or_else(|| ConfigError::DataDir("home directory not found".into()))?
                .join(".config");

            let env = std::env::var("RANDOMFAST_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("randomfast-dev")
            } else {
                base_dir.join("randomfast")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
