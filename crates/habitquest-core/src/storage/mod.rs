mod config;
mod state_store;

pub use config::{Config, NotificationsConfig, StorageConfig};
pub use state_store::{JsonFileStore, MemoryStore, StateStore};

use std::path::PathBuf;

use crate::error::Result;

/// Returns the data directory, creating it if needed.
///
/// `HABITQUEST_DATA_DIR` wins when set. Otherwise `~/.config/habitquest`,
/// or `~/.config/habitquest-dev` with `HABITQUEST_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("HABITQUEST_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("HABITQUEST_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("habitquest-dev")
            } else {
                base_dir.join("habitquest")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
