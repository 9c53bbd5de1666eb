//! Centralized path resolution for the trading core.
//!
//! All file and directory paths are resolved through this module so behavior
//! is consistent across platforms.
//!
//! - **macOS**: `~/Library/Application Support/TradingCore/`
//! - **Windows**: `%LOCALAPPDATA%\TradingCore\`
//! - **Linux**: `$XDG_DATA_HOME/TradingCore/` (fallback `~/.local/share/TradingCore/`)
//!
//! ```text
//! ~/TradingCore/
//! ├── data/
//! │ ├── config.toml
//! │ ├── trading-core.db
//! │ └── wallets/<public_key>.blob
//! └── logs/
//!     └── trading-core_*.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::logger::{self, LogTag};

static INITIALIZED: AtomicBool = AtomicBool::new(false);

static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(|| {
    let base_dir = resolve_base_directory();
    INITIALIZED.store(true, Ordering::SeqCst);
    base_dir
});

fn resolve_base_directory() -> PathBuf {
    const APP_DIR: &str = "TradingCore";

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join(APP_DIR);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(APP_DIR);
    }
    PathBuf::from(APP_DIR)
}

pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

pub fn get_data_directory() -> PathBuf {
    BASE_DIRECTORY.join("data")
}

pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

/// Directory holding one encrypted blob per custodial wallet (§6: "one
/// encrypted blob per user on disk").
pub fn get_wallets_directory() -> PathBuf {
    get_data_directory().join("wallets")
}

pub fn get_config_path() -> PathBuf {
    get_data_directory().join("config.toml")
}

/// Default SQLite database path (wallet metadata, trade records, preferences).
pub fn get_database_path() -> PathBuf {
    get_data_directory().join("trading-core.db")
}

/// Encrypted blob path for a single wallet, keyed by its public key.
pub fn get_wallet_blob_path(public_key: &str) -> PathBuf {
    get_wallets_directory().join(format!("{public_key}.blob"))
}

pub fn get_process_lock_path() -> PathBuf {
    get_data_directory().join(".trading-core.lock")
}

/// Ensures all required directories exist. Should be called early in startup.
pub fn ensure_all_directories() -> Result<(), String> {
    if !is_initialized() {
        eprintln!("Base directory: {}", get_base_directory().display());
    }

    let dirs_to_create = vec![
        ("base", get_base_directory()),
        ("data", get_data_directory()),
        ("logs", get_logs_directory()),
        ("wallets", get_wallets_directory()),
    ];

    for (name, dir) in dirs_to_create {
        if !dir.exists() {
            std::fs::create_dir_all(&dir).map_err(|e| {
                format!(
                    "Failed to create {} directory at {}: {}",
                    name,
                    dir.display(),
                    e
                )
            })?;
            logger::info(
                LogTag::System,
                &format!("Created directory: {}", dir.display()),
            );
        }
    }

    Ok(())
}

pub fn get_base_directory_display() -> String {
    BASE_DIRECTORY.display().to_string()
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_logs_wallets_are_subdirs_of_base() {
        let base = get_base_directory();
        assert!(get_data_directory().starts_with(&base));
        assert!(get_logs_directory().starts_with(&base));
        assert!(get_wallets_directory().starts_with(&get_data_directory()));
    }

    #[test]
    fn config_and_database_paths_in_data_dir() {
        let data = get_data_directory();
        assert!(get_config_path().starts_with(&data));
        assert!(get_database_path().starts_with(&data));
        assert_eq!(get_config_path().file_name().unwrap(), "config.toml");
    }

    #[test]
    fn wallet_blob_path_is_keyed_by_public_key() {
        let path = get_wallet_blob_path("ABC123");
        assert_eq!(path.file_name().unwrap(), "ABC123.blob");
        assert!(path.starts_with(get_wallets_directory()));
    }
}
