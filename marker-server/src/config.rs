//! Environment-driven configuration (`spec.md` §6), loaded the way
//! `ferrex-server`'s own `Config::from_env` reads its environment: a
//! `.env` file via `dotenvy`, then explicit `std::env::var` reads with
//! typed fallbacks, no derive-macro magic.

use std::path::PathBuf;

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Connection string for the foreign library database.
    pub database_path: String,
    /// Filesystem path to this service's own action-log sqlite file.
    pub metadata_path: PathBuf,
    pub log_level: String,
    /// Accepted and stored but never read by `marker-core`: thumbnail
    /// extraction is out of scope.
    pub preview_thumbnails: bool,
    /// Accepted and stored but never read by `marker-core`: the browser
    /// auto-launch is out of scope.
    pub auto_open: bool,
    /// Enables the Action Log and Purge Reconciler.
    pub backup_actions: bool,
    /// Enables the Marker Cache.
    pub extended_marker_stats: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            host: env_or("MARKER_HOST", "127.0.0.1"),
            port: env_or("MARKER_PORT", "8677").parse().context("MARKER_PORT must be a u16")?,
            database_path: std::env::var("MARKER_DATABASE_PATH")
                .context("MARKER_DATABASE_PATH is required (library database connection string)")?,
            metadata_path: PathBuf::from(env_or("MARKER_METADATA_PATH", "./marker-metadata.sqlite")),
            log_level: env_or("MARKER_LOG_LEVEL", "info"),
            preview_thumbnails: env_bool("MARKER_PREVIEW_THUMBNAILS", false),
            auto_open: env_bool("MARKER_AUTO_OPEN", false),
            backup_actions: env_bool("MARKER_BACKUP_ACTIONS", true),
            extended_marker_stats: env_bool("MARKER_EXTENDED_STATS", true),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).map(|v| matches!(v.as_str(), "1" | "true" | "yes")).unwrap_or(default)
}
