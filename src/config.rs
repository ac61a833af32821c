//! Application-level configuration loading: database location, upload
//! directory, and upload limits.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MASTERSHEET_CONFIG_PATH";

const DEFAULT_DATABASE_URL: &str = "sqlite:data/band.db";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_MB: usize = 50;

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    database_url: String,
    upload_dir: PathBuf,
    max_upload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            upload_dir: DEFAULT_UPLOAD_DIR.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_MB * 1024 * 1024,
        }
    }
}

impl AppConfig {
    /// Load the configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded configuration");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// sqlx-style URL of the SQLite database.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Directory uploaded PDFs are written to and served from.
    pub fn upload_dir(&self) -> &PathBuf {
        &self.upload_dir
    }

    /// Upper bound on a single upload request body.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }
}

/// On-disk representation; every field optional so partial configs work.
#[derive(Debug, Deserialize)]
struct RawConfig {
    database_url: Option<String>,
    upload_dir: Option<PathBuf>,
    max_upload_mb: Option<usize>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            database_url: raw.database_url.unwrap_or(defaults.database_url),
            upload_dir: raw.upload_dir.unwrap_or(defaults.upload_dir),
            max_upload_bytes: raw
                .max_upload_mb
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

fn resolve_config_path() -> PathBuf {
    env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}
