//! Configuration loader for inbrief.
//!
//! Reads `config.toml` from the data directory (`~/.inbrief/` by default) or
//! from an explicit path, and deserializes it into [`AppConfig`].

use std::path::{Path, PathBuf};

use inbrief_types::config::AppConfig;
use inbrief_types::error::ConfigError;

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "INBRIEF_HOME";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `INBRIEF_HOME` environment variable
/// 2. `~/.inbrief`
/// 3. `.inbrief` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(HOME_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".inbrief");
    }

    PathBuf::from(".inbrief")
}

/// Default location of the blob store root.
pub fn default_blob_root(data_dir: &Path) -> PathBuf {
    data_dir.join("blobs")
}

/// Load configuration.
///
/// With `explicit` set, that file is read and a parse failure is an error.
/// Otherwise `{data_dir}/config.toml` is read and a parse failure only logs a
/// warning. A missing file yields the defaults in both cases. The result is
/// validated before it is returned.
pub async fn load_config(data_dir: &Path, explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let config = match explicit {
        Some(path) => read_config(path).await?,
        None => {
            let path = data_dir.join("config.toml");
            match read_config(&path).await {
                Ok(config) => config,
                Err(err) => {
                    tracing::warn!("{err}, using defaults");
                    AppConfig::default()
                }
            }
        }
    };

    config.validate()?;
    Ok(config)
}

async fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    toml::from_str::<AppConfig>(&content)
        .map_err(|err| ConfigError::Parse(format!("{}: {err}", path.display())))
}
