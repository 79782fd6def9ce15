//! `~/.rota/config.toml` loading and database path resolution.
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//!
//! [store]
//! path = "${HOME}/rota/students.db"
//! ```

use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
};
use thiserror::Error;

use rota_types::ui::UiOptions;

/// Environment variable that overrides the configured database path.
pub const DB_PATH_ENV: &str = "ROTA_DB";

const DEFAULT_DB_FILE: &str = "students.db";

#[derive(Debug, Default, Deserialize)]
pub struct RotaConfig {
    pub app: Option<AppConfig>,
    pub store: Option<StoreConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for list markers and key hints.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// Database file. `${VAR}` references and a leading `~/` are expanded.
    pub path: Option<String>,
}

/// Replace `${VAR}` with the variable's value (empty when unset).
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        if let Some(end) = after.find('}') {
            let var = &after[..end];
            if !var.is_empty() {
                out.push_str(&env::var(var).unwrap_or_default());
            }
            rest = &after[end + 1..];
        } else {
            out.push_str(&rest[start..]);
            rest = "";
        }
    }
    out.push_str(rest);
    out
}

fn expand_home(value: &str) -> PathBuf {
    if let Some(stripped) = value.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(stripped);
    }
    PathBuf::from(value)
}

impl RotaConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path; a missing file is `Ok(None)`.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app
            .as_ref()
            .map(|app| UiOptions {
                ascii_only: app.ascii_only,
                high_contrast: app.high_contrast,
            })
            .unwrap_or_default()
    }

    fn configured_db_path(&self) -> Option<PathBuf> {
        let raw = self.store.as_ref()?.path.as_deref()?;
        let expanded = expand_env_vars(raw.trim());
        if expanded.is_empty() {
            return None;
        }
        Some(expand_home(&expanded))
    }
}

/// Database location: `ROTA_DB`, then `[store].path`, then
/// `~/.rota/students.db`, then `./students.db`.
#[must_use]
pub fn resolve_db_path(config: Option<&RotaConfig>) -> PathBuf {
    let from_env = env::var(DB_PATH_ENV).ok();
    resolve_db_path_with(from_env.as_deref(), config)
}

fn resolve_db_path_with(from_env: Option<&str>, config: Option<&RotaConfig>) -> PathBuf {
    if let Some(raw) = from_env.map(str::trim).filter(|raw| !raw.is_empty()) {
        return expand_home(raw);
    }
    if let Some(path) = config.and_then(RotaConfig::configured_db_path) {
        return path;
    }
    rota_dir().map_or_else(
        || PathBuf::from(DEFAULT_DB_FILE),
        |dir| dir.join(DEFAULT_DB_FILE),
    )
}

#[must_use]
pub fn rota_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".rota"))
}

pub fn config_path() -> Option<PathBuf> {
    rota_dir().map(|dir| dir.join("config.toml"))
}
