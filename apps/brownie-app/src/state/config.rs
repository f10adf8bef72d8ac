//! # Application Configuration
//!
//! Configuration loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BROWNIE_*`)
//! 2. Config file (`--config <path>` or `brownie.toml` in the platform config dir)
//! 3. Defaults (this file)
//!
//! ## Example `brownie.toml`
//! ```toml
//! [store]
//! database_path = "/home/ana/brownies/brownie.db"
//!
//! [session]
//! owner_id = "11111111-1111-4111-8111-111111111111"
//!
//! [display]
//! currency_symbol = "R$"
//! currency_decimals = 2
//! top_customers_limit = 5
//! ```
//!
//! Read-only after loading, so no lock is needed.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use brownie_core::{Money, OwnerId, TOP_CUSTOMERS_LIMIT};

/// Name of the config file looked up in the platform config dir.
pub const CONFIG_FILE_NAME: &str = "brownie.toml";

/// Database file name inside the platform data dir.
const DATABASE_FILE_NAME: &str = "brownie.db";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Could not determine the platform data directory")]
    NoDataDir,
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
}

/// Where records are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite file. Default: `brownie.db` in the platform data dir.
    pub database_path: Option<PathBuf>,
}

/// Which owner to sign in as at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub owner_id: Option<String>,
}

/// How amounts and reports are shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Number of decimal places shown: 2 (centavos) or 0 (whole reais)
    pub currency_decimals: u8,

    /// Entries in the top-customers report
    pub top_customers_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            currency_symbol: "R$".to_string(),
            currency_decimals: 2,
            top_customers_limit: TOP_CUSTOMERS_LIMIT,
        }
    }
}

impl DisplayConfig {
    /// Formats an amount with the configured symbol and precision.
    ///
    /// ## Example
    /// ```rust,ignore
    /// config.format_currency(Money::from_cents(123456)) // "R$ 1.234,56"
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        if self.currency_decimals == 0 {
            let whole = Money::from_cents(amount.per_unit(100).cents() * 100);
            let formatted = whole.format_with(&self.currency_symbol);
            return formatted
                .strip_suffix(",00")
                .map(str::to_string)
                .unwrap_or(formatted);
        }
        amount.format_with(&self.currency_symbol)
    }
}

impl AppConfig {
    /// Loads configuration from file and environment.
    ///
    /// An explicit path must exist. Without one, the platform config dir is
    /// checked and a missing file just means defaults. Nothing is validated
    /// here: command-line flags still apply on top, so callers run
    /// [`AppConfig::validate`] once every layer is in.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    AppConfig::default()
                }
            },
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config file");
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Applies `BROWNIE_*` overrides.
    ///
    /// ## Environment Variables
    /// - `BROWNIE_DB_PATH`: database file
    /// - `BROWNIE_OWNER_ID`: owner to sign in as
    /// - `BROWNIE_CURRENCY_SYMBOL`: display symbol
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("BROWNIE_DB_PATH") {
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Some(owner) = lookup("BROWNIE_OWNER_ID") {
            self.session.owner_id = Some(owner);
        }

        if let Some(symbol) = lookup("BROWNIE_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }
    }

    /// Checks values that serde alone cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.display.currency_symbol.trim().is_empty() {
            return Err(ConfigError::invalid("display.currency_symbol", "must not be empty"));
        }

        if !matches!(self.display.currency_decimals, 0 | 2) {
            return Err(ConfigError::invalid(
                "display.currency_decimals",
                "must be 0 or 2",
            ));
        }

        if !(1..=50).contains(&self.display.top_customers_limit) {
            return Err(ConfigError::invalid(
                "display.top_customers_limit",
                "must be between 1 and 50",
            ));
        }

        self.owner()?;
        Ok(())
    }

    /// The configured owner, if any.
    pub fn owner(&self) -> Result<Option<OwnerId>, ConfigError> {
        match self.session.owner_id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => OwnerId::parse(raw)
                .map(Some)
                .map_err(|e| ConfigError::invalid("session.owner_id", e.to_string())),
        }
    }

    /// Resolves the database file, creating the data dir when defaulted.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.store.database_path {
            return Ok(path.clone());
        }

        let dirs = project_dirs().ok_or(ConfigError::NoDataDir)?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Io {
            path: data_dir.to_path_buf(),
            source,
        })?;

        Ok(data_dir.join(DATABASE_FILE_NAME))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "brownie-book", "brownie-book")
}

/// `brownie.toml` in the platform config dir.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.display.currency_symbol, "R$");
        assert_eq!(config.display.currency_decimals, 2);
        assert_eq!(config.display.top_customers_limit, 5);
        assert!(config.validate().is_ok());
        assert_eq!(config.owner().unwrap(), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [display]
            top_customers_limit = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.display.top_customers_limit, 3);
        assert_eq!(config.display.currency_symbol, "R$");
        assert_eq!(config.store.database_path, None);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = AppConfig::from_toml(
            r#"
            [store]
            database_path = "/tmp/from-file.db"
            "#,
        )
        .unwrap();

        let env: HashMap<&str, &str> = [
            ("BROWNIE_DB_PATH", "/tmp/from-env.db"),
            ("BROWNIE_OWNER_ID", "11111111-1111-4111-8111-111111111111"),
            ("BROWNIE_CURRENCY_SYMBOL", "US$"),
        ]
        .into_iter()
        .collect();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/from-env.db"));
        assert_eq!(config.display.currency_symbol, "US$");
        assert!(config.owner().unwrap().is_some());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.display.currency_decimals = 3;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid { .. })));

        let mut config = AppConfig::default();
        config.session.owner_id = Some("not-a-uuid".to_string());
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.display.top_customers_limit = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blank_owner_means_signed_out() {
        let mut config = AppConfig::default();
        config.session.owner_id = Some("  ".to_string());
        assert_eq!(config.owner().unwrap(), None);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/brownie.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_defers_validation() {
        let path = std::env::temp_dir().join(format!("brownie-{}-load.toml", std::process::id()));
        std::fs::write(&path, "[session]\nowner_id = \"not-a-uuid\"\n").unwrap();

        let loaded = AppConfig::load(Some(&path));
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_format_currency() {
        let display = DisplayConfig::default();
        assert_eq!(display.format_currency(Money::from_cents(123456)), "R$ 1.234,56");

        let whole = DisplayConfig {
            currency_decimals: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(whole.format_currency(Money::from_cents(123456)), "R$ 1.235");
        assert_eq!(whole.format_currency(Money::from_cents(-550)), "-R$ 6");
    }
}
