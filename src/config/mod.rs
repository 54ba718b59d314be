mod basic;
mod sheets;
mod telegram;

pub use basic::BasicConfig;
pub use sheets::{AuthStrategy, SheetsConfig};
pub use telegram::TelegramConfig;

use crate::error::FnotifierError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Environment files consulted before the figment is built, in order of preference.
const ENV_FILES: [&str; 2] = [".env.local", ".env"];

/// Prefix for nested overrides, e.g. `FNOTIFIER_SHEETS__RANGE`.
const ENV_PREFIX: &str = "FNOTIFIER_";

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Telegram bot settings (see `telegram` table in config.toml).
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Spreadsheet target and OAuth settings (see `sheets` table in config.toml).
    #[serde(default)]
    pub sheets: SheetsConfig,
}

impl Config {
    /// Builds a Figment that merges defaults, an optional TOML file and the environment.
    ///
    /// `TG_BOT_TOKEN` and `DB_URL` keep working for deployments that predate the TOML file.
    pub fn figment(config_file: &Path) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if config_file.is_file() {
            figment = figment.merge(Toml::file(config_file));
        }
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&["TG_BOT_TOKEN", "DB_URL"])
                    .map(|key| legacy_env_key(key.as_str()).into()),
            )
    }

    /// Loads `.env.local` (or `.env`) into the process environment, then extracts and
    /// validates the configuration.
    pub fn load() -> Result<Self, FnotifierError> {
        load_env_file();
        let cfg: Self = Self::figment(&PathBuf::from(DEFAULT_CONFIG_FILE))
            .extract()
            .map_err(|e| FnotifierError::Config(format!("failed to extract configuration: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects configurations the service cannot start with.
    pub fn validate(&self) -> Result<(), FnotifierError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(FnotifierError::Config(
                "telegram.bot_token (TG_BOT_TOKEN) must be set and non-empty".to_string(),
            ));
        }
        if self.sheets.spreadsheet_id.trim().is_empty() {
            return Err(FnotifierError::Config(
                "sheets.spreadsheet_id must be set and non-empty".to_string(),
            ));
        }
        if self.sheets.range.trim().is_empty() {
            return Err(FnotifierError::Config(
                "sheets.range must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn legacy_env_key(key: &str) -> String {
    if key.eq_ignore_ascii_case("TG_BOT_TOKEN") {
        "telegram.bot_token".to_string()
    } else if key.eq_ignore_ascii_case("DB_URL") {
        "basic.database_url".to_string()
    } else {
        key.to_string()
    }
}

fn load_env_file() {
    for file in ENV_FILES {
        match dotenvy::from_filename(file) {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded environment file");
                return;
            }
            Err(e) if e.not_found() => continue,
            Err(e) => {
                tracing::warn!(file, error = %e, "Failed to parse environment file");
                return;
            }
        }
    }
}
