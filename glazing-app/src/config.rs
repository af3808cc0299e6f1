//! TOML settings for the `glazing` binary.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "glazing.db"
//!
//! [pricing]
//! delay_ms = 1500
//! price_table_csv = "prices.csv"
//!
//! [chat]
//! model = "gemini-3-flash-preview"
//! timeout_secs = 30
//!
//! [logging]
//! level = "info"
//! file = "glazing.log"
//! ```
//!
//! Every section and key is optional. The chat API key is read from the
//! environment only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use glazing_chat::ChatConfig;
use glazing_core::db::DbConfig;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_CONFIG_FILE: &str = "glazing.toml";
pub const API_KEY_VARS: [&str; 2] = ["GLAZING_GEMINI_API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(deserialize_with = "database_section")]
    pub database: DbConfig,
    pub pricing: PricingSettings,
    pub chat: ChatSettings,
    pub logging: LoggingSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: default_database(),
            pricing: PricingSettings::default(),
            chat: ChatSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

fn default_database() -> DbConfig {
    DbConfig {
        backend: "sqlite".to_string(),
        connection_string: "glazing.db".to_string(),
    }
}

/// `[database]` with any key omitted falls back to [`default_database`],
/// not to the in-memory [`DbConfig::default`].
fn database_section<'de, D>(deserializer: D) -> Result<DbConfig, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Section {
        backend: Option<String>,
        connection_string: Option<String>,
    }

    let section = Section::deserialize(deserializer)?;
    let fallback = default_database();
    Ok(DbConfig {
        backend: section.backend.unwrap_or(fallback.backend),
        connection_string: section
            .connection_string
            .unwrap_or(fallback.connection_string),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Simulated backend latency.
    pub delay_ms: u64,
    /// Optional CSV overriding stored and built-in unit prices.
    pub price_table_csv: Option<PathBuf>,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            delay_ms: 1500,
            price_table_csv: None,
        }
    }
}

impl PricingSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: ChatConfig::DEFAULT_MODEL.to_string(),
            base_url: ChatConfig::DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

impl ChatSettings {
    pub fn to_chat_config(
        &self,
        api_key: String,
    ) -> ChatConfig {
        ChatConfig {
            api_key,
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Bare level or any `EnvFilter` directive. `RUST_LOG` wins when set.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Invalid settings")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::from_toml_str(&text)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// An explicit path must exist. Without one, `glazing.toml` in the
    /// working directory is used if present, otherwise defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// First non-blank key among [`API_KEY_VARS`], looked up through `lookup`.
pub fn api_key_from<F>(lookup: F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}

pub fn chat_api_key() -> Option<String> {
    api_key_from(|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    // =========================================================================
    // parsing
    // =========================================================================

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn defaults_point_at_local_sqlite_file() {
        let settings = Settings::default();

        assert_eq!(settings.database.backend, "sqlite");
        assert_eq!(settings.database.connection_string, "glazing.db");
        assert_eq!(settings.pricing.delay(), Duration::from_millis(1500));
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            [pricing]
            delay_ms = 0
            price_table_csv = "prices.csv"

            [chat]
            timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(settings.pricing.delay(), Duration::ZERO);
        assert_eq!(
            settings.pricing.price_table_csv,
            Some(PathBuf::from("prices.csv"))
        );
        assert_eq!(settings.chat.timeout_secs, 5);
        assert_eq!(settings.chat.model, ChatConfig::DEFAULT_MODEL);
        assert_eq!(settings.database, Settings::default().database);
    }

    #[test]
    fn partial_database_section_keeps_file_store() {
        let settings = Settings::from_toml_str("[database]\nbackend = \"sqlite\"\n").unwrap();

        assert_eq!(settings.database.backend, "sqlite");
        assert_eq!(settings.database.connection_string, "glazing.db");
    }

    #[test]
    fn database_section_overrides_connection_string_only() {
        let settings =
            Settings::from_toml_str("[database]\nconnection_string = \"leads.db\"\n").unwrap();

        assert_eq!(settings.database.backend, "sqlite");
        assert_eq!(settings.database.connection_string, "leads.db");
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(Settings::from_toml_str("[pricing]\ndelay_ms = \"soon\"").is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nconnection_string = \":memory:\"").unwrap();

        let settings = Settings::load(file.path()).unwrap();

        assert_eq!(settings.database.connection_string, ":memory:");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(Settings::load_or_default(Some(Path::new("/nonexistent/glazing.toml"))).is_err());
    }

    #[test]
    fn chat_settings_build_client_config() {
        let config = ChatSettings::default().to_chat_config("k".to_string());

        assert_eq!(config.api_key, "k");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    // =========================================================================
    // API key lookup
    // =========================================================================

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn app_specific_key_wins() {
        let vars = env(&[("GLAZING_GEMINI_API_KEY", "app"), ("GEMINI_API_KEY", "generic")]);

        assert_eq!(api_key_from(|k| vars.get(k).cloned()), Some("app".to_string()));
    }

    #[test]
    fn blank_key_falls_through() {
        let vars = env(&[("GLAZING_GEMINI_API_KEY", "  "), ("GEMINI_API_KEY", "generic")]);

        assert_eq!(
            api_key_from(|k| vars.get(k).cloned()),
            Some("generic".to_string())
        );
    }

    #[test]
    fn no_key_is_none() {
        assert_eq!(api_key_from(|_| None), None);
    }
}
