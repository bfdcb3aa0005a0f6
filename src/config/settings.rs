//! Application settings loaded from config.toml with environment overrides.
//!
//! Every field has a default so the service starts with no config file at all.
//! Secrets (the language-model API key) are deliberately not part of [`Settings`];
//! they are read from the environment right before use.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Top-level settings structure mirroring config.toml
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// `[server]` table
    pub server: ServerSettings,
    /// `[database]` table
    pub database: DatabaseSettings,
    /// `[analytics]` table
    pub analytics: AnalyticsSettings,
    /// `[payments]` table
    pub payments: PaymentSettings,
    /// Optional TOML file with users and listings to seed on start-up
    pub seed_file: Option<String>,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to listen on
    pub bind_address: String,
    /// TCP port
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Database location
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// `SeaORM` connection URL
    pub url: String,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// Revenue analysis and advisory generator settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyticsSettings {
    /// Chat model used for insights and recommendations
    pub model: String,
    /// Base URL of an OpenAI-compatible API
    pub api_base_url: String,
    /// Sampling temperature, 0-2
    pub temperature: f32,
    /// Request timeout for advisory calls, in seconds
    pub request_timeout_secs: u64,
    /// Wrap insight rotation and the metric insert in one database transaction
    pub atomic_snapshots: bool,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            request_timeout_secs: 60,
            atomic_snapshots: true,
        }
    }
}

/// Payment split settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    /// Marketplace commission taken from every sale, in percent
    pub commission_percentage: f64,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            commission_percentage: 10.0,
        }
    }
}

impl Settings {
    /// Checks value ranges that the TOML types alone cannot express.
    pub fn validate(&self) -> Result<()> {
        let pct = self.payments.commission_percentage;
        if !(0.0..=100.0).contains(&pct) {
            return Err(Error::Config {
                message: format!("commission_percentage must be within 0-100, got {pct}"),
            });
        }
        let temperature = self.analytics.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(Error::Config {
                message: format!("temperature must be within 0-2, got {temperature}"),
            });
        }
        Ok(())
    }
}

/// Parses and validates settings from a TOML string.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse settings: {e}"),
    })?;
    settings.validate()?;
    Ok(settings)
}

/// Loads settings from `path`, falling back to defaults when the file does not exist.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        debug!("No settings file at {:?}, using defaults", path_ref);
        return Ok(Settings::default());
    }

    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read settings file {path_ref:?}: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads ./config.toml (if any) and applies environment overrides.
pub fn load_app_settings() -> Result<Settings> {
    let mut settings = load_settings("config.toml")?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

/// Applies overrides using `lookup` to read variables, so tests can supply a fake environment.
pub fn apply_env_overrides<F>(settings: &mut Settings, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        settings.database.url = url;
    }
    if let Some(addr) = lookup("BIND_ADDRESS") {
        settings.server.bind_address = addr;
    }
    if let Some(port) = lookup("PORT") {
        settings.server.port = port.parse().map_err(|_| Error::Config {
            message: format!("PORT must be a valid port number, got '{port}'"),
        })?;
    }
    if let Some(model) = lookup("OPENAI_MODEL") {
        settings.analytics.model = model;
    }
    if let Some(base) = lookup("OPENAI_BASE_URL") {
        settings.analytics.api_base_url = base;
    }
    if let Some(atomic) = lookup("ATOMIC_SNAPSHOTS") {
        settings.analytics.atomic_snapshots = atomic.parse().map_err(|_| Error::Config {
            message: format!("ATOMIC_SNAPSHOTS must be true or false, got '{atomic}'"),
        })?;
    }
    if let Some(pct) = lookup("COMMISSION_PERCENTAGE") {
        settings.payments.commission_percentage = pct.parse().map_err(|_| Error::Config {
            message: format!("COMMISSION_PERCENTAGE must be a number, got '{pct}'"),
        })?;
    }
    if let Some(seed) = lookup("SEED_FILE") {
        settings.seed_file = Some(seed);
    }
    settings.validate()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_empty() -> Result<()> {
        let settings = parse_settings("")?;
        assert_eq!(settings.server.port, 3000);
        assert_eq!(settings.database.url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.analytics.model, "gpt-4o-mini");
        assert!(settings.analytics.atomic_snapshots);
        assert_eq!(settings.payments.commission_percentage, 10.0);
        assert!(settings.seed_file.is_none());
        Ok(())
    }

    #[test]
    fn test_parse_partial_file() -> Result<()> {
        let settings = parse_settings(
            r#"
            seed_file = "seed.toml"

            [server]
            port = 8080

            [analytics]
            atomic_snapshots = false
            temperature = 0.2
        "#,
        )?;
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.bind_address, "0.0.0.0");
        assert!(!settings.analytics.atomic_snapshots);
        assert_eq!(settings.analytics.model, "gpt-4o-mini");
        assert_eq!(settings.seed_file.as_deref(), Some("seed.toml"));
        Ok(())
    }

    #[test]
    fn test_parse_rejects_out_of_range_commission() {
        let result = parse_settings("[payments]\ncommission_percentage = 150.0");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_settings("[payments]\ncommission_percentage = -1.0");
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = parse_settings("[analytics]\ntemperature = 3.5");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("PORT", "9000"),
            ("OPENAI_MODEL", "gpt-4o"),
            ("ATOMIC_SNAPSHOTS", "false"),
            ("COMMISSION_PERCENTAGE", "12.5"),
        ]);
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |k| env.get(k).map(ToString::to_string))?;

        assert_eq!(settings.database.url, "sqlite::memory:");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.analytics.model, "gpt-4o");
        assert!(!settings.analytics.atomic_snapshots);
        assert_eq!(settings.payments.commission_percentage, 12.5);
        Ok(())
    }

    #[test]
    fn test_env_override_rejects_bad_values() {
        let mut settings = Settings::default();
        let result = apply_env_overrides(&mut settings, |k| {
            (k == "PORT").then(|| "not-a-port".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = apply_env_overrides(&mut settings, |k| {
            (k == "COMMISSION_PERCENTAGE").then(|| "150".to_string())
        });
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_missing_file_uses_defaults() -> Result<()> {
        let settings = load_settings("definitely/not/here/config.toml")?;
        assert_eq!(settings.server.port, 3000);
        Ok(())
    }
}
