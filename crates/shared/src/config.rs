//! Application configuration management.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::CurrencyCode;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Report generation settings.
    #[serde(default)]
    pub reports: ReportSettings,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// First day of a calendar week when bucketing weekly trends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Weeks run Sunday..Saturday.
    #[default]
    Sunday,
    /// Weeks run Monday..Sunday (ISO 8601).
    Monday,
}

impl WeekStart {
    /// Returns the matching chrono weekday.
    #[must_use]
    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    /// First day of week for weekly trend buckets.
    #[serde(default)]
    pub week_start: WeekStart,
    /// Largest |assets - (liabilities + equity)| still reported as balanced.
    #[serde(default = "default_balance_tolerance")]
    pub balance_tolerance: Decimal,
    /// Currency used when a company has none configured.
    #[serde(default)]
    pub default_currency: CurrencyCode,
    /// Maximum number of cached account balances.
    #[serde(default = "default_balance_cache_capacity")]
    pub balance_cache_capacity: u64,
    /// Time-to-live for cached account balances, in seconds.
    #[serde(default = "default_balance_cache_ttl")]
    pub balance_cache_ttl_secs: u64,
}

fn default_balance_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

fn default_balance_cache_capacity() -> u64 {
    10_000
}

fn default_balance_cache_ttl() -> u64 {
    300 // 5 minutes
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            week_start: WeekStart::default(),
            balance_tolerance: default_balance_tolerance(),
            default_currency: CurrencyCode::default(),
            balance_cache_capacity: default_balance_cache_capacity(),
            balance_cache_ttl_secs: default_balance_cache_ttl(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_filter() -> String {
    "tally=info,sea_orm=warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `TALLY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Loads `.env` (if present) and then the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load_with_dotenv() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_report_settings_defaults() {
        let settings = ReportSettings::default();
        assert_eq!(settings.week_start, WeekStart::Sunday);
        assert_eq!(settings.balance_tolerance, dec!(0.01));
        assert_eq!(settings.default_currency, CurrencyCode::USD);
        assert_eq!(settings.balance_cache_ttl_secs, 300);
    }

    #[test]
    fn test_week_start_weekday() {
        assert_eq!(WeekStart::Sunday.weekday(), Weekday::Sun);
        assert_eq!(WeekStart::Monday.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://tally@localhost/tally_test")),
                ("TALLY__REPORTS__WEEK_START", Some("monday")),
                ("TALLY__LOGGING__FILTER", Some("tally=debug")),
                ("RUN_MODE", Some("test-without-files")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.database.url, "postgres://tally@localhost/tally_test");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.reports.week_start, WeekStart::Monday);
                assert_eq!(config.reports.balance_tolerance, dec!(0.01));
                assert_eq!(config.logging.filter, "tally=debug");
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-without-files")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
