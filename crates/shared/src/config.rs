//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger engine tuning.
    #[serde(default)]
    pub ledger: LedgerConfig,
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

/// Thresholds used by the derived-metric views.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Utilization percentage at which budget alerts are emitted.
    #[serde(default = "default_alert_threshold")]
    pub budget_alert_threshold: Decimal,
    /// Projected utilization percentage at which a pre-transaction check warns.
    #[serde(default = "default_warning_threshold")]
    pub budget_warning_threshold: Decimal,
    /// Goals due within this many days are reported as due soon.
    #[serde(default = "default_due_soon_days")]
    pub goal_due_soon_days: i64,
    /// Goals due within this many days and below the progress floor are at risk.
    #[serde(default = "default_at_risk_days")]
    pub goal_at_risk_days: i64,
    /// Progress percentage below which a goal near its due date is at risk.
    #[serde(default = "default_at_risk_progress")]
    pub goal_at_risk_progress: Decimal,
}

fn default_alert_threshold() -> Decimal {
    Decimal::from(80)
}

fn default_warning_threshold() -> Decimal {
    Decimal::from(80)
}

fn default_due_soon_days() -> i64 {
    30
}

fn default_at_risk_days() -> i64 {
    60
}

fn default_at_risk_progress() -> Decimal {
    Decimal::from(50)
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            budget_alert_threshold: default_alert_threshold(),
            budget_warning_threshold: default_warning_threshold(),
            goal_due_soon_days: default_due_soon_days(),
            goal_at_risk_days: default_at_risk_days(),
            goal_at_risk_progress: default_at_risk_progress(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later overriding earlier: `config/default`, `config/{RUN_MODE}`,
    /// then `FINNIT__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("FINNIT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("FINNIT__DATABASE__URL", Some("sqlite::memory:")),
                ("FINNIT__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("FINNIT__LEDGER__GOAL_DUE_SOON_DAYS", Some("14")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 4);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.ledger.goal_due_soon_days, 14);
                assert_eq!(config.ledger.goal_at_risk_days, 60);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars_unset(["FINNIT__DATABASE__URL"], || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_ledger_defaults() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.budget_alert_threshold, dec!(80));
        assert_eq!(ledger.budget_warning_threshold, dec!(80));
        assert_eq!(ledger.goal_at_risk_progress, dec!(50));
    }
}
