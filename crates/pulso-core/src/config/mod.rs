//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section implements `Default` so the engine can be
//! constructed without any configuration file at all.

pub mod analytics;
pub mod batching;
pub mod compliance;
pub mod delivery;
pub mod health;
pub mod logging;
pub mod store;

use serde::{Deserialize, Serialize};

use self::analytics::AnalyticsConfig;
use self::batching::BatchingConfig;
use self::compliance::ComplianceConfig;
use self::delivery::DeliveryConfig;
use self::health::HealthConfig;
use self::logging::LoggingConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Record store and cache settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Delivery engine settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,
    /// Batching and dispatch settings.
    #[serde(default)]
    pub batching: BatchingConfig,
    /// System health thresholds.
    #[serde(default)]
    pub health: HealthConfig,
    /// Content validation and encryption settings.
    #[serde(default)]
    pub compliance: ComplianceConfig,
    /// Analytics reporting settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `PULSO_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PULSO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_usable() {
        let config = AppConfig::default();
        assert_eq!(config.delivery.max_retries, 3);
        assert_eq!(config.batching.max_batch_size, 50);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.analytics.default_window_days, 30);
    }
}
