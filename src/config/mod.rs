//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `SUBSCRIPTION_EVENTS` prefix; nested values use `__` as separator.
//!
//! # Example
//!
//! ```no_run
//! use subscription_events::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod billing;
mod coupons;
mod database;
mod error;
mod jobs;
mod redis;
mod server;

pub use billing::BillingConfig;
pub use coupons::CouponsConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use jobs::JobsConfig;
pub use redis::RedisConfig;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, deployment environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub redis: RedisConfig,

    /// Webhook token and provider API credentials
    pub billing: BillingConfig,

    #[serde(default)]
    pub coupons: CouponsConfig,

    #[serde(default)]
    pub jobs: JobsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `SUBSCRIPTION_EVENTS__*`
    /// variables:
    ///
    /// - `SUBSCRIPTION_EVENTS__SERVER__ENVIRONMENT=production` -> `server.environment`
    /// - `SUBSCRIPTION_EVENTS__COUPONS__REFERRAL_GROUPS=A,B` -> `coupons.referral_groups`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or a value
    /// cannot be parsed into its expected type.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("SUBSCRIPTION_EVENTS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.billing.validate(self.is_production())?;
        self.coupons.validate()?;
        self.jobs.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::DeploymentEnvironment;
    use secrecy::ExposeSecret;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "SUBSCRIPTION_EVENTS__DATABASE__URL",
        "SUBSCRIPTION_EVENTS__REDIS__URL",
        "SUBSCRIPTION_EVENTS__BILLING__WEBHOOK_AUTH_TOKEN",
        "SUBSCRIPTION_EVENTS__BILLING__PROVIDER_API_KEY",
        "SUBSCRIPTION_EVENTS__SERVER__PORT",
        "SUBSCRIPTION_EVENTS__SERVER__ENVIRONMENT",
        "SUBSCRIPTION_EVENTS__COUPONS__REFERRAL_GROUPS",
        "SUBSCRIPTION_EVENTS__COUPONS__REFERENCE_UTC_OFFSET_HOURS",
    ];

    fn set_minimal_env() {
        env::set_var(
            "SUBSCRIPTION_EVENTS__DATABASE__URL",
            "postgresql://test@localhost/subscriptions",
        );
        env::set_var("SUBSCRIPTION_EVENTS__REDIS__URL", "redis://localhost:6379");
        env::set_var("SUBSCRIPTION_EVENTS__BILLING__WEBHOOK_AUTH_TOKEN", "hook-token");
        env::set_var("SUBSCRIPTION_EVENTS__BILLING__PROVIDER_API_KEY", "sk_test_xxx");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    fn load_with(extra: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        set_minimal_env();
        for (key, value) in extra {
            env::set_var(key, value);
        }
        let result = AppConfig::load();
        clear_env();
        result
    }

    #[test]
    fn test_load_from_environment() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/subscriptions");
        assert_eq!(config.redis.url, "redis://localhost:6379");
        assert_eq!(config.billing.webhook_auth_token.expose_secret(), "hook-token");
    }

    #[test]
    fn test_validate_full_config() {
        let config = load_with(&[]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = load_with(&[]).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, DeploymentEnvironment::Development);
        assert_eq!(config.coupons.legacy_referral_window_hours, 2);
        assert_eq!(config.coupons.reference_utc_offset_hours, -3);
        assert_eq!(config.jobs.coupon_usage_job_name, "coupon-usage-report");
    }

    #[test]
    fn test_is_production() {
        let config = load_with(&[("SUBSCRIPTION_EVENTS__SERVER__ENVIRONMENT", "production")])
            .unwrap();
        assert!(config.is_production());
    }

    #[test]
    fn test_custom_values() {
        let config = load_with(&[
            ("SUBSCRIPTION_EVENTS__SERVER__PORT", "3000"),
            ("SUBSCRIPTION_EVENTS__COUPONS__REFERRAL_GROUPS", "INFLUENCER,PARTNER"),
            ("SUBSCRIPTION_EVENTS__COUPONS__REFERENCE_UTC_OFFSET_HOURS", "0"),
        ])
        .unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.coupons.referral_groups().contains("PARTNER"));
        assert_eq!(config.coupons.reference_offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_missing_billing_section_fails() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var(
            "SUBSCRIPTION_EVENTS__DATABASE__URL",
            "postgresql://test@localhost/subscriptions",
        );
        env::set_var("SUBSCRIPTION_EVENTS__REDIS__URL", "redis://localhost:6379");
        let result = AppConfig::load();
        clear_env();

        assert!(matches!(result, Err(ConfigError::LoadError(_))));
    }
}
