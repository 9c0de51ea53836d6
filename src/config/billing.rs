//! Billing provider configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;

/// Credentials and endpoints shared with the billing provider.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Bearer token the provider sends with every webhook delivery.
    pub webhook_auth_token: SecretString,

    /// Secret API key used to call the provider's REST API.
    pub provider_api_key: SecretString,

    #[serde(default = "default_provider_api_base_url")]
    pub provider_api_base_url: String,

    /// Timeout for calls to the provider's REST API
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,
}

impl BillingConfig {
    pub fn new(webhook_auth_token: impl Into<String>, provider_api_key: impl Into<String>) -> Self {
        Self {
            webhook_auth_token: SecretString::new(webhook_auth_token.into()),
            provider_api_key: SecretString::new(provider_api_key.into()),
            provider_api_base_url: default_provider_api_base_url(),
            provider_timeout_secs: default_provider_timeout(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn provider_base_url(&self) -> &str {
        self.provider_api_base_url.trim_end_matches('/')
    }

    /// Validate billing configuration.
    ///
    /// Production deployments must talk to the provider over HTTPS.
    pub fn validate(&self, is_production: bool) -> Result<(), ValidationError> {
        if self.webhook_auth_token.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("BILLING__WEBHOOK_AUTH_TOKEN"));
        }
        if self.provider_api_key.expose_secret().trim().is_empty() {
            return Err(ValidationError::MissingRequired("BILLING__PROVIDER_API_KEY"));
        }
        let url = self.provider_base_url();
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ValidationError::InvalidProviderUrl);
        }
        if is_production && !url.starts_with("https://") {
            return Err(ValidationError::ProviderUrlMustBeHttps);
        }
        if self.provider_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_provider_api_base_url() -> String {
    "https://api.revenuecat.com".to_string()
}

fn default_provider_timeout() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_default_endpoint() {
        let config = BillingConfig::new("hook-token", "sk_live");
        assert_eq!(config.provider_base_url(), "https://api.revenuecat.com");
        assert!(config.validate(true).is_ok());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let mut config = BillingConfig::new("hook-token", "sk_live");
        config.provider_api_base_url = "https://billing.example.com/".to_string();
        assert_eq!(config.provider_base_url(), "https://billing.example.com");
    }

    #[test]
    fn blank_webhook_token_is_rejected() {
        let config = BillingConfig::new("  ", "sk_live");
        assert_eq!(
            config.validate(false),
            Err(ValidationError::MissingRequired("BILLING__WEBHOOK_AUTH_TOKEN"))
        );
    }

    #[test]
    fn plain_http_only_allowed_outside_production() {
        let mut config = BillingConfig::new("hook-token", "sk_test");
        config.provider_api_base_url = "http://localhost:9000".to_string();
        assert!(config.validate(false).is_ok());
        assert_eq!(
            config.validate(true),
            Err(ValidationError::ProviderUrlMustBeHttps)
        );
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = BillingConfig::new("hook-token", "sk_live_abc");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hook-token"));
        assert!(!debug.contains("sk_live_abc"));
    }
}
