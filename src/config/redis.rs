//! Redis configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Redis connection used for the job queues and domain event publishing.
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    pub url: String,

    /// Optional namespace prepended to queue keys and pub/sub channels,
    /// so several deployments can share one Redis.
    #[serde(default)]
    pub key_prefix: Option<String>,
}

impl RedisConfig {
    /// Key prefix, ignoring a blank value.
    pub fn key_prefix(&self) -> Option<&str> {
        self.key_prefix
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Validate Redis configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("REDIS__URL"));
        }
        if !self.url.starts_with("redis://") && !self.url.starts_with("rediss://") {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}
