//! Subscriber attribute client for the billing provider's REST API.
//!
//! Clears the deprecated `referralCodeUsed` attribute once a purchase has
//! consumed it:
//!
//! ```text
//! POST {base}/v1/subscribers/{user_id}/attributes
//! Authorization: Bearer <api key>
//!
//! { "attributes": { "referralCodeUsed": { "value": null, "updated_at_ms": <now> } } }
//! ```
//!
//! Failures are logged and swallowed; the attribute expires on its own
//! after the legacy window anyway.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value as JsonValue};

use crate::config::BillingConfig;
use crate::domain::billing::REFERRAL_CODE_USED_ATTRIBUTE;
use crate::domain::foundation::{Timestamp, UserId};
use crate::ports::SubscriberAttributeClient;

/// reqwest-backed [`SubscriberAttributeClient`].
pub struct RevenueCatAttributeClient {
    api_key: SecretString,
    base_url: String,
    http_client: reqwest::Client,
}

impl RevenueCatAttributeClient {
    pub fn new(
        api_key: SecretString,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            base_url: base_url.into(),
            http_client,
        })
    }

    pub fn from_config(config: &BillingConfig) -> Result<Self, reqwest::Error> {
        Self::new(
            config.provider_api_key.clone(),
            config.provider_base_url(),
            Duration::from_secs(config.provider_timeout_secs),
        )
    }

    /// `{base}/v1/subscribers/{user_id}/attributes`, with the user id
    /// percent-encoded as a single path segment.
    fn attributes_url(&self, user_id: &UserId) -> Result<reqwest::Url, String> {
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|e| e.to_string())?;
        url.path_segments_mut()
            .map_err(|_| format!("{} cannot be a base URL", self.base_url))?
            .pop_if_empty()
            .extend(["v1", "subscribers", user_id.as_str(), "attributes"]);
        Ok(url)
    }
}

fn clear_attribute_body(now: Timestamp) -> JsonValue {
    json!({
        "attributes": {
            REFERRAL_CODE_USED_ATTRIBUTE: {
                "value": null,
                "updated_at_ms": now.as_unix_millis(),
            }
        }
    })
}

#[async_trait]
impl SubscriberAttributeClient for RevenueCatAttributeClient {
    async fn clear_referral_attribute(&self, user_id: &UserId) {
        let url = match self.attributes_url(user_id) {
            Ok(url) => url,
            Err(error) => {
                tracing::error!(%user_id, %error, "Invalid billing provider URL");
                return;
            }
        };

        let result = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&clear_attribute_body(Timestamp::now()))
            .send()
            .await
            .and_then(|response| response.error_for_status());

        match result {
            Ok(_) => tracing::debug!(%user_id, "Cleared referral code attribute"),
            Err(error) => tracing::error!(
                %user_id,
                status = error.status().map(|s| s.as_u16()),
                %error,
                "Failed to clear referral code attribute"
            ),
        }
    }
}
