//! Billing provider webhook events.
//!
//! The provider posts `{ "event": { ... } }`. Only the fields the engine
//! consumes are modelled; the full object is kept verbatim in
//! [`BillingEvent::raw`] for the audit log.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

use crate::domain::foundation::Timestamp;

use super::BillingEventError;

/// Subscriber attribute naming a partner plan id explicitly.
pub const PLAN_PARTNER_ATTRIBUTE: &str = "planPartner";

/// Deprecated subscriber attribute older app versions write the referral code into.
pub const REFERRAL_CODE_USED_ATTRIBUTE: &str = "referralCodeUsed";

/// Event types delivered by the billing provider.
///
/// Types the engine does not act on are kept as `Unknown` so they can be
/// logged and acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BillingEventType {
    Cancellation,
    Uncancellation,
    Expiration,
    InitialPurchase,
    Renewal,
    Unknown(String),
}

impl BillingEventType {
    pub fn as_str(&self) -> &str {
        match self {
            BillingEventType::Cancellation => "CANCELLATION",
            BillingEventType::Uncancellation => "UNCANCELLATION",
            BillingEventType::Expiration => "EXPIRATION",
            BillingEventType::InitialPurchase => "INITIAL_PURCHASE",
            BillingEventType::Renewal => "RENEWAL",
            BillingEventType::Unknown(other) => other,
        }
    }
}

impl From<String> for BillingEventType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CANCELLATION" => BillingEventType::Cancellation,
            "UNCANCELLATION" => BillingEventType::Uncancellation,
            "EXPIRATION" => BillingEventType::Expiration,
            "INITIAL_PURCHASE" => BillingEventType::InitialPurchase,
            "RENEWAL" => BillingEventType::Renewal,
            _ => BillingEventType::Unknown(value),
        }
    }
}

impl From<BillingEventType> for String {
    fn from(value: BillingEventType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for BillingEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Provider environment an event was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingEnvironment {
    Sandbox,
    Production,
}

impl fmt::Display for BillingEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingEnvironment::Sandbox => write!(f, "SANDBOX"),
            BillingEnvironment::Production => write!(f, "PRODUCTION"),
        }
    }
}

/// Why a subscription was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CancelReason {
    Unsubscribe,
    BillingError,
    DeveloperInitiated,
    PriceIncrease,
    /// Refunded through customer support.
    CustomerSupport,
    Unknown,
    Other(String),
}

impl CancelReason {
    /// A support-initiated refund revokes access immediately.
    pub fn is_refund(&self) -> bool {
        matches!(self, CancelReason::CustomerSupport)
    }
}

impl From<String> for CancelReason {
    fn from(value: String) -> Self {
        match value.as_str() {
            "UNSUBSCRIBE" => CancelReason::Unsubscribe,
            "BILLING_ERROR" => CancelReason::BillingError,
            "DEVELOPER_INITIATED" => CancelReason::DeveloperInitiated,
            "PRICE_INCREASE" => CancelReason::PriceIncrease,
            "CUSTOMER_SUPPORT" => CancelReason::CustomerSupport,
            "UNKNOWN" => CancelReason::Unknown,
            _ => CancelReason::Other(value),
        }
    }
}

impl From<CancelReason> for String {
    fn from(value: CancelReason) -> Self {
        match value {
            CancelReason::Unsubscribe => "UNSUBSCRIBE".to_string(),
            CancelReason::BillingError => "BILLING_ERROR".to_string(),
            CancelReason::DeveloperInitiated => "DEVELOPER_INITIATED".to_string(),
            CancelReason::PriceIncrease => "PRICE_INCREASE".to_string(),
            CancelReason::CustomerSupport => "CUSTOMER_SUPPORT".to_string(),
            CancelReason::Unknown => "UNKNOWN".to_string(),
            CancelReason::Other(other) => other,
        }
    }
}

/// A single subscriber attribute as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SubscriberAttribute {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub updated_at_ms: Option<i64>,
}

impl SubscriberAttribute {
    /// Returns the value unless it is missing or blank.
    pub fn non_empty_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.trim().is_empty())
    }

    /// When the attribute was last written, if the provider reported it.
    pub fn updated_at(&self) -> Option<Timestamp> {
        self.updated_at_ms.and_then(Timestamp::from_unix_millis)
    }
}

/// Attributes the app attached to the subscriber at the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberAttributes(HashMap<String, SubscriberAttribute>);

impl SubscriberAttributes {
    pub fn new(attributes: HashMap<String, SubscriberAttribute>) -> Self {
        Self(attributes)
    }

    pub fn get(&self, name: &str) -> Option<&SubscriberAttribute> {
        self.0.get(name)
    }

    /// Partner plan id, when the purchase was made through a partner.
    pub fn plan_partner(&self) -> Option<&str> {
        self.get(PLAN_PARTNER_ATTRIBUTE)
            .and_then(SubscriberAttribute::non_empty_value)
    }

    /// Deprecated referral code attribute.
    pub fn referral_code_used(&self) -> Option<&SubscriberAttribute> {
        self.get(REFERRAL_CODE_USED_ATTRIBUTE)
    }
}

/// A normalized billing event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: BillingEventType,
    pub environment: BillingEnvironment,
    /// Empty for event types the provider sends without a subscriber, such as
    /// `TRANSFER`. Handlers that need a user reject the blank id.
    #[serde(rename = "app_user_id", default)]
    pub user_id: String,
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub purchased_at_ms: Option<i64>,
    #[serde(default)]
    pub cancel_reason: Option<CancelReason>,
    #[serde(default)]
    pub offer_code: Option<String>,
    #[serde(default)]
    pub subscriber_attributes: Option<SubscriberAttributes>,

    /// The event object exactly as delivered.
    #[serde(skip)]
    pub raw: JsonValue,
}

#[derive(Deserialize)]
struct WebhookBody {
    event: JsonValue,
}

impl BillingEvent {
    /// Parses a webhook request body of the form `{ "event": { ... } }`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the body is not JSON, has no `event`
    /// object, or the event is missing required fields.
    pub fn from_webhook_body(body: &[u8]) -> Result<Self, BillingEventError> {
        let body: WebhookBody = serde_json::from_slice(body)
            .map_err(|e| BillingEventError::invalid_payload(e.to_string()))?;
        Self::from_json(body.event)
    }

    /// Builds an event from the provider's event object.
    pub fn from_json(raw: JsonValue) -> Result<Self, BillingEventError> {
        let mut event: BillingEvent = serde_json::from_value(raw.clone())
            .map_err(|e| BillingEventError::invalid_payload(e.to_string()))?;
        event.raw = raw;
        Ok(event)
    }

    /// The incoming coupon group, if the purchase used an offer code.
    pub fn coupon_group(&self) -> Option<&str> {
        self.offer_code.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// When the purchase happened according to the provider.
    pub fn purchased_at(&self) -> Option<Timestamp> {
        self.purchased_at_ms.and_then(Timestamp::from_unix_millis)
    }

    pub fn plan_partner(&self) -> Option<&str> {
        self.subscriber_attributes
            .as_ref()
            .and_then(SubscriberAttributes::plan_partner)
    }

    pub fn referral_code_attribute(&self) -> Option<&SubscriberAttribute> {
        self.subscriber_attributes
            .as_ref()
            .and_then(SubscriberAttributes::referral_code_used)
    }
}
