//! Billing provider REST API adapter.

mod attribute_client;

pub use attribute_client::RevenueCatAttributeClient;
