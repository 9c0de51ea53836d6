//! Subscription Events - Billing provider webhook processing.
//!
//! Applies subscription lifecycle events (purchases, renewals,
//! cancellations, expirations) to user subscriptions, records charges with
//! their coupon attribution and fans out post-purchase notifications.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
