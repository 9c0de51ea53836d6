//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (ids, timestamps, events, errors)
//! - `billing` - Billing provider events and processing errors
//! - `subscription` - Plans, user subscription state and transitions
//! - `coupon` - Coupon attribution rules and the usage report window
//! - `charge` - Charge ledger records

pub mod billing;
pub mod charge;
pub mod coupon;
pub mod foundation;
pub mod subscription;
