//! Charge domain module.

mod record;

pub use record::Charge;
