//! Event bus adapters.
//!
//! - `InMemoryEventBus` - In-process bus for tests and local runs
//!
//! The Redis publisher lives in `adapters::redis`.

mod in_memory;

pub use in_memory::InMemoryEventBus;
