//! Configuration types
//!
//! Board-agnostic frame configuration, stored as postcard binary data
//! when the `serde` feature is enabled.

pub mod frame;

pub use frame::*;
