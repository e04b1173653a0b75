//! Foundation types for Forage.
//!
//! Forage exposes asynchronous key/value stores that share one in-memory
//! table per process. This crate holds the small, dependency-light types
//! every other Forage crate builds on.
//!
//! # Key Types
//!
//! - [`RawKey`] -- Caller-supplied key, coerced to a logical key string
//! - [`StoreConfig`] -- Per-store configuration (name, store name, options)
//! - [`is_truthy`] -- Truthiness rule used to decide which stored values get decoded
//! - [`TypeError`] -- Configuration errors

pub mod config;
pub mod error;
pub mod key;
pub mod value;

pub use config::{StoreConfig, DEFAULT_NAME, DEFAULT_STORE_NAME};
pub use error::TypeError;
pub use key::RawKey;
pub use value::{float_to_display_string, is_truthy, to_display_string};
