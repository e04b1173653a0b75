//! High-level SDK for Forage.
//!
//! Binds a [`StorageDriver`](forage_store::StorageDriver) to its store
//! configuration and makes sure the store is initialized before anything
//! else runs. This is the main entry point for applications embedding Forage.

pub mod bridge;
pub mod error;
pub mod instance;

pub use bridge::execute_callback;
pub use error::{SdkError, SdkResult};
pub use instance::Forage;

// Re-export key types
pub use forage_store::{MemoryDriver, SharedTable, StorageDriver};
pub use forage_types::{RawKey, StoreConfig};
