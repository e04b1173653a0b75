//! Namespaced key/value drivers over a shared in-memory table.
//!
//! Many logical stores, each identified by a database name and an optional
//! store name, live side by side in one [`SharedTable`]. A store never sees
//! another store's entries because every logical key is stored under a
//! physical key built from the store's prefix:
//!
//! - `"<name>/"` for the default store name
//! - `"<name>/<storeName>/"` otherwise
//!
//! # Drivers
//!
//! All drivers implement the [`StorageDriver`] trait:
//!
//! - [`MemoryDriver`] -- prefix-namespaced store over a [`SharedTable`]
//!
//! # Design Rules
//!
//! 1. No operation touches the table before the store is initialized.
//! 2. Initialization runs exactly once per driver.
//! 3. `get_item` returns stored values verbatim; only `iterate` decodes them.
//! 4. Operations never fail with the default codec.
//! 5. Isolation rests entirely on prefix uniqueness.

pub mod codec;
pub mod context;
pub mod error;
pub mod memory;
pub mod table;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use codec::{Codec, JsonCodec};
pub use context::{key_prefix, StoreContext};
pub use error::{StoreError, StoreResult};
pub use memory::{MemoryDriver, MEMORY_DRIVER};
pub use table::{SharedTable, TableData};
pub use traits::{IterFn, StorageDriver};
