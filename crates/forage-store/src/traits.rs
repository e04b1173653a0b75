use async_trait::async_trait;
use forage_types::{RawKey, StoreConfig};
use serde_json::Value;

use crate::error::StoreResult;

/// Callback passed to [`StorageDriver::iterate`].
///
/// Receives the (possibly decoded) value, the logical key and a 1-based
/// iteration number. Returning `Some` stops iteration and makes that value the
/// overall result; `None` keeps scanning.
pub type IterFn<'a> = dyn FnMut(Value, &str, u64) -> Option<Value> + Send + 'a;

/// Key/value storage driver.
///
/// Every driver exposes the same nine operations so a hosting layer can pick
/// among them. All implementations must satisfy these invariants:
/// - No operation touches storage before initialization has completed.
/// - An operation only observes or mutates keys inside its own store.
/// - Reads of a missing key resolve to `Ok(None)`, never an error.
#[async_trait]
pub trait StorageDriver: Send + Sync {
    /// Tag identifying the driver.
    fn driver_name(&self) -> &'static str;

    /// Initialize the store. `None` uses the driver's own configuration.
    ///
    /// Initialization happens at most once; later calls resolve without
    /// changing anything.
    async fn init_storage(&self, options: Option<StoreConfig>) -> StoreResult<()>;

    /// Remove every key belonging to this store.
    async fn clear(&self) -> StoreResult<()>;

    /// Read the raw stored value for `key`. `Ok(None)` if never set.
    async fn get_item(&self, key: RawKey) -> StoreResult<Option<Value>>;

    /// Visit every entry of this store until the callback returns `Some`.
    async fn iterate(&self, iterator: &mut IterFn<'_>) -> StoreResult<Option<Value>>;

    /// The key at position `n`, or `Ok(None)` when out of range.
    async fn key(&self, n: usize) -> StoreResult<Option<String>>;

    /// Every logical key of this store, in enumeration order.
    async fn keys(&self) -> StoreResult<Vec<String>>;

    /// Number of keys in this store.
    async fn length(&self) -> StoreResult<usize> {
        Ok(self.keys().await?.len())
    }

    /// Delete `key`. Deleting an absent key is a no-op.
    async fn remove_item(&self, key: RawKey) -> StoreResult<()>;

    /// Store `value` under `key` and return what was stored.
    ///
    /// `None` (an undefined value) is stored as `Value::Null`.
    async fn set_item(&self, key: RawKey, value: Option<Value>) -> StoreResult<Value>;
}
