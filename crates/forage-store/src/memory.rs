use std::sync::Arc;

use async_trait::async_trait;
use forage_types::{is_truthy, RawKey, StoreConfig};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::codec::{Codec, JsonCodec};
use crate::context::StoreContext;
use crate::error::StoreResult;
use crate::table::SharedTable;
use crate::traits::{IterFn, StorageDriver};

/// Tag the memory driver reports through [`StorageDriver::driver_name`].
pub const MEMORY_DRIVER: &str = "windowStorage";

/// Store backed by a [`SharedTable`].
///
/// Many drivers can share one table; each sees only the keys under its own
/// prefix. Every operation first waits on the store's initialization, which
/// runs exactly once, either through [`StorageDriver::init_storage`] or on
/// first use with the configuration the driver was built with.
pub struct MemoryDriver {
    table: SharedTable,
    config: StoreConfig,
    codec: Arc<dyn Codec>,
    context: OnceCell<StoreContext>,
}

impl MemoryDriver {
    /// A driver over the process-wide table.
    pub fn new(config: StoreConfig) -> Self {
        Self::with_table(SharedTable::global(), config)
    }

    /// A driver over an explicit table.
    pub fn with_table(table: SharedTable, config: StoreConfig) -> Self {
        Self {
            table,
            config,
            codec: Arc::new(JsonCodec),
            context: OnceCell::new(),
        }
    }

    /// Replace the codec used by [`StorageDriver::iterate`].
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = codec;
        self
    }

    /// The table this driver reads and writes.
    pub fn table(&self) -> &SharedTable {
        &self.table
    }

    /// The configuration used when initialization is not given options.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The store context, once initialized.
    pub fn context(&self) -> Option<&StoreContext> {
        self.context.get()
    }

    /// Wait for initialization, running it with the driver's configuration if
    /// nobody has yet.
    pub async fn ready(&self) -> &StoreContext {
        self.context
            .get_or_init(|| async { self.build_context(&self.config) })
            .await
    }

    fn build_context(&self, config: &StoreConfig) -> StoreContext {
        let ctx = StoreContext::new(config, Arc::clone(&self.codec));
        debug!(
            name = %ctx.name(),
            store_name = %ctx.store_name(),
            key_prefix = %ctx.key_prefix(),
            "store initialized"
        );
        ctx
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl std::fmt::Debug for MemoryDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryDriver")
            .field("name", &self.config.name)
            .field("store_name", &self.config.store_name)
            .field("initialized", &self.context.initialized())
            .finish()
    }
}

#[async_trait]
impl StorageDriver for MemoryDriver {
    fn driver_name(&self) -> &'static str {
        MEMORY_DRIVER
    }

    async fn init_storage(&self, options: Option<StoreConfig>) -> StoreResult<()> {
        if let Some(ctx) = self.context.get() {
            debug!(key_prefix = %ctx.key_prefix(), "store already initialized");
            return Ok(());
        }
        let config = options.unwrap_or_else(|| self.config.clone());
        self.context
            .get_or_init(|| async { self.build_context(&config) })
            .await;
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        let ctx = self.ready().await;
        let removed = self.table.write(|data| {
            let keys: Vec<String> = data.keys().map(str::to_string).collect();
            let mut removed = 0usize;
            // Walk backwards over the snapshot; deletions never shift what is
            // left to visit.
            for key in keys.iter().rev() {
                if ctx.owns(key) {
                    data.remove(key);
                    removed += 1;
                }
            }
            removed
        });
        debug!(key_prefix = %ctx.key_prefix(), removed, "store cleared");
        Ok(())
    }

    async fn get_item(&self, key: RawKey) -> StoreResult<Option<Value>> {
        let key = key.coerce();
        let ctx = self.ready().await;
        Ok(self.table.get(&ctx.physical_key(&key)))
    }

    async fn iterate(&self, iterator: &mut IterFn<'_>) -> StoreResult<Option<Value>> {
        let ctx = self.ready().await;
        // Snapshot first so the callback never runs under the table lock.
        let entries: Vec<(String, Value)> = self.table.read(|data| {
            data.iter()
                .filter_map(|(physical, value)| {
                    ctx.logical_key(physical)
                        .map(|logical| (logical.to_string(), value.clone()))
                })
                .collect()
        });

        let mut iteration_number = 1u64;
        for (key, stored) in entries {
            // Falsy values (null, false, 0, "") skip the codec.
            let value = if is_truthy(&stored) {
                ctx.codec().deserialize(&stored)?
            } else {
                stored
            };
            let result = iterator(value, &key, iteration_number);
            iteration_number += 1;
            if result.is_some() {
                return Ok(result);
            }
        }
        Ok(None)
    }

    async fn key(&self, n: usize) -> StoreResult<Option<String>> {
        let ctx = self.ready().await;
        // Indexes the whole table, not just this store. A key from another
        // store at position `n` still has this store's prefix length cut off.
        let physical = self.table.read(|data| data.key_at(n).map(str::to_string));
        Ok(physical.map(|physical| ctx.strip_prefix_len(&physical)))
    }

    async fn keys(&self) -> StoreResult<Vec<String>> {
        let ctx = self.ready().await;
        Ok(self.table.read(|data| {
            data.keys()
                .filter_map(|physical| ctx.logical_key(physical))
                .map(str::to_string)
                .collect()
        }))
    }

    async fn remove_item(&self, key: RawKey) -> StoreResult<()> {
        let key = key.coerce();
        let ctx = self.ready().await;
        self.table.remove(&ctx.physical_key(&key));
        Ok(())
    }

    async fn set_item(&self, key: RawKey, value: Option<Value>) -> StoreResult<Value> {
        let key = key.coerce();
        let ctx = self.ready().await;
        let value = value.unwrap_or(Value::Null);
        self.table.insert(ctx.physical_key(&key), value.clone());
        Ok(value)
    }
}
