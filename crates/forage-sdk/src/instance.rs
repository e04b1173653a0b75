use std::sync::Arc;

use forage_store::{MemoryDriver, SharedTable, StorageDriver};
use forage_types::{RawKey, StoreConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::SdkResult;

/// A configured store instance.
///
/// Holds a driver and the configuration it is initialized with. The first
/// operation runs `init_storage` with that configuration; every operation
/// waits for it.
pub struct Forage {
    driver: Arc<dyn StorageDriver>,
    config: StoreConfig,
    ready: OnceCell<()>,
}

impl Forage {
    /// Bind `driver` to `config`.
    pub fn new(driver: Arc<dyn StorageDriver>, config: StoreConfig) -> Self {
        Self {
            driver,
            config,
            ready: OnceCell::new(),
        }
    }

    /// A memory-backed instance over the process-wide table.
    pub fn memory(config: StoreConfig) -> Self {
        Self::memory_in(SharedTable::global(), config)
    }

    /// A memory-backed instance over `table`.
    pub fn memory_in(table: SharedTable, config: StoreConfig) -> Self {
        let driver = MemoryDriver::with_table(table, config.clone());
        Self::new(Arc::new(driver), config)
    }

    /// Another instance on the same driver kind and table, with a different
    /// configuration.
    pub fn create_instance(table: &SharedTable, config: StoreConfig) -> Self {
        Self::memory_in(table.clone(), config)
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.driver_name()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn driver(&self) -> &Arc<dyn StorageDriver> {
        &self.driver
    }

    /// Initialize the driver with this instance's configuration, once.
    pub async fn ready(&self) -> SdkResult<()> {
        self.ready
            .get_or_try_init(|| async {
                debug!(
                    driver = self.driver.driver_name(),
                    name = %self.config.name,
                    store_name = %self.config.store_name,
                    "initializing driver"
                );
                self.driver.init_storage(Some(self.config.clone())).await
            })
            .await?;
        Ok(())
    }

    pub async fn get_item(&self, key: impl Into<RawKey>) -> SdkResult<Option<Value>> {
        self.ready().await?;
        Ok(self.driver.get_item(key.into()).await?)
    }

    /// Read a value and decode it into `T`. Missing keys and stored nulls
    /// both come back as `None`.
    pub async fn get<T: DeserializeOwned>(&self, key: impl Into<RawKey>) -> SdkResult<Option<T>> {
        match self.get_item(key).await? {
            None | Some(Value::Null) => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
        }
    }

    pub async fn set_item(
        &self,
        key: impl Into<RawKey>,
        value: impl Into<Value>,
    ) -> SdkResult<Value> {
        self.ready().await?;
        Ok(self.driver.set_item(key.into(), Some(value.into())).await?)
    }

    /// Store an undefined value. The driver records it as `null`.
    pub async fn set_undefined(&self, key: impl Into<RawKey>) -> SdkResult<Value> {
        self.ready().await?;
        Ok(self.driver.set_item(key.into(), None).await?)
    }

    /// Encode `value` with serde and store it.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        key: impl Into<RawKey>,
        value: &T,
    ) -> SdkResult<Value> {
        let value = serde_json::to_value(value)?;
        self.set_item(key, value).await
    }

    pub async fn remove_item(&self, key: impl Into<RawKey>) -> SdkResult<()> {
        self.ready().await?;
        Ok(self.driver.remove_item(key.into()).await?)
    }

    pub async fn clear(&self) -> SdkResult<()> {
        self.ready().await?;
        Ok(self.driver.clear().await?)
    }

    pub async fn key(&self, n: usize) -> SdkResult<Option<String>> {
        self.ready().await?;
        Ok(self.driver.key(n).await?)
    }

    pub async fn keys(&self) -> SdkResult<Vec<String>> {
        self.ready().await?;
        Ok(self.driver.keys().await?)
    }

    pub async fn length(&self) -> SdkResult<usize> {
        self.ready().await?;
        Ok(self.driver.length().await?)
    }

    /// Visit entries until `iterator` returns `Some`; see
    /// [`StorageDriver::iterate`].
    pub async fn iterate<F>(&self, mut iterator: F) -> SdkResult<Option<Value>>
    where
        F: FnMut(Value, &str, u64) -> Option<Value> + Send,
    {
        self.ready().await?;
        Ok(self.driver.iterate(&mut iterator).await?)
    }

    /// The first entry matching `predicate`, found through `iterate`'s early
    /// exit.
    pub async fn find<P>(&self, mut predicate: P) -> SdkResult<Option<(String, Value)>>
    where
        P: FnMut(&Value, &str) -> bool + Send,
    {
        let mut found = None;
        self.iterate(|value, key, _| {
            if predicate(&value, key) {
                found = Some((key.to_string(), value));
                return Some(Value::Bool(true));
            }
            None
        })
        .await?;
        Ok(found)
    }
}

impl std::fmt::Debug for Forage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forage")
            .field("driver", &self.driver.driver_name())
            .field("name", &self.config.name)
            .field("store_name", &self.config.store_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::execute_callback;
    use serde::Deserialize;
    use serde_json::json;

    fn instance(table: &SharedTable, store_name: &str) -> Forage {
        Forage::memory_in(table.clone(), StoreConfig::new("app").with_store_name(store_name))
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        pinned: bool,
    }

    #[tokio::test]
    async fn ready_initializes_driver() {
        let forage = instance(&SharedTable::new(), "notes");
        forage.ready().await.unwrap();
        forage.ready().await.unwrap();
        assert_eq!(forage.driver_name(), "windowStorage");
    }

    #[tokio::test]
    async fn crud_through_instance() {
        let table = SharedTable::new();
        let forage = instance(&table, "notes");
        forage.set_item("a", 1).await.unwrap();
        forage.set_item("b", "two").await.unwrap();
        assert_eq!(forage.get_item("a").await.unwrap(), Some(json!(1)));
        assert_eq!(forage.keys().await.unwrap(), vec!["a", "b"]);
        assert_eq!(forage.length().await.unwrap(), 2);
        assert_eq!(forage.key(1).await.unwrap(), Some("b".to_string()));

        forage.remove_item("a").await.unwrap();
        assert_eq!(forage.get_item("a").await.unwrap(), None);

        forage.clear().await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn set_undefined_reads_back_null() {
        let forage = instance(&SharedTable::new(), "notes");
        assert_eq!(forage.set_undefined("k").await.unwrap(), Value::Null);
        assert_eq!(forage.get_item("k").await.unwrap(), Some(Value::Null));
        assert_eq!(forage.get::<Note>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn typed_set_and_get() {
        let forage = instance(&SharedTable::new(), "notes");
        let note = Note {
            title: "groceries".into(),
            pinned: true,
        };
        forage.set("n1", &note).await.unwrap();
        assert_eq!(forage.get::<Note>("n1").await.unwrap(), Some(note));
        assert_eq!(forage.get::<Note>("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn typed_get_reports_shape_mismatch() {
        let forage = instance(&SharedTable::new(), "notes");
        forage.set_item("n", 5).await.unwrap();
        let err = forage.get::<Note>("n").await.unwrap_err();
        assert!(matches!(err, crate::SdkError::Serialization(_)));
    }

    #[tokio::test]
    async fn find_returns_first_match() {
        let forage = instance(&SharedTable::new(), "notes");
        forage.set_item("a", json!({"done": false})).await.unwrap();
        forage.set_item("b", json!({"done": true})).await.unwrap();
        forage.set_item("c", json!({"done": true})).await.unwrap();

        let found = forage
            .find(|value, _| value["done"] == json!(true))
            .await
            .unwrap();
        assert_eq!(found, Some(("b".to_string(), json!({"done": true}))));

        let none = forage.find(|_, key| key == "zzz").await.unwrap();
        assert_eq!(none, None);
    }

    #[tokio::test]
    async fn instances_share_a_table_without_colliding() {
        let table = SharedTable::new();
        let notes = instance(&table, "notes");
        let todos_config = StoreConfig::new("app").with_store_name("todos");
        let todos = Forage::create_instance(&table, todos_config);
        notes.set_item("a", 1).await.unwrap();
        todos.set_item("a", 2).await.unwrap();
        assert_eq!(notes.get_item("a").await.unwrap(), Some(json!(1)));
        assert_eq!(todos.get_item("a").await.unwrap(), Some(json!(2)));
        assert_eq!(table.len(), 2);
    }

    #[tokio::test]
    async fn callback_delivery() {
        let forage = instance(&SharedTable::new(), "notes");
        let mut delivered = None;
        let result = execute_callback(
            forage.set_item("a", 1),
            Some(|r: &SdkResult<Value>| delivered = r.as_ref().ok().cloned()),
        )
        .await
        .unwrap();
        assert_eq!(result, json!(1));
        assert_eq!(delivered, Some(json!(1)));
    }

    #[test]
    fn debug_format() {
        let forage = instance(&SharedTable::new(), "notes");
        let debug = format!("{forage:?}");
        assert!(debug.contains("windowStorage"));
        assert!(debug.contains("notes"));
    }
}
