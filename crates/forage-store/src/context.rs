use std::sync::Arc;

use forage_types::StoreConfig;
use serde_json::{Map, Value};

use crate::codec::Codec;

/// Per-store state computed once at initialization.
///
/// Immutable after construction. Every physical key this store touches is
/// `key_prefix + logical key`.
#[derive(Clone)]
pub struct StoreContext {
    name: String,
    store_name: String,
    key_prefix: String,
    options: Map<String, Value>,
    codec: Arc<dyn Codec>,
}

impl StoreContext {
    /// Build the context for `config`, attaching `codec`.
    pub fn new(config: &StoreConfig, codec: Arc<dyn Codec>) -> Self {
        Self {
            name: config.name.clone(),
            store_name: config.store_name.clone(),
            key_prefix: key_prefix(config),
            options: config.to_options(),
            codec,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    /// Every configuration option the store was initialized with.
    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn codec(&self) -> &dyn Codec {
        self.codec.as_ref()
    }

    /// The physical key for a logical key.
    pub fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    /// Returns `true` if the physical key lies inside this store.
    pub fn owns(&self, physical: &str) -> bool {
        physical.starts_with(&self.key_prefix)
    }

    /// The logical key for a physical key of this store.
    pub fn logical_key<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical.strip_prefix(self.key_prefix.as_str())
    }

    /// Drop the first `key_prefix`-length characters of any physical key,
    /// whether or not it belongs to this store.
    pub fn strip_prefix_len(&self, physical: &str) -> String {
        match self.logical_key(physical) {
            Some(logical) => logical.to_string(),
            None => physical
                .chars()
                .skip(self.key_prefix.chars().count())
                .collect(),
        }
    }
}

impl std::fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreContext")
            .field("name", &self.name)
            .field("store_name", &self.store_name)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

/// `"<name>/"`, extended to `"<name>/<storeName>/"` for a non-default store
/// name.
///
/// ```
/// use forage_store::key_prefix;
/// use forage_types::StoreConfig;
///
/// assert_eq!(key_prefix(&StoreConfig::new("app")), "app/");
/// assert_eq!(key_prefix(&StoreConfig::new("app").with_store_name("notes")), "app/notes/");
/// ```
pub fn key_prefix(config: &StoreConfig) -> String {
    let mut prefix = format!("{}/", config.name);
    if config.has_custom_store_name() {
        prefix.push_str(&config.store_name);
        prefix.push('/');
    }
    prefix
}
