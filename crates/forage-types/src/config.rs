use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TypeError;

/// Database name used when none is configured.
pub const DEFAULT_NAME: &str = "localforage";

/// Store name used when none is configured. A store using this name gets the
/// short `"<name>/"` key prefix.
pub const DEFAULT_STORE_NAME: &str = "keyvaluepairs";

/// Configuration for one logical store.
///
/// Unknown keys are kept in [`StoreConfig::extra`] so arbitrary options can
/// ride along into the store context.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreConfig {
    /// Database name. First segment of every physical key.
    pub name: String,
    /// Sub-store name within the database.
    pub store_name: String,
    /// Free-form description.
    pub description: String,
    /// Schema version, carried for parity with other drivers.
    pub version: f64,
    /// Advisory size in bytes. Not enforced by the in-memory driver.
    pub size: u64,
    /// Any other options, merged shallowly into the store context.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            store_name: DEFAULT_STORE_NAME.to_string(),
            description: String::new(),
            version: 1.0,
            size: 4_980_736,
            extra: Map::new(),
        }
    }
}

impl StoreConfig {
    /// Configuration for database `name` with the default store name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the sub-store name.
    pub fn with_store_name(mut self, store_name: impl Into<String>) -> Self {
        self.store_name = store_name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach an arbitrary option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns `true` when the store name differs from [`DEFAULT_STORE_NAME`].
    pub fn has_custom_store_name(&self) -> bool {
        self.store_name != DEFAULT_STORE_NAME
    }

    /// Parse a configuration from TOML. Missing fields take their defaults.
    ///
    /// ```
    /// use forage_types::StoreConfig;
    ///
    /// let config = StoreConfig::from_toml_str("name = \"app\"\nstoreName = \"notes\"").unwrap();
    /// assert_eq!(config.name, "app");
    /// assert_eq!(config.store_name, "notes");
    /// ```
    pub fn from_toml_str(input: &str) -> Result<Self, TypeError> {
        toml::from_str(input).map_err(|e| TypeError::Config(e.to_string()))
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, TypeError> {
        toml::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Flatten into a JSON object: the typed fields plus every extra option.
    pub fn to_options(&self) -> Map<String, Value> {
        let mut options = self.extra.clone();
        options.insert("name".into(), Value::String(self.name.clone()));
        options.insert("storeName".into(), Value::String(self.store_name.clone()));
        options.insert(
            "description".into(),
            Value::String(self.description.clone()),
        );
        options.insert("version".into(), Value::from(self.version));
        options.insert("size".into(), Value::from(self.size));
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_config() {
        let c = StoreConfig::default();
        assert_eq!(c.name, "localforage");
        assert_eq!(c.store_name, "keyvaluepairs");
        assert_eq!(c.description, "");
        assert_eq!(c.version, 1.0);
        assert_eq!(c.size, 4_980_736);
        assert!(c.extra.is_empty());
        assert!(!c.has_custom_store_name());
    }

    #[test]
    fn builder() {
        let c = StoreConfig::new("app")
            .with_store_name("notes")
            .with_description("scratch")
            .with_option("driver", "windowStorage");
        assert_eq!(c.name, "app");
        assert_eq!(c.store_name, "notes");
        assert_eq!(c.description, "scratch");
        assert_eq!(c.extra.get("driver"), Some(&json!("windowStorage")));
        assert!(c.has_custom_store_name());
    }

    #[test]
    fn toml_with_defaults_and_extras() {
        let c = StoreConfig::from_toml_str(
            r#"
            name = "app"
            storeName = "todos"
            retries = 3
            "#,
        )
        .unwrap();
        assert_eq!(c.name, "app");
        assert_eq!(c.store_name, "todos");
        assert_eq!(c.size, 4_980_736);
        assert_eq!(c.extra.get("retries"), Some(&json!(3)));
    }

    #[test]
    fn toml_empty_is_default() {
        assert_eq!(StoreConfig::from_toml_str("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn toml_rejects_wrong_types() {
        let err = StoreConfig::from_toml_str("name = 5").unwrap_err();
        assert!(matches!(err, TypeError::Config(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let c = StoreConfig::new("app").with_store_name("notes");
        let text = c.to_toml_string().unwrap();
        assert_eq!(StoreConfig::from_toml_str(&text).unwrap(), c);
    }

    #[test]
    fn options_include_typed_fields_and_extras() {
        let c = StoreConfig::new("app").with_option("custom", true);
        let options = c.to_options();
        assert_eq!(options.get("name"), Some(&json!("app")));
        assert_eq!(options.get("storeName"), Some(&json!("keyvaluepairs")));
        assert_eq!(options.get("custom"), Some(&json!(true)));
    }
}
