//! Serialization codec used when iterating a store.
//!
//! Drivers treat the codec as a black box. Only `iterate` decodes values;
//! `get_item` returns whatever was stored.

use serde_json::Value;

use crate::error::StoreResult;

/// Encodes values for storage and decodes stored values.
pub trait Codec: Send + Sync {
    /// Encode a value as text.
    fn serialize(&self, value: &Value) -> StoreResult<String>;

    /// Decode a stored value.
    fn deserialize(&self, stored: &Value) -> StoreResult<Value>;
}

/// JSON text codec.
///
/// String input that parses as JSON is decoded; anything else is returned
/// unchanged, so decoding never fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn serialize(&self, value: &Value) -> StoreResult<String> {
        Ok(serde_json::to_string(value)?)
    }

    fn deserialize(&self, stored: &Value) -> StoreResult<Value> {
        match stored {
            Value::String(text) => {
                Ok(serde_json::from_str(text).unwrap_or_else(|_| stored.clone()))
            }
            other => Ok(other.clone()),
        }
    }
}
