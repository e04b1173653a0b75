//! Caller-supplied keys.
//!
//! Shared table keys are always strings. Callers may still hand in numbers,
//! booleans or structured values; [`RawKey::coerce`] turns those into their
//! display string and emits a warning, then the operation carries on.

use serde_json::Value;
use tracing::warn;

use crate::value::{float_to_display_string, to_display_string};

/// A key as supplied by the caller, before coercion to a logical key.
#[derive(Clone, Debug, PartialEq)]
pub struct RawKey(Repr);

/// Floats are kept apart from JSON values: JSON has no NaN or infinities, and
/// those must not collapse into `null`.
#[derive(Clone, Debug, PartialEq)]
enum Repr {
    Json(Value),
    Float(f64),
}

impl RawKey {
    /// Wrap an arbitrary value as a key.
    pub fn new(value: impl Into<RawKey>) -> Self {
        value.into()
    }

    /// Returns `true` if the key is already a string and needs no coercion.
    pub fn is_string(&self) -> bool {
        matches!(self.0, Repr::Json(Value::String(_)))
    }

    /// The key as a JSON value, if it has one. Non-finite floats do not.
    pub fn to_value(&self) -> Option<Value> {
        match &self.0 {
            Repr::Json(value) => Some(value.clone()),
            Repr::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
        }
    }

    /// Convert into the logical key string.
    ///
    /// Never fails. Non-string keys are rendered with
    /// [`to_display_string`] and reported with a `warn!` diagnostic.
    pub fn coerce(self) -> String {
        let key = match self.0 {
            Repr::Json(Value::String(s)) => return s,
            Repr::Json(other) => to_display_string(&other),
            Repr::Float(f) => float_to_display_string(f),
        };
        warn!(key = %key, "{key} used as a key, but it is not a string.");
        key
    }
}

impl From<&str> for RawKey {
    fn from(s: &str) -> Self {
        Self(Repr::Json(Value::String(s.to_string())))
    }
}

impl From<String> for RawKey {
    fn from(s: String) -> Self {
        Self(Repr::Json(Value::String(s)))
    }
}

impl From<&String> for RawKey {
    fn from(s: &String) -> Self {
        Self(Repr::Json(Value::String(s.clone())))
    }
}

impl From<Value> for RawKey {
    fn from(value: Value) -> Self {
        Self(Repr::Json(value))
    }
}

impl From<bool> for RawKey {
    fn from(b: bool) -> Self {
        Self(Repr::Json(Value::Bool(b)))
    }
}

impl From<f64> for RawKey {
    fn from(f: f64) -> Self {
        Self(Repr::Float(f))
    }
}

macro_rules! raw_key_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for RawKey {
                fn from(n: $t) -> Self {
                    Self(Repr::Json(Value::from(n)))
                }
            }
        )*
    };
}

raw_key_from_integer!(i32, i64, u32, u64, usize);
