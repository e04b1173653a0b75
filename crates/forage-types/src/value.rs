//! Value helpers shared by the drivers.
//!
//! Stored values are plain [`serde_json::Value`]s. Two rules from the hosting
//! environment leak into driver behaviour and live here:
//!
//! - **Truthiness** decides whether a stored value is handed to the codec
//!   during iteration. Falsy values (`null`, `false`, zero, `""`) pass through
//!   untouched.
//! - **Display strings** are what a non-string key turns into when it is
//!   coerced (`[1, 2]` becomes `"1,2"`, objects become `"[object Object]"`).

use serde_json::{Number, Value};

/// Returns `true` unless the value is `null`, `false`, a zero number, or the
/// empty string.
///
/// Empty arrays and empty objects are truthy.
///
/// ```
/// use forage_types::is_truthy;
/// use serde_json::json;
///
/// assert!(is_truthy(&json!({})));
/// assert!(is_truthy(&json!("0")));
/// assert!(!is_truthy(&json!(0)));
/// assert!(!is_truthy(&json!("")));
/// ```
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => number_is_truthy(n),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn number_is_truthy(n: &Number) -> bool {
    if let Some(i) = n.as_i64() {
        return i != 0;
    }
    if let Some(u) = n.as_u64() {
        return u != 0;
    }
    n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan())
}

/// Render a value the way the hosting environment's `String(value)` does.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_to_string(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                // Nulls inside arrays render as empty segments.
                Value::Null => String::new(),
                other => to_display_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

fn number_to_string(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) => float_to_display_string(f),
        None => n.to_string(),
    }
}

/// Render a float the way the hosting environment does.
///
/// Non-finite values keep their names, and magnitudes at or above `1e21` or
/// below `1e-6` switch to exponent notation with an explicit sign.
///
/// ```
/// use forage_types::float_to_display_string;
///
/// assert_eq!(float_to_display_string(f64::NAN), "NaN");
/// assert_eq!(float_to_display_string(f64::NEG_INFINITY), "-Infinity");
/// assert_eq!(float_to_display_string(1e21), "1e+21");
/// assert_eq!(float_to_display_string(2.0), "2");
/// ```
pub fn float_to_display_string(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    let magnitude = f.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exp = format!("{f:e}");
        return match exp.split_once('e') {
            Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
            _ => exp,
        };
    }
    f.to_string()
}
