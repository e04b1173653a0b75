//! Line-oriented script format for `forage run`.
//!
//! ```text
//! # comment
//! app/notes set a {"title": "x"}
//! app/notes keys
//! . length
//! ```
//!
//! The first token names the store: `name`, `name/storeName`, or `.` for the
//! store from `--config`. Values after `set` are JSON; anything that is not
//! valid JSON is stored as a string.

use anyhow::{anyhow, bail, Context};
use forage_types::StoreConfig;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum StoreRef {
    Configured,
    Named {
        name: String,
        store_name: Option<String>,
    },
}

impl StoreRef {
    fn parse(token: &str) -> anyhow::Result<Self> {
        if token == "." {
            return Ok(StoreRef::Configured);
        }
        let (name, store_name) = match token.split_once('/') {
            Some((name, store_name)) => (name, Some(store_name.to_string())),
            None => (token, None),
        };
        if name.is_empty() || store_name.as_deref() == Some("") {
            bail!("invalid store reference {token:?}");
        }
        Ok(StoreRef::Named {
            name: name.to_string(),
            store_name,
        })
    }

    /// Configuration for this store, layered over `base`.
    pub fn config(&self, base: &StoreConfig) -> StoreConfig {
        match self {
            StoreRef::Configured => base.clone(),
            StoreRef::Named { name, store_name } => {
                let mut config = base.clone();
                config.name = name.clone();
                config.store_name = store_name
                    .clone()
                    .unwrap_or_else(|| StoreConfig::default().store_name);
                config
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            StoreRef::Configured => ".".to_string(),
            StoreRef::Named {
                name,
                store_name: Some(store_name),
            } => format!("{name}/{store_name}"),
            StoreRef::Named { name, .. } => name.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Set { key: String, value: Value },
    Unset { key: String },
    Get { key: String },
    Remove { key: String },
    Clear,
    Keys,
    Length,
    Key { n: usize },
    Iterate,
}

impl Op {
    pub fn name(&self) -> &'static str {
        match self {
            Op::Set { .. } => "set",
            Op::Unset { .. } => "unset",
            Op::Get { .. } => "get",
            Op::Remove { .. } => "remove",
            Op::Clear => "clear",
            Op::Keys => "keys",
            Op::Length => "length",
            Op::Key { .. } => "key",
            Op::Iterate => "iterate",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub line: usize,
    pub store: StoreRef,
    pub op: Op,
}

/// Parse one line. Blank lines and comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> anyhow::Result<Option<Step>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (store, rest) = split_token(line);
    let (op, rest) = split_token(rest);
    if op.is_empty() {
        bail!("line {line_no}: missing operation");
    }
    let store = StoreRef::parse(store).with_context(|| format!("line {line_no}"))?;

    let op = match op {
        "set" => {
            let (key, value) = split_token(rest);
            Op::Set {
                key: required(key, line_no, "set")?,
                value: parse_value(value),
            }
        }
        "unset" => Op::Unset {
            key: required(rest, line_no, "unset")?,
        },
        "get" => Op::Get {
            key: required(rest, line_no, "get")?,
        },
        "remove" => Op::Remove {
            key: required(rest, line_no, "remove")?,
        },
        "clear" => Op::Clear,
        "keys" => Op::Keys,
        "length" => Op::Length,
        "key" => {
            let n = required(rest, line_no, "key")?;
            Op::Key {
                n: n.parse()
                    .map_err(|_| anyhow!("line {line_no}: key index {n:?} is not a number"))?,
            }
        }
        "iterate" => Op::Iterate,
        other => bail!("line {line_no}: unknown operation {other:?}"),
    };

    Ok(Some(Step {
        line: line_no,
        store,
        op,
    }))
}

/// Parse a whole script. With `strict`, the first bad line is an error;
/// otherwise bad lines are reported and skipped.
pub fn parse_script(input: &str, strict: bool) -> anyhow::Result<Vec<Step>> {
    let mut steps = Vec::new();
    for (i, line) in input.lines().enumerate() {
        match parse_line(i + 1, line) {
            Ok(Some(step)) => steps.push(step),
            Ok(None) => {}
            Err(e) if !strict => tracing::warn!("skipping {e:#}"),
            Err(e) => return Err(e),
        }
    }
    Ok(steps)
}

fn split_token(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.find(char::is_whitespace) {
        Some(i) => (&input[..i], input[i..].trim_start()),
        None => (input, ""),
    }
}

fn required(token: &str, line_no: usize, op: &str) -> anyhow::Result<String> {
    let token = token.trim();
    if token.is_empty() {
        bail!("line {line_no}: {op} needs an argument");
    }
    Ok(token.to_string())
}

fn parse_value(text: &str) -> Value {
    let text = text.trim();
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comments_and_blanks_are_skipped() {
        assert_eq!(parse_line(1, "").unwrap(), None);
        assert_eq!(parse_line(2, "   # note").unwrap(), None);
    }

    #[test]
    fn set_with_json_value() {
        let step = parse_line(3, r#"app/notes set a {"x": [1, 2]}"#).unwrap().unwrap();
        assert_eq!(step.line, 3);
        assert_eq!(
            step.store,
            StoreRef::Named {
                name: "app".into(),
                store_name: Some("notes".into())
            }
        );
        assert_eq!(
            step.op,
            Op::Set {
                key: "a".into(),
                value: json!({"x": [1, 2]})
            }
        );
    }

    #[test]
    fn set_with_plain_text_value() {
        let step = parse_line(1, "app set greeting hello there").unwrap().unwrap();
        assert_eq!(
            step.op,
            Op::Set {
                key: "greeting".into(),
                value: json!("hello there")
            }
        );
    }

    #[test]
    fn set_without_value_is_empty_string() {
        let step = parse_line(1, "app set k").unwrap().unwrap();
        assert_eq!(
            step.op,
            Op::Set {
                key: "k".into(),
                value: json!(""),
            }
        );
    }

    #[test]
    fn simple_operations() {
        let lines = ["clear", "keys", "length", "iterate", "key 2", "get a", "remove a", "unset a"];
        let ops: Vec<Op> = lines
            .iter()
            .map(|op| parse_line(1, &format!(". {op}")).unwrap().unwrap().op)
            .collect();
        assert_eq!(
            ops,
            vec![
                Op::Clear,
                Op::Keys,
                Op::Length,
                Op::Iterate,
                Op::Key { n: 2 },
                Op::Get { key: "a".into() },
                Op::Remove { key: "a".into() },
                Op::Unset { key: "a".into() },
            ]
        );
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_line(7, "app fly").unwrap_err();
        assert!(err.to_string().contains("line 7"));
        assert!(parse_line(1, "app").is_err());
        assert!(parse_line(1, "app get").is_err());
        assert!(parse_line(1, "app key x").is_err());
        assert!(parse_line(1, "/notes keys").is_err());
        assert!(parse_line(1, "app/ keys").is_err());
    }

    #[test]
    fn lenient_script_skips_bad_lines() {
        let steps = parse_script("app keys\napp fly\napp length\n", false).unwrap();
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[1].line, 3);
        assert!(parse_script("app keys\napp fly\n", true).is_err());
    }

    #[test]
    fn store_ref_config_layers_over_base() {
        let base = StoreConfig::new("base").with_option("flag", true);
        let named = StoreRef::parse("app/notes").unwrap().config(&base);
        assert_eq!(named.name, "app");
        assert_eq!(named.store_name, "notes");
        assert_eq!(named.extra.get("flag"), Some(&json!(true)));

        let short = StoreRef::parse("app").unwrap().config(&base);
        assert_eq!(short.store_name, "keyvaluepairs");

        assert_eq!(StoreRef::Configured.config(&base), base);
    }

    #[test]
    fn labels() {
        assert_eq!(StoreRef::parse("app/notes").unwrap().label(), "app/notes");
        assert_eq!(StoreRef::parse("app").unwrap().label(), "app");
        assert_eq!(StoreRef::Configured.label(), ".");
    }
}
