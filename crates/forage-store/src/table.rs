//! The shared table every store writes into.
//!
//! A [`SharedTable`] maps physical keys to stored values and enumerates them
//! in insertion order. Overwriting a key keeps its position; removing and
//! re-inserting it moves it to the end.
//!
//! Any number of stores can hold a handle to the same table. Isolation between
//! them comes only from their key prefixes; the table itself has no notion of
//! ownership.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock, RwLock};

use serde_json::Value;

static GLOBAL_TABLE: OnceLock<SharedTable> = OnceLock::new();

/// Insertion-ordered map from physical key to stored value.
#[derive(Debug, Default)]
pub struct TableData {
    /// physical key -> insertion sequence
    index: HashMap<String, u64>,
    /// insertion sequence -> (physical key, value)
    entries: BTreeMap<u64, (String, Value)>,
    next_seq: u64,
}

impl TableData {
    /// Look up a physical key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let seq = self.index.get(key)?;
        self.entries.get(seq).map(|(_, v)| v)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        if let Some(seq) = self.index.get(&key) {
            if let Some((_, slot)) = self.entries.get_mut(seq) {
                return Some(std::mem::replace(slot, value));
            }
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.index.insert(key.clone(), seq);
        self.entries.insert(seq, (key, value));
        None
    }

    /// Remove a key. Removing an absent key is a no-op returning `None`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let seq = self.index.remove(key)?;
        self.entries.remove(&seq).map(|(_, v)| v)
    }

    /// Keys in enumeration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(k, _)| k.as_str())
    }

    /// Entries in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.values().map(|(k, v)| (k.as_str(), v))
    }

    /// The key at position `n` of the enumeration, if in range.
    pub fn key_at(&self, n: usize) -> Option<&str> {
        self.keys().nth(n)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Cheaply clonable handle to one shared table.
///
/// Use [`SharedTable::global`] for the process-wide table and
/// [`SharedTable::new`] for an isolated one.
#[derive(Clone, Default)]
pub struct SharedTable {
    data: Arc<RwLock<TableData>>,
}

impl SharedTable {
    /// Create a new, empty, isolated table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide table, created on first use.
    pub fn global() -> Self {
        GLOBAL_TABLE.get_or_init(SharedTable::new).clone()
    }

    /// Returns `true` if both handles refer to the same table.
    pub fn same_table(&self, other: &SharedTable) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Run `f` with shared access to the whole table.
    pub fn read<R>(&self, f: impl FnOnce(&TableData) -> R) -> R {
        let data = self.data.read().expect("table lock poisoned");
        f(&data)
    }

    /// Run `f` with exclusive access to the whole table.
    pub fn write<R>(&self, f: impl FnOnce(&mut TableData) -> R) -> R {
        let mut data = self.data.write().expect("table lock poisoned");
        f(&mut data)
    }

    /// Clone the value stored under a physical key.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read(|data| data.get(key).cloned())
    }

    /// Insert or overwrite a physical key.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.write(|data| data.insert(key.into(), value))
    }

    /// Remove a physical key.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write(|data| data.remove(key))
    }

    /// Returns `true` if the physical key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.read(|data| data.contains_key(key))
    }

    /// Snapshot of every physical key, in enumeration order.
    pub fn keys(&self) -> Vec<String> {
        self.read(|data| data.keys().map(str::to_string).collect())
    }

    /// Number of physical keys across all stores.
    pub fn len(&self) -> usize {
        self.read(TableData::len)
    }

    /// Returns `true` if no store has written anything.
    pub fn is_empty(&self) -> bool {
        self.read(TableData::is_empty)
    }
}

impl std::fmt::Debug for SharedTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTable")
            .field("entry_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_and_get() {
        let table = SharedTable::new();
        assert!(table.insert("a/x", json!(1)).is_none());
        assert_eq!(table.get("a/x"), Some(json!(1)));
        assert_eq!(table.get("a/y"), None);
        assert!(table.contains_key("a/x"));
    }

    #[test]
    fn enumeration_follows_insertion_order() {
        let table = SharedTable::new();
        table.insert("c", json!(1));
        table.insert("a", json!(2));
        table.insert("b", json!(3));
        assert_eq!(table.keys(), vec!["c", "a", "b"]);
    }

    #[test]
    fn overwrite_keeps_position() {
        let table = SharedTable::new();
        table.insert("first", json!(1));
        table.insert("second", json!(2));
        assert_eq!(table.insert("first", json!(10)), Some(json!(1)));
        assert_eq!(table.keys(), vec!["first", "second"]);
        assert_eq!(table.get("first"), Some(json!(10)));
    }

    #[test]
    fn reinsert_after_remove_moves_to_end() {
        let table = SharedTable::new();
        table.insert("first", json!(1));
        table.insert("second", json!(2));
        assert_eq!(table.remove("first"), Some(json!(1)));
        table.insert("first", json!(3));
        assert_eq!(table.keys(), vec!["second", "first"]);
    }

    #[test]
    fn remove_missing_is_noop() {
        let table = SharedTable::new();
        table.insert("kept", json!(true));
        assert_eq!(table.remove("missing"), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn key_at_position() {
        let table = SharedTable::new();
        table.insert("x", json!(1));
        table.insert("y", json!(2));
        table.read(|data| {
            assert_eq!(data.key_at(0), Some("x"));
            assert_eq!(data.key_at(1), Some("y"));
            assert_eq!(data.key_at(2), None);
        });
    }

    #[test]
    fn clones_share_data() {
        let table = SharedTable::new();
        let other = table.clone();
        other.insert("k", json!("v"));
        assert_eq!(table.get("k"), Some(json!("v")));
        assert!(table.same_table(&other));
        assert!(!table.same_table(&SharedTable::new()));
    }

    #[test]
    fn global_is_one_table() {
        assert!(SharedTable::global().same_table(&SharedTable::global()));
    }

    #[test]
    fn len_and_is_empty() {
        let table = SharedTable::new();
        assert!(table.is_empty());
        table.insert("k", Value::Null);
        assert!(!table.is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn debug_format() {
        let table = SharedTable::new();
        table.insert("k", json!(1));
        let debug = format!("{table:?}");
        assert!(debug.contains("SharedTable"));
        assert!(debug.contains("entry_count"));
    }
}
