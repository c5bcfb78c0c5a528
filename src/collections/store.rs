// ============================================================================
// observable-map - Store
// Insertion-ordered backing storage with a single shared cursor
// ============================================================================
//
// Both map variants keep their entries here. The store owns no callbacks
// and never notifies anyone; it is the plain data half of a map.
//
// The cursor is one position per store:
// - position 0 is both "not started" and "at the first entry"
// - position i < len is "at entry i"
// - position >= len is "exhausted"
// Structural changes do not adjust the cursor. After an insert or remove
// mid-walk the cursor simply points at whatever entry now has its position.
// ============================================================================

use indexmap::map::{Iter, Keys, Values};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::error::{Error, Result};
use crate::core::key::{AsKey, Key};
use crate::core::merge::DeepMerge;
use crate::core::types::Entries;

// =============================================================================
// STORE
// =============================================================================

pub(crate) struct Store<V> {
    data: Entries<V>,
    cursor: usize,
}

impl<V> Store<V> {
    pub(crate) fn new() -> Self {
        Self::from_entries(Entries::new())
    }

    pub(crate) fn from_entries(data: Entries<V>) -> Self {
        Self { data, cursor: 0 }
    }

    pub(crate) fn len(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn get<Q: AsKey + ?Sized>(&self, key: &Q) -> Option<&V> {
        self.data.get(&key.as_key_ref())
    }

    pub(crate) fn contains_key<Q: AsKey + ?Sized>(&self, key: &Q) -> bool {
        self.data.contains_key(&key.as_key_ref())
    }

    /// Write `value` at `key`. A new key goes to the end; an existing key
    /// keeps its position.
    pub(crate) fn insert(&mut self, key: Key, value: V) -> Option<V> {
        self.data.insert(key, value)
    }

    /// Next append key: the current entry count.
    ///
    /// This can collide with an existing index key once entries have been
    /// removed; the append then overwrites that entry.
    pub(crate) fn next_index(&self) -> Key {
        Key::from(self.data.len())
    }

    /// Deep-merge `patch` into the entries. Existing keys keep their position.
    pub(crate) fn merge(&mut self, patch: Entries<V>)
    where
        V: DeepMerge,
    {
        self.data.deep_merge(patch);
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub(crate) fn remove<Q: AsKey + ?Sized>(&mut self, key: &Q) -> Option<V> {
        self.data.shift_remove(&key.as_key_ref())
    }

    pub(crate) fn entries(&self) -> &Entries<V> {
        &self.data
    }

    pub(crate) fn into_entries(self) -> Entries<V> {
        self.data
    }

    pub(crate) fn iter(&self) -> Iter<'_, Key, V> {
        self.data.iter()
    }

    pub(crate) fn keys(&self) -> Keys<'_, Key, V> {
        self.data.keys()
    }

    pub(crate) fn values(&self) -> Values<'_, Key, V> {
        self.data.values()
    }

    // =========================================================================
    // CURSOR
    // =========================================================================

    pub(crate) fn rewind(&mut self) -> Option<(&Key, &V)> {
        self.cursor = 0;
        self.data.get_index(0)
    }

    pub(crate) fn current_entry(&self) -> Option<(&Key, &V)> {
        self.data.get_index(self.cursor)
    }

    pub(crate) fn advance(&mut self) -> Option<(&Key, &V)> {
        if self.cursor < self.data.len() {
            self.cursor += 1;
        }
        self.data.get_index(self.cursor)
    }

    pub(crate) fn valid(&self) -> bool {
        self.cursor < self.data.len()
    }
}

/// Collect key/value pairs into ordered entries, converting keys.
pub(crate) fn collect_entries<I, K, V>(entries: I) -> Entries<V>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<Key>,
{
    entries.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

// =============================================================================
// RECORD CONVERSION
// =============================================================================

/// Turn any serializable record into ordered entries, one per field.
pub(crate) fn entries_from_record<T, V>(record: &T) -> Result<Entries<V>>
where
    T: Serialize + ?Sized,
    V: DeserializeOwned,
{
    let fields = match serde_json::to_value(record)? {
        Value::Object(fields) => fields,
        other => return Err(Error::NotARecord(value_kind(&other))),
    };

    fields
        .into_iter()
        .map(|(name, value)| Ok((Key::from(name), serde_json::from_value(value)?)))
        .collect()
}

/// Rebuild a record from ordered entries. Index keys become decimal field names.
pub(crate) fn entries_to_record<T, V>(entries: &Entries<V>) -> Result<T>
where
    T: DeserializeOwned,
    V: Serialize,
{
    let value = serde_json::to_value(entries)?;
    Ok(serde_json::from_value(value)?)
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// TESTS
// =============================================================================
