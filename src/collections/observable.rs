// ============================================================================
// observable-map - ObservableMap
// An insertion-ordered map that reports every write to a callback
// ============================================================================

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use super::callback::{CallbackSlot, dispatch_change};
use super::store::{Store, collect_entries, entries_from_record};
use crate::core::error::Result;
use crate::core::key::{AsKey, Key};
use crate::core::types::{CallbackResult, ChangeFn};

// =============================================================================
// OBSERVABLE MAP
// =============================================================================

/// An insertion-ordered map with a change callback.
///
/// Entries are addressed by [`Key`]: integers or strings, with canonical
/// integer strings folded into integers. Every write through [`set`],
/// [`push`] or [`insert_at`] is followed by a synchronous call to the change
/// callback, if one is registered. Removals are silent.
///
/// # Example
///
/// ```
/// use observable_map::ObservableMap;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let log = seen.clone();
///
/// let mut map = ObservableMap::from_entries([("a", 1)]);
/// map.set_change_callback(move |_map, key, value| {
///     log.borrow_mut().push(format!("{key}={value}"));
///     Ok(())
/// });
///
/// map.set("b", 2)?;
/// map.push(3)?;
///
/// assert_eq!(map.get("b"), Some(&2));
/// assert_eq!(*seen.borrow(), ["b=2", "2=3"]);
/// # Ok::<(), observable_map::Error>(())
/// ```
///
/// [`set`]: ObservableMap::set
/// [`push`]: ObservableMap::push
/// [`insert_at`]: ObservableMap::insert_at
pub struct ObservableMap<V> {
    /// Entries in insertion order, plus the shared cursor
    store: Store<V>,

    /// Fired after every write
    on_change: CallbackSlot<ChangeFn<ObservableMap<V>, V>>,
}

impl<V> ObservableMap<V> {
    /// Create an empty map with no callback.
    pub fn new() -> Self {
        Self::from_store(Store::new())
    }

    /// Create a map from key/value pairs, in order.
    ///
    /// A repeated key keeps its first position and its last value.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        Self::from_store(Store::from_entries(collect_entries(entries)))
    }

    /// Create a map from the fields of a serializable record.
    ///
    /// Each field becomes one entry, in declaration order. Fails with
    /// [`Error::NotARecord`](crate::Error::NotARecord) if `record` does not serialize to an object.
    pub fn from_record<T>(record: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        Ok(Self::from_store(Store::from_entries(entries_from_record(record)?)))
    }

    /// Create a map from key/value pairs with a change callback already registered.
    pub fn with_change_callback<I, K, F>(entries: I, callback: F) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        F: Fn(&mut Self, &Key, &V) -> CallbackResult + 'static,
    {
        let mut map = Self::from_entries(entries);
        map.set_change_callback(callback);
        map
    }

    fn from_store(store: Store<V>) -> Self {
        Self {
            store,
            on_change: CallbackSlot::empty(),
        }
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Bind `value` to `key`, then fire the change callback.
    ///
    /// A new key is appended; an existing key keeps its position. The write
    /// is applied before the callback runs and is not undone if the callback
    /// fails. The callback's error comes back as
    /// [`Error::ChangeCallback`](crate::Error::ChangeCallback).
    pub fn set<K: Into<Key>>(&mut self, key: K, value: V) -> Result<()>
    where
        V: Clone,
    {
        self.write(key.into(), value)
    }

    /// Append `value` under the next integer key and return that key.
    ///
    /// The next key is the current entry count: `0`, `1`, ... on a fresh map.
    /// After removals this can land on an existing index key and overwrite it.
    pub fn push(&mut self, value: V) -> Result<Key>
    where
        V: Clone,
    {
        let key = self.store.next_index();
        self.write(key.clone(), value)?;
        Ok(key)
    }

    /// Write at `key`, or append when `key` is `None`. Returns the key written.
    pub fn insert_at<K: Into<Key>>(&mut self, key: Option<K>, value: V) -> Result<Key>
    where
        V: Clone,
    {
        match key {
            Some(key) => {
                let key = key.into();
                self.write(key.clone(), value)?;
                Ok(key)
            }
            None => self.push(value),
        }
    }

    /// Remove `key` and return its value. Does not fire the change callback.
    pub fn remove<Q: AsKey + ?Sized>(&mut self, key: &Q) -> Option<V> {
        let removed = self.store.remove(key);
        if removed.is_some() {
            trace!(key = %key.as_key_ref().to_key(), "entry removed");
        }
        removed
    }

    fn write(&mut self, key: Key, value: V) -> Result<()>
    where
        V: Clone,
    {
        trace!(%key, "entry written");

        let Some(callback) = self.on_change.current() else {
            self.store.insert(key, value);
            return Ok(());
        };

        self.store.insert(key.clone(), value.clone());
        dispatch_change(self, callback, key, &value)
    }

    // =========================================================================
    // CALLBACKS
    // =========================================================================

    /// Register the change callback, replacing any previous one.
    ///
    /// Takes effect from the next write. The callback may write to the map;
    /// each such write fires it again, so it must stop recursing on its own.
    pub fn set_change_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut Self, &Key, &V) -> CallbackResult + 'static,
    {
        self.on_change.replace(Some(Rc::new(callback)));
    }

    /// Unregister the change callback.
    pub fn remove_change_callback(&mut self) {
        self.on_change.replace(None);
    }

    pub fn has_change_callback(&self) -> bool {
        self.on_change.is_set()
    }
}

impl_map_reads!([V] ObservableMap<V>);

impl<V> Default for ObservableMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<Key>, V> FromIterator<(K, V)> for ObservableMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<V: Clone> Clone for ObservableMap<V> {
    /// Copies the entries only. The clone has no change callback and a
    /// fresh cursor.
    fn clone(&self) -> Self {
        Self::from_store(Store::from_entries(self.store.entries().clone()))
    }
}

impl<V: fmt::Debug> fmt::Debug for ObservableMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableMap")
            .field("entries", self.store.entries())
            .field("on_change", &self.on_change.is_set())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
