// ============================================================================
// observable-map - TrackedMap
// ObservableMap plus a change record and an explicit save hook
// ============================================================================
//
// Every write lands in two places: the entries, and the change record
// (latest value per key written since construction or the last
// `clear_changes`). Removing an entry leaves its change record alone.
//
// `save` hands a snapshot of the change record to the save callback and
// leaves the record as it was. Saving twice sends the same changes twice;
// callers that want incremental saves call `clear_changes` themselves,
// typically from inside the save callback.
// ============================================================================

use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::callback::{CallbackSlot, dispatch_change};
use super::store::{Store, collect_entries, entries_from_record, entries_to_record};
use crate::core::error::{Error, Result};
use crate::core::invoke::Invoke;
use crate::core::key::{AsKey, Key};
use crate::core::merge::DeepMerge;
use crate::core::types::{CallbackResult, ChangeFn, Entries, SaveFn};

// =============================================================================
// TRACKED MAP
// =============================================================================

/// An insertion-ordered map that records its writes and saves them on demand.
///
/// `S` is what the save callback produces; [`save`] hands it back.
///
/// # Example
///
/// ```
/// use observable_map::{Key, TrackedMap};
///
/// let mut user: TrackedMap<String, usize> = TrackedMap::from_entries([
///     ("name", "ada".to_string()),
///     ("role", "admin".to_string()),
/// ]);
/// user.set_save_callback(|_map, changes| Ok(changes.len()));
///
/// user.set("role", "owner".to_string())?;
///
/// assert!(user.changes().contains_key(&Key::from("role")));
/// assert!(!user.changes().contains_key(&Key::from("name")));
/// assert_eq!(user.save()?, Some(1));
/// # Ok::<(), observable_map::Error>(())
/// ```
///
/// [`save`]: TrackedMap::save
pub struct TrackedMap<V, S = ()> {
    /// Entries in insertion order, plus the shared cursor
    store: Store<V>,

    /// Latest value written per key
    changes: Entries<V>,

    /// Fired after every write
    on_change: CallbackSlot<ChangeFn<TrackedMap<V, S>, V>>,

    /// Fired by `save`
    on_save: CallbackSlot<SaveFn<TrackedMap<V, S>, V, S>>,
}

impl<V, S> TrackedMap<V, S> {
    /// Create an empty map with no callbacks.
    pub fn new() -> Self {
        Self::from_store(Store::new())
    }

    /// Create a map from key/value pairs, in order. The change record starts empty.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        Self::from_store(Store::from_entries(collect_entries(entries)))
    }

    /// Create a map from the fields of a serializable record.
    pub fn from_record<T>(record: &T) -> Result<Self>
    where
        T: Serialize + ?Sized,
        V: DeserializeOwned,
    {
        Ok(Self::from_store(Store::from_entries(entries_from_record(record)?)))
    }

    /// Create a map with either callback already registered.
    ///
    /// Argument order is entries, save callback, change callback.
    pub fn with_callbacks<I, K>(
        entries: I,
        on_save: Option<SaveFn<Self, V, S>>,
        on_change: Option<ChangeFn<Self, V>>,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
    {
        let mut map = Self::from_entries(entries);
        map.on_save = CallbackSlot::new(on_save);
        map.on_change = CallbackSlot::new(on_change);
        map
    }

    fn from_store(store: Store<V>) -> Self {
        Self {
            store,
            changes: Entries::new(),
            on_change: CallbackSlot::empty(),
            on_save: CallbackSlot::empty(),
        }
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Bind `value` to `key`, record the change, then fire the change callback.
    ///
    /// Both writes are applied before the callback runs and stay applied if
    /// it fails.
    pub fn set<K: Into<Key>>(&mut self, key: K, value: V) -> Result<()>
    where
        V: Clone,
    {
        self.write(key.into(), value)
    }

    /// Append `value` under the next integer key (the entry count) and return it.
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

    /// Remove `key` and return its value.
    ///
    /// Silent: no callback fires and the change record keeps whatever it
    /// last saw for `key`.
    pub fn remove<Q: AsKey + ?Sized>(&mut self, key: &Q) -> Option<V> {
        let removed = self.store.remove(key);
        if removed.is_some() {
            trace!(key = %key.as_key_ref().to_key(), "entry removed");
        }
        removed
    }

    /// Deep-merge `patch` into both the entries and the change record.
    ///
    /// Nested containers merge recursively (see [`DeepMerge`]); other values
    /// are replaced. This bypasses the change callback.
    pub fn merge<I, K>(&mut self, patch: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: DeepMerge + Clone,
    {
        let patch = collect_entries(patch);
        trace!(keys = patch.len(), "merging patch");
        self.changes.deep_merge(patch.clone());
        self.store.merge(patch);
    }

    fn write(&mut self, key: Key, value: V) -> Result<()>
    where
        V: Clone,
    {
        trace!(%key, "entry written");
        self.changes.insert(key.clone(), value.clone());

        let Some(callback) = self.on_change.current() else {
            self.store.insert(key, value);
            return Ok(());
        };

        self.store.insert(key.clone(), value.clone());
        dispatch_change(self, callback, key, &value)
    }

    // =========================================================================
    // CHANGES
    // =========================================================================

    /// Latest value written per key, in first-write order.
    pub fn changes(&self) -> &Entries<V> {
        &self.changes
    }

    /// Owned copy of the change record.
    pub fn to_changes(&self) -> Entries<V>
    where
        V: Clone,
    {
        self.changes.clone()
    }

    /// Snapshot the change record as a structured record.
    pub fn changes_to_record<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
        V: Serialize,
    {
        entries_to_record(&self.changes)
    }

    /// Forget every recorded change. Entries are untouched.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    // =========================================================================
    // SAVE
    // =========================================================================

    /// Run the save callback with a snapshot of the change record.
    ///
    /// Returns `Ok(None)` when no save callback is registered, otherwise the
    /// callback's output. The change record is not cleared.
    pub fn save(&mut self) -> Result<Option<S>>
    where
        V: Clone,
    {
        let Some(callback) = self.on_save.current() else {
            return Ok(None);
        };

        let snapshot = self.changes.clone();
        debug!(changes = snapshot.len(), "dispatching save callback");
        callback(self, &snapshot).map(Some).map_err(Error::SaveCallback)
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Call the entry named `name` with `args`.
    ///
    /// Returns `None` if there is no such entry or its value is not callable.
    pub fn invoke<Q, A>(&self, name: &Q, args: A) -> Option<<V as Invoke<A>>::Output>
    where
        Q: AsKey + ?Sized,
        V: Invoke<A>,
    {
        self.store.get(name)?.invoke(args)
    }

    // =========================================================================
    // CALLBACKS
    // =========================================================================

    /// Register the change callback, replacing any previous one.
    pub fn set_change_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut Self, &Key, &V) -> CallbackResult + 'static,
    {
        self.on_change.replace(Some(Rc::new(callback)));
    }

    pub fn remove_change_callback(&mut self) {
        self.on_change.replace(None);
    }

    pub fn has_change_callback(&self) -> bool {
        self.on_change.is_set()
    }

    /// Register the save callback, replacing any previous one.
    pub fn set_save_callback<F>(&mut self, callback: F)
    where
        F: Fn(&mut Self, &Entries<V>) -> CallbackResult<S> + 'static,
    {
        self.on_save.replace(Some(Rc::new(callback)));
    }

    pub fn remove_save_callback(&mut self) {
        self.on_save.replace(None);
    }

    pub fn has_save_callback(&self) -> bool {
        self.on_save.is_set()
    }
}

impl_map_reads!([V, S] TrackedMap<V, S>);

impl<V, S> Default for TrackedMap<V, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Into<Key>, V, S> FromIterator<(K, V)> for TrackedMap<V, S> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_entries(iter)
    }
}

impl<V: Clone, S> Clone for TrackedMap<V, S> {
    /// Copies entries and the change record. The clone has no callbacks and
    /// a fresh cursor.
    fn clone(&self) -> Self {
        let mut map = Self::from_store(Store::from_entries(self.store.entries().clone()));
        map.changes = self.changes.clone();
        map
    }
}

impl<V: fmt::Debug, S> fmt::Debug for TrackedMap<V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackedMap")
            .field("entries", self.store.entries())
            .field("changes", &self.changes)
            .field("on_change", &self.on_change.is_set())
            .field("on_save", &self.on_save.is_set())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn key(k: impl Into<Key>) -> Key {
        k.into()
    }

    #[test]
    fn construction_starts_with_no_changes() {
        let map: TrackedMap<i32> = TrackedMap::from_entries([("a", 1), ("b", 2)]);
        assert_eq!(map.len(), 2);
        assert!(map.changes().is_empty());
    }

    #[test]
    fn writes_are_recorded() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        map.set("a", 1).unwrap();
        map.set("a", 2).unwrap();
        map.push(9).unwrap();

        assert_eq!(map.changes().get(&key("a")), Some(&2));
        assert_eq!(map.changes().get(&key(1)), Some(&9));
        assert_eq!(map.changes().len(), 2);
    }

    #[test]
    fn remove_keeps_recorded_change() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        map.set("k", 5).unwrap();
        assert_eq!(map.remove("k"), Some(5));

        assert!(!map.contains_key("k"));
        assert_eq!(map.changes().get(&key("k")), Some(&5));
    }

    #[test]
    fn change_callback_sees_the_tracked_map() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        let recorded = Rc::new(Cell::new(0));
        let sink = recorded.clone();
        map.set_change_callback(move |map, _, _| {
            sink.set(map.changes().len());
            Ok(())
        });

        map.set("a", 1).unwrap();
        map.set("b", 1).unwrap();
        assert_eq!(recorded.get(), 2);
    }

    #[test]
    fn writes_inside_the_callback_are_tracked_and_reported() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        let reported: Rc<RefCell<Vec<Key>>> = Rc::default();
        let sink = reported.clone();
        map.set_change_callback(move |map, key, value| {
            sink.borrow_mut().push(key.clone());
            if key.as_name() == Some("a") {
                map.set("b", value + 1)?;
            }
            Ok(())
        });

        map.set("a", 1).unwrap();

        assert_eq!(*reported.borrow(), vec![key("a"), key("b")]);
        assert_eq!(map.changes().get(&key("b")), Some(&2));
    }

    #[test]
    fn save_without_callback_is_none() {
        let mut map: TrackedMap<i32, u8> = TrackedMap::new();
        map.set("a", 1).unwrap();
        assert_eq!(map.save().unwrap(), None);
    }

    #[test]
    fn save_does_not_clear() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        let batches: Rc<RefCell<Vec<Entries<i32>>>> = Rc::default();
        let sink = batches.clone();
        map.set_save_callback(move |_, changes| {
            sink.borrow_mut().push(changes.clone());
            Ok(())
        });

        map.set("a", 1).unwrap();
        map.save().unwrap();
        map.save().unwrap();

        let batches = batches.borrow();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0], batches[1]);
        assert_eq!(batches[0].get(&key("a")), Some(&1));
    }

    #[test]
    fn save_callback_can_clear_changes() {
        let mut map: TrackedMap<i32, usize> = TrackedMap::new();
        map.set_save_callback(|map, changes| {
            map.clear_changes();
            Ok(changes.len())
        });

        map.set("a", 1).unwrap();
        map.set("b", 2).unwrap();
        assert_eq!(map.save().unwrap(), Some(2));
        assert_eq!(map.save().unwrap(), Some(0));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn failing_save_propagates() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        map.set_save_callback(|_, _| Err("offline".into()));

        let err = map.save().unwrap_err();
        assert!(matches!(err, Error::SaveCallback(_)));
        assert!(map.has_save_callback());
    }

    #[test]
    fn with_callbacks_registers_both() {
        let on_save: SaveFn<TrackedMap<i32>, i32, ()> =
            Rc::new(|_: &mut TrackedMap<i32>, _: &Entries<i32>| -> CallbackResult { Ok(()) });
        let map: TrackedMap<i32> = TrackedMap::with_callbacks([("a", 1)], Some(on_save), None);
        assert!(map.has_save_callback());
        assert!(!map.has_change_callback());
    }

    #[test]
    fn merge_is_deep_and_silent() {
        let mut map: TrackedMap<Value> =
            TrackedMap::from_entries([("cfg", json!({"depth": 1, "tags": ["a"]}))]);
        let fired = Rc::new(Cell::new(false));
        let sink = fired.clone();
        map.set_change_callback(move |_, _, _| {
            sink.set(true);
            Ok(())
        });

        map.merge([("cfg", json!({"tags": ["b", "c"]})), ("new", json!(1))]);

        assert_eq!(map["cfg"], json!({"depth": 1, "tags": ["b", "c"]}));
        assert_eq!(map["new"], json!(1));
        assert_eq!(map.changes().get(&key("cfg")), Some(&json!({"tags": ["b", "c"]})));
        assert!(!fired.get());
    }

    enum Slot {
        Data(i32),
        Func(Rc<dyn Fn(i32) -> i32>),
    }

    impl Invoke<i32> for Slot {
        type Output = i32;

        fn invoke(&self, args: i32) -> Option<i32> {
            match self {
                Slot::Func(f) => Some(f(args)),
                Slot::Data(_) => None,
            }
        }
    }

    #[test]
    fn invoke_dispatches_through_entries() {
        let map: TrackedMap<Slot> = TrackedMap::from_entries([
            ("double", Slot::Func(Rc::new(|x| x * 2))),
            ("plain", Slot::Data(3)),
        ]);

        assert_eq!(map.invoke("double", 21), Some(42));
        assert_eq!(map.invoke("plain", 1), None);
        assert_eq!(map.invoke("missing", 1), None);
        assert!(matches!(map["plain"], Slot::Data(3)));
    }

    #[test]
    fn clone_copies_changes_not_callbacks() {
        let mut map: TrackedMap<i32> = TrackedMap::new();
        map.set_save_callback(|_, _| Ok(()));
        map.set("a", 1).unwrap();

        let copy = map.clone();
        assert_eq!(copy.changes(), map.changes());
        assert!(!copy.has_save_callback());
    }
}
