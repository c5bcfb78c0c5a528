// ============================================================================
// observable-map - Collections
// Ordered maps with write callbacks, in two variants
// ============================================================================
//
// ObservableMap: key and positional access over insertion-ordered entries,
// with an optional change callback fired on every write.
//
// TrackedMap: everything ObservableMap does, plus a record of every value
// written since construction (or the last explicit clear) and a save
// callback that receives that record on demand.
//
// Both share the same read surface, generated by `impl_map_reads!` below.
// ============================================================================

// Defined ahead of the submodules so they see it.

/// Read-only surface shared by both map variants.
///
/// Expects the map type to hold its entries in a `store: Store<V>` field.
macro_rules! impl_map_reads {
    ([$($gen:ident),*] $ty:ty) => {
        impl<$($gen),*> $ty {
            // =================================================================
            // SIZE
            // =================================================================

            /// Number of entries.
            pub fn len(&self) -> usize {
                self.store.len()
            }

            /// Returns true if the map holds no entries.
            pub fn is_empty(&self) -> bool {
                self.store.len() == 0
            }

            // =================================================================
            // KEY ACCESS
            // =================================================================

            /// The value bound to `key`, or `None` when the key is absent.
            ///
            /// Accepts any key form: `map.get("name")`, `map.get(&3)`,
            /// `map.get(&key)`. Canonical integer strings find index keys.
            pub fn get<Q: $crate::core::key::AsKey + ?Sized>(&self, key: &Q) -> Option<&V> {
                self.store.get(key)
            }

            /// Returns true if `key` is currently bound.
            pub fn contains_key<Q: $crate::core::key::AsKey + ?Sized>(&self, key: &Q) -> bool {
                self.store.contains_key(key)
            }

            // =================================================================
            // ITERATION
            // =================================================================

            /// Entries in insertion order. Independent of the shared cursor.
            pub fn iter(&self) -> indexmap::map::Iter<'_, $crate::core::key::Key, V> {
                self.store.iter()
            }

            pub fn keys(&self) -> indexmap::map::Keys<'_, $crate::core::key::Key, V> {
                self.store.keys()
            }

            pub fn values(&self) -> indexmap::map::Values<'_, $crate::core::key::Key, V> {
                self.store.values()
            }

            // =================================================================
            // CURSOR
            // =================================================================
            //
            // One restartable cursor per map. Two walks over the same map
            // through these methods interfere; use `iter()` for independent
            // passes. Mutating the map mid-walk leaves the cursor at the same
            // position, whatever entry that now is.

            /// Move the cursor back to the first entry and return it.
            pub fn rewind(&mut self) -> Option<(&$crate::core::key::Key, &V)> {
                self.store.rewind()
            }

            /// Value at the cursor, or `None` once exhausted.
            pub fn current(&self) -> Option<&V> {
                self.store.current_entry().map(|(_, v)| v)
            }

            /// Key at the cursor, or `None` once exhausted.
            pub fn key(&self) -> Option<&$crate::core::key::Key> {
                self.store.current_entry().map(|(k, _)| k)
            }

            /// Step the cursor forward and return the entry it lands on.
            pub fn advance(&mut self) -> Option<(&$crate::core::key::Key, &V)> {
                self.store.advance()
            }

            /// Returns true while the cursor points at an entry.
            pub fn valid(&self) -> bool {
                self.store.valid()
            }

            // =================================================================
            // EXPORT
            // =================================================================

            /// Borrowed view of the entries.
            pub fn entries(&self) -> &$crate::core::types::Entries<V> {
                self.store.entries()
            }

            /// Owned copy of the entries, in order.
            pub fn to_entries(&self) -> $crate::core::types::Entries<V>
            where
                V: Clone,
            {
                self.store.entries().clone()
            }

            /// Consume the map, keeping only its entries.
            pub fn into_entries(self) -> $crate::core::types::Entries<V> {
                self.store.into_entries()
            }

            /// Snapshot the entries as a structured record.
            ///
            /// Index keys become decimal field names.
            pub fn to_record<T>(&self) -> $crate::core::error::Result<T>
            where
                T: serde::de::DeserializeOwned,
                V: serde::Serialize,
            {
                $crate::collections::store::entries_to_record(self.store.entries())
            }
        }

        impl<'a, $($gen),*> IntoIterator for &'a $ty {
            type Item = (&'a $crate::core::key::Key, &'a V);
            type IntoIter = indexmap::map::Iter<'a, $crate::core::key::Key, V>;

            fn into_iter(self) -> Self::IntoIter {
                self.store.iter()
            }
        }

        impl<Q: $crate::core::key::AsKey + ?Sized, $($gen),*> std::ops::Index<&Q> for $ty {
            type Output = V;

            /// # Panics
            ///
            /// Panics if the key is not present. Use `get` to check first.
            fn index(&self, key: &Q) -> &V {
                match self.store.get(key) {
                    Some(value) => value,
                    None => panic!("no entry for key `{}`", key.as_key_ref().to_key()),
                }
            }
        }

        impl<$($gen),*> serde::Serialize for $ty
        where
            V: serde::Serialize,
        {
            fn serialize<Ser: serde::Serializer>(
                &self,
                serializer: Ser,
            ) -> Result<Ser::Ok, Ser::Error> {
                serializer.collect_map(self.store.iter())
            }
        }
    };
}

mod callback;
mod observable;
mod store;
mod tracked;

pub use observable::ObservableMap;
pub use tracked::TrackedMap;
