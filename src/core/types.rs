// ============================================================================
// observable-map - Type Definitions
// Shared aliases for entry storage and callback signatures
// ============================================================================

use std::rc::Rc;

use indexmap::IndexMap;

use super::key::Key;

/// Insertion-ordered key/value storage. Used for entries, tracked changes
/// and every exported snapshot.
pub type Entries<V> = IndexMap<Key, V>;

/// Error type callbacks may fail with. Passed through to the caller untouched.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result returned by user callbacks.
pub type CallbackResult<T = ()> = Result<T, BoxError>;

/// Change callback: runs after every write with the map, the key written and
/// the value written. Shared so a running callback can write to its own map
/// and be dispatched again.
pub type ChangeFn<M, V> = Rc<dyn Fn(&mut M, &Key, &V) -> CallbackResult>;

/// Save callback: runs on explicit save with the map and a snapshot of the
/// accumulated changes.
pub type SaveFn<M, V, S> = Rc<dyn Fn(&mut M, &Entries<V>) -> CallbackResult<S>>;
