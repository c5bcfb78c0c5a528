// ============================================================================
// observable-map - Observable, Change-Tracking Ordered Maps
// ============================================================================
//
// A key/value container that reads like a map and walks like a sequence,
// and tells a callback about every write.
//
// - ObservableMap: ordered entries + change callback
// - TrackedMap: ordered entries + change callback + change record + save hook
//
// Everything is single-threaded and synchronous. Callbacks run inline on
// the writing call and their errors come straight back to the caller.
// ============================================================================

pub mod collections;
pub mod core;

mod macros;

// Re-export core items at crate root
pub use crate::core::error::{Error, Result};
pub use crate::core::invoke::Invoke;
pub use crate::core::key::{AsKey, Key, KeyRef};
pub use crate::core::merge::DeepMerge;
pub use crate::core::types::{BoxError, CallbackResult, ChangeFn, Entries, SaveFn};

// Re-export collections
pub use collections::{ObservableMap, TrackedMap};

// =============================================================================
// TESTS
// =============================================================================
