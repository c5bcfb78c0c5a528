// ============================================================================
// observable-map - Callback Slot
// Holds a registered callback and dispatches it against its own map
// ============================================================================
//
// Callbacks are shared handles (`Rc<dyn Fn>`). Dispatch clones the handle
// out of the slot before calling it, so the callback can take `&mut` access
// to the map that owns it, write to it (firing itself again for each of
// those writes), or swap itself out. A replacement registered mid-call
// applies to every dispatch that starts after it; the running call finishes
// on the handle it started with.
// ============================================================================

use tracing::debug;

use crate::core::error::{Error, Result};
use crate::core::key::Key;
use crate::core::types::ChangeFn;

pub(crate) struct CallbackSlot<F> {
    callback: Option<F>,
}

impl<F: Clone> CallbackSlot<F> {
    pub(crate) fn new(callback: Option<F>) -> Self {
        Self { callback }
    }

    pub(crate) fn empty() -> Self {
        Self::new(None)
    }

    pub(crate) fn is_set(&self) -> bool {
        self.callback.is_some()
    }

    /// Register or clear the callback. Takes effect on the next dispatch.
    pub(crate) fn replace(&mut self, callback: Option<F>) {
        self.callback = callback;
    }

    /// A clone of the registered handle, independent of the slot's borrow.
    pub(crate) fn current(&self) -> Option<F> {
        self.callback.clone()
    }
}

/// Report a write that has already been applied to `map`.
pub(crate) fn dispatch_change<M, V>(
    map: &mut M,
    callback: ChangeFn<M, V>,
    key: Key,
    value: &V,
) -> Result<()> {
    debug!(%key, "dispatching change callback");
    callback(map, &key, value).map_err(|source| Error::ChangeCallback { key, source })
}
