// ============================================================================
// observable-map - Deep Merge
// Recursive replace: nested containers merge, everything else is overwritten
// ============================================================================

use serde_json::Value;

use super::types::Entries;

/// Values that can absorb a patch recursively.
///
/// Two mappings merge key by key and two sequences merge position by
/// position, with patch items past the end appended. Any other pairing is
/// replaced wholesale by the patch.
pub trait DeepMerge {
    fn deep_merge(&mut self, patch: Self);
}

impl DeepMerge for Value {
    fn deep_merge(&mut self, patch: Self) {
        match (self, patch) {
            (Value::Object(base), Value::Object(patch)) => {
                for (key, value) in patch {
                    match base.get_mut(&key) {
                        Some(existing) => existing.deep_merge(value),
                        None => {
                            base.insert(key, value);
                        }
                    }
                }
            }
            (Value::Array(base), Value::Array(patch)) => {
                for (i, value) in patch.into_iter().enumerate() {
                    match base.get_mut(i) {
                        Some(existing) => existing.deep_merge(value),
                        None => base.push(value),
                    }
                }
            }
            (slot, patch) => *slot = patch,
        }
    }
}

impl<V: DeepMerge> DeepMerge for Entries<V> {
    fn deep_merge(&mut self, patch: Self) {
        for (key, value) in patch {
            match self.get_mut(&key) {
                Some(existing) => existing.deep_merge(value),
                None => {
                    self.insert(key, value);
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
