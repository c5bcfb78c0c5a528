// ============================================================================
// observable-map - Core
// Keys, shared types, errors and the value-level extension traits
// ============================================================================

pub mod error;
pub mod invoke;
pub mod key;
pub mod merge;
pub mod types;
