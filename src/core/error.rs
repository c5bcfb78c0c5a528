// ============================================================================
// observable-map - Errors
// ============================================================================

use thiserror::Error;

use super::key::Key;
use super::types::BoxError;

/// Errors surfaced by map operations.
///
/// The map never fails on its own during reads and writes: callback failures
/// are wrapped and handed back, and record conversion can reject its input.
#[derive(Debug, Error)]
pub enum Error {
    /// The change callback failed. The write it reported had already been applied.
    #[error("change callback failed for key `{key}`")]
    ChangeCallback {
        key: Key,
        #[source]
        source: BoxError,
    },

    /// The save callback failed.
    #[error("save callback failed")]
    SaveCallback(#[source] BoxError),

    /// A record or snapshot could not be converted through serde.
    #[error("record conversion failed")]
    Record(#[from] serde_json::Error),

    /// A record serialized to something other than an object.
    #[error("expected a record serializing to an object, found {0}")]
    NotARecord(&'static str),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn change_callback_error_keeps_source() {
        let err = Error::ChangeCallback {
            key: Key::from("a"),
            source: "disk full".into(),
        };
        assert_eq!(err.to_string(), "change callback failed for key `a`");
        assert_eq!(err.source().map(|s| s.to_string()), Some("disk full".into()));
    }

    #[test]
    fn not_a_record_message() {
        let err = Error::NotARecord("array");
        assert_eq!(
            err.to_string(),
            "expected a record serializing to an object, found array"
        );
    }
}
