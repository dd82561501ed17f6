//! Error types shared by both map strategies.

use thiserror::Error;

/// A map operation was called with an argument it cannot accept.
///
/// Every variant is recoverable: the failing call leaves the map exactly as
/// it was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidArgument {
    /// The key was `None`.
    #[error("invalid argument: key is absent")]
    AbsentKey,
    /// `insert` was given a key that already has a live entry.
    #[error("invalid argument: key is already present")]
    DuplicateKey,
    /// `remove`, `put` or `get` was given a key with no live entry.
    #[error("invalid argument: no entry for key")]
    MissingKey,
}

/// Failure to advance a [`Keys`](crate::Keys) iterator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IterError {
    /// The map was inserted into or removed from after the iterator was created.
    #[error("map was structurally modified during iteration")]
    ConcurrentModification,
    /// The iterator was advanced past its last key.
    #[error("no more keys in iteration")]
    NoSuchElement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_condition() {
        assert_eq!(
            InvalidArgument::AbsentKey.to_string(),
            "invalid argument: key is absent"
        );
        assert_eq!(
            InvalidArgument::DuplicateKey.to_string(),
            "invalid argument: key is already present"
        );
        assert_eq!(
            IterError::ConcurrentModification.to_string(),
            "map was structurally modified during iteration"
        );
    }

    #[test]
    fn errors_are_std_errors() {
        fn assert_error<E: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvalidArgument>();
        assert_error::<IterError>();
    }
}
