use std::fmt;

use crate::transport::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    LockPoisoned(&'static str),
    /// The id is not in the collection. Treated as a caller bug or a race
    /// (entity archived elsewhere); callers null-check and abort gracefully.
    NotFound {
        collection: &'static str,
        id: String,
    },
    /// A read-path fetch failed; the previous collection state is untouched.
    Fetch(TransportError),
    /// A save failed after the commit already marked the record clean; the
    /// optimistic value is still in place and only an explicit rollback
    /// restores the baseline.
    Save(TransportError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "store lock poisoned during {}", operation)
            }
            StoreError::NotFound { collection, id } => {
                write!(f, "{} entity {} not found in store", collection, id)
            }
            StoreError::Fetch(err) => write!(f, "fetch failed: {}", err),
            StoreError::Save(err) => write!(f, "save failed: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}
