//! ChangeEmitter - Subscribe/publish surface for store change notification.
//!
//! Core logic depends on this thin wrapper rather than any reactivity
//! runtime; UI-equivalent consumers register listeners per topic and receive
//! the affected entity id as the payload.

use std::sync::{Arc, Mutex};

use event_emitter_rs::EventEmitter;

/// Topic names published by [`crate::Store`].
pub mod topics {
    /// A Record was added to the collection (query result or local create).
    pub const RECORD_ADDED: &str = "record.added";
    /// A Record's draft was committed.
    pub const RECORD_COMMITTED: &str = "record.committed";
    /// A Record's draft was rolled back to its baseline.
    pub const RECORD_ROLLED_BACK: &str = "record.rolled_back";
    /// A Record was overwritten with fresh server truth.
    pub const RECORD_INVALIDATED: &str = "record.invalidated";
    /// A Record's temporary id was swapped for a server-assigned id.
    pub const RECORD_REKEYED: &str = "record.rekeyed";
    /// A Record was removed from the collection.
    pub const RECORD_REMOVED: &str = "record.removed";
    /// A full-collection fetch completed and replaced the collection.
    pub const STORE_LOADED: &str = "store.loaded";
}

/// Shared event emitter. Clone-friendly via Arc; emission is best-effort
/// (a poisoned listener lock drops the notification rather than failing the
/// store operation that triggered it).
#[derive(Clone)]
pub struct ChangeEmitter {
    inner: Arc<Mutex<EventEmitter>>,
}

impl Default for ChangeEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeEmitter {
    pub fn new() -> Self {
        ChangeEmitter {
            inner: Arc::new(Mutex::new(EventEmitter::new())),
        }
    }

    /// Register a listener for a topic. The listener receives the entity id
    /// (or the collection key for store-level topics).
    pub fn on<F>(&self, topic: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        if let Ok(mut emitter) = self.inner.lock() {
            emitter.on(topic, listener);
        }
    }

    /// Publish a topic with the given subject id.
    pub fn emit(&self, topic: &str, subject: &str) {
        if let Ok(mut emitter) = self.inner.lock() {
            emitter.emit(topic, subject.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn listener_receives_subject() {
        let emitter = ChangeEmitter::new();
        let (tx, rx) = mpsc::channel::<String>();
        emitter.on(topics::RECORD_ADDED, move |id: String| {
            tx.send(id).unwrap();
        });

        emitter.emit(topics::RECORD_ADDED, "org-1");
        assert_eq!(rx.recv().unwrap(), "org-1");
    }

    #[test]
    fn clones_share_listeners() {
        let emitter = ChangeEmitter::new();
        let clone = emitter.clone();
        let (tx, rx) = mpsc::channel::<String>();
        emitter.on(topics::RECORD_REMOVED, move |id: String| {
            tx.send(id).unwrap();
        });

        clone.emit(topics::RECORD_REMOVED, "org-2");
        assert_eq!(rx.recv().unwrap(), "org-2");
    }
}
