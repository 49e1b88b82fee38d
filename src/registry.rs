//! StoreRegistry - Process-wide lookup from entity-type key to its Store.
//!
//! Built once at the composition root and passed down explicitly; there is
//! deliberately no hidden global. Misconfiguration (duplicate or missing
//! keys) is a startup-time programming error and fails hard, never a silent
//! substitution with an empty store.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use crate::payload::Payload;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The key was already registered; duplicate registration is a
    /// programming error, not a recoverable condition.
    Duplicate(String),
    /// The key was never registered.
    Missing(String),
    /// The slot exists but holds a store of a different payload type.
    TypeMismatch(String),
    LockPoisoned(&'static str),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Duplicate(key) => {
                write!(f, "store already registered for key {}", key)
            }
            RegistryError::Missing(key) => write!(f, "no store registered for key {}", key),
            RegistryError::TypeMismatch(key) => {
                write!(f, "store registered for key {} has a different payload type", key)
            }
            RegistryError::LockPoisoned(operation) => {
                write!(f, "registry lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Type-erased slot so heterogeneous stores can live in one map while still
/// being resettable as a group.
trait AnyStore: Send + Sync {
    fn clear(&self) -> Result<(), StoreError>;
    fn as_any(&self) -> &dyn Any;
}

impl<P: Payload> AnyStore for Store<P> {
    fn clear(&self) -> Result<(), StoreError> {
        Store::clear(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Mapping from `Payload::COLLECTION` key to the singleton Store instance.
#[derive(Default)]
pub struct StoreRegistry {
    slots: RwLock<HashMap<String, Box<dyn AnyStore>>>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        StoreRegistry::default()
    }

    /// Register the Store for `P::COLLECTION`. Fails on duplicates.
    pub fn register<P: Payload>(&self, store: Store<P>) -> Result<(), RegistryError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| RegistryError::LockPoisoned("register"))?;
        if slots.contains_key(P::COLLECTION) {
            return Err(RegistryError::Duplicate(P::COLLECTION.to_string()));
        }
        slots.insert(P::COLLECTION.to_string(), Box::new(store));
        Ok(())
    }

    /// Look up the Store for `P::COLLECTION`. Fails if it was never
    /// registered.
    pub fn get<P: Payload>(&self) -> Result<Store<P>, RegistryError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RegistryError::LockPoisoned("get"))?;
        let slot = slots
            .get(P::COLLECTION)
            .ok_or_else(|| RegistryError::Missing(P::COLLECTION.to_string()))?;
        slot.as_any()
            .downcast_ref::<Store<P>>()
            .cloned()
            .ok_or_else(|| RegistryError::TypeMismatch(P::COLLECTION.to_string()))
    }

    /// Non-throwing existence check for optional integrations.
    pub fn has(&self, key: &str) -> bool {
        self.slots
            .read()
            .map(|slots| slots.contains_key(key))
            .unwrap_or(false)
    }

    /// Registered keys, unordered.
    pub fn keys(&self) -> Vec<String> {
        self.slots
            .read()
            .map(|slots| slots.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Reset every registered store to empty. Used on logout/tenant switch;
    /// registrations themselves are kept.
    pub fn clear_all(&self) -> Result<(), RegistryError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| RegistryError::LockPoisoned("clear_all"))?;
        for slot in slots.values() {
            slot.clear()
                .map_err(|_| RegistryError::LockPoisoned("store clear"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Invoice {
        id: String,
        total: i64,
    }

    impl Payload for Invoice {
        const COLLECTION: &'static str = "invoices";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn new_store() -> Store<Invoice> {
        Store::new(Arc::new(InMemoryTransport::new()))
    }

    #[test]
    fn register_then_get_returns_the_same_collection() {
        let registry = StoreRegistry::new();
        registry.register(new_store()).unwrap();
        assert_eq!(registry.keys(), vec!["invoices".to_string()]);

        let a = registry.get::<Invoice>().unwrap();
        a.upsert(Invoice {
            id: "inv-1".into(),
            total: 100,
        })
        .unwrap();

        let b = registry.get::<Invoice>().unwrap();
        assert!(b.has("inv-1").unwrap());
    }

    #[test]
    fn duplicate_registration_errors() {
        let registry = StoreRegistry::new();
        registry.register(new_store()).unwrap();
        let err = registry.register(new_store()).unwrap_err();
        assert_eq!(err, RegistryError::Duplicate("invoices".to_string()));
    }

    #[test]
    fn missing_key_errors_and_has_does_not() {
        let registry = StoreRegistry::new();
        let err = registry.get::<Invoice>().unwrap_err();
        assert_eq!(err, RegistryError::Missing("invoices".to_string()));
        assert!(!registry.has("invoices"));
        assert!(!registry.has("nonexistent"));
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn clear_all_empties_every_store_but_keeps_registrations() {
        let registry = StoreRegistry::new();
        registry.register(new_store()).unwrap();
        let store = registry.get::<Invoice>().unwrap();
        store
            .upsert(Invoice {
                id: "inv-1".into(),
                total: 5,
            })
            .unwrap();

        registry.clear_all().unwrap();
        assert!(registry.has("invoices"));
        assert!(registry.get::<Invoice>().unwrap().is_empty().unwrap());
    }
}
