//! EntityRepository - Typed transport wrapper, one operation group per entity type.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::payload::Payload;
use crate::transport::{Transport, TransportError};

/// Typed repository for one entity type's transport operations.
///
/// Documents are derived from `P::COLLECTION`, so `"organizations"` gets
/// `organizations.byIds`, `organizations.list`, `organizations.save`, and
/// `organizations.archive`. Results decode into payloads; decode failures
/// surface as [`TransportError::Decode`].
pub struct EntityRepository<P> {
    transport: Arc<dyn Transport>,
    _marker: PhantomData<P>,
}

impl<P> Clone for EntityRepository<P> {
    fn clone(&self) -> Self {
        EntityRepository {
            transport: Arc::clone(&self.transport),
            _marker: PhantomData,
        }
    }
}

impl<P: Payload> EntityRepository<P> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            _marker: PhantomData,
        }
    }

    fn document(operation: &str) -> String {
        format!("{}.{}", P::COLLECTION, operation)
    }

    fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, TransportError> {
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Fetch a single entity. `Ok(None)` when the server no longer has it.
    pub fn fetch_one(&self, id: &str) -> Result<Option<P>, TransportError> {
        let value = self
            .transport
            .request(&Self::document("byId"), json!({ "id": id }))?;
        Self::decode(value)
    }

    /// Fetch a specific set of ids. Ids the server dropped are simply absent
    /// from the result.
    pub fn fetch_many(&self, ids: &[String]) -> Result<Vec<P>, TransportError> {
        let value = self
            .transport
            .request(&Self::document("byIds"), json!({ "ids": ids }))?;
        Self::decode(value)
    }

    /// Fetch the full collection.
    pub fn fetch_all(&self) -> Result<Vec<P>, TransportError> {
        let value = self.transport.request(&Self::document("list"), json!({}))?;
        Self::decode(value)
    }

    /// Persist a payload and return the server echo (which may normalize
    /// fields or assign the definitive id).
    pub fn save(&self, payload: &P) -> Result<P, TransportError> {
        let variables = serde_json::to_value(payload)
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        let value = self.transport.request(&Self::document("save"), variables)?;
        Self::decode(value)
    }

    /// Archive an entity. Returns whether the server acknowledged it.
    pub fn archive(&self, id: &str) -> Result<bool, TransportError> {
        let value = self
            .transport
            .request(&Self::document("archive"), json!({ "id": id }))?;
        Self::decode(value)
    }
}
