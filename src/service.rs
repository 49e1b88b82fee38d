//! EntityService - Domain operations over one entity type's repository.
//!
//! Converts transport rejections into domain errors so expected failures
//! travel as values: callers branch on the `Result` and decide whether to
//! roll back an optimistic edit, show a toast, or degrade silently. Nothing
//! here mutates a Store — applying results is the calling usecase's job.

use std::fmt;
use std::sync::Arc;

use crate::payload::Payload;
use crate::repository::EntityRepository;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Transport/network failure, already logged.
    Transport(TransportError),
    /// The input was rejected before any request was issued (duplicate
    /// email, invalid domain, missing id). Never written into a Store.
    Validation(String),
    /// The server no longer has the entity.
    NotFound(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Transport(err) => write!(f, "transport error: {}", err),
            ServiceError::Validation(message) => write!(f, "validation failed: {}", message),
            ServiceError::NotFound(id) => write!(f, "entity {} not found", id),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<TransportError> for ServiceError {
    fn from(err: TransportError) -> Self {
        ServiceError::Transport(err)
    }
}

/// Typed domain service for one entity type.
pub struct EntityService<P> {
    repo: EntityRepository<P>,
}

impl<P> Clone for EntityService<P> {
    fn clone(&self) -> Self {
        EntityService {
            repo: self.repo.clone(),
        }
    }
}

impl<P: Payload> EntityService<P> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            repo: EntityRepository::new(transport),
        }
    }

    fn log_failure(operation: &str, err: &TransportError) {
        tracing::warn!(
            collection = P::COLLECTION,
            operation,
            error = %err,
            "service operation failed"
        );
    }

    /// Persist a new entity and return the server echo (with the definitive
    /// id when the payload carried a temporary one).
    pub fn create(&self, payload: &P) -> Result<P, ServiceError> {
        if payload.id().is_empty() {
            return Err(ServiceError::Validation("payload has no id".to_string()));
        }
        self.repo.save(payload).map_err(|err| {
            Self::log_failure("create", &err);
            err.into()
        })
    }

    /// Persist changes to an existing entity and return the server echo.
    pub fn update(&self, payload: &P) -> Result<P, ServiceError> {
        if payload.id().is_empty() {
            return Err(ServiceError::Validation("payload has no id".to_string()));
        }
        self.repo.save(payload).map_err(|err| {
            Self::log_failure("update", &err);
            err.into()
        })
    }

    /// Load one entity.
    pub fn load(&self, id: &str) -> Result<P, ServiceError> {
        let found = self.repo.fetch_one(id).map_err(|err| {
            Self::log_failure("load", &err);
            ServiceError::from(err)
        })?;
        found.ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    /// Load a set of ids; ids the server dropped are absent from the result.
    pub fn load_many(&self, ids: &[String]) -> Result<Vec<P>, ServiceError> {
        self.repo.fetch_many(ids).map_err(|err| {
            Self::log_failure("load_many", &err);
            err.into()
        })
    }

    /// Archive an entity; true when the server acknowledged it.
    pub fn archive(&self, id: &str) -> Result<bool, ServiceError> {
        self.repo.archive(id).map_err(|err| {
            Self::log_failure("archive", &err);
            err.into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::InMemoryTransport;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Agent {
        id: String,
        name: String,
    }

    impl Payload for Agent {
        const COLLECTION: &'static str = "agents";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn service_with(transport: &InMemoryTransport) -> EntityService<Agent> {
        EntityService::new(Arc::new(transport.clone()))
    }

    #[test]
    fn create_returns_server_echo() {
        let transport = InMemoryTransport::new();
        transport.respond("agents.save", json!({"id": "a-1", "name": "Scout"}));

        let echo = service_with(&transport)
            .create(&Agent {
                id: "tmp-1".into(),
                name: "Scout".into(),
            })
            .unwrap();
        assert_eq!(echo.id, "a-1");
    }

    #[test]
    fn create_without_id_is_a_validation_error() {
        let transport = InMemoryTransport::new();
        let err = service_with(&transport)
            .create(&Agent {
                id: String::new(),
                name: "Scout".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        // rejected before any request went out
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn load_missing_is_not_found() {
        let transport = InMemoryTransport::new();
        transport.respond("agents.byId", json!(null));

        let err = service_with(&transport).load("gone").unwrap_err();
        assert_eq!(err, ServiceError::NotFound("gone".to_string()));
    }

    #[test]
    fn transport_failure_becomes_a_value() {
        let transport = InMemoryTransport::new();
        transport.fail("agents.archive", "502");

        let err = service_with(&transport).archive("a-1").unwrap_err();
        assert!(matches!(err, ServiceError::Transport(_)));
    }
}
