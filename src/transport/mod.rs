//! Transport - Opaque request boundary to the GraphQL-style backends.

mod error;
mod in_memory;

pub use error::TransportError;
pub use in_memory::InMemoryTransport;

use serde_json::Value;

/// A single request/response capability over the wire.
///
/// Documents are opaque operation names (e.g. `"organizations.save"`) and
/// variables/results are JSON values; retry policy, auth, and batching are
/// the implementation's concern, never the store's. A failed request
/// surfaces as an [`TransportError`], which upper layers convert into
/// domain errors rather than letting it escape as a panic.
pub trait Transport: Send + Sync {
    fn request(&self, document: &str, variables: Value) -> Result<Value, TransportError>;
}
