mod emitter;
mod payload;
mod record;
mod registry;
mod repository;
mod service;
mod session;
mod store;
mod transport;

pub use emitter::{topics, ChangeEmitter};
pub use payload::{is_temp_id, temp_id, Payload};
pub use record::{CommitOptions, Record};
pub use registry::{RegistryError, StoreRegistry};
pub use repository::EntityRepository;
pub use service::{EntityService, ServiceError};
pub use session::{Session, Toast, ToastLevel, UiFeedback};
pub use store::{Store, StoreError, StoreState, SyncAction, SyncRequest};
pub use transport::{InMemoryTransport, Transport, TransportError};

// Re-export the EventEmitter from the event_emitter_rs crate for callers
// that want to wire change listeners without going through ChangeEmitter.
pub use event_emitter_rs::EventEmitter;
