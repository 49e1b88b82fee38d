//! Store - Identity-keyed collection of Records for one entity type.

mod error;
mod store;
mod sync;

pub use error::StoreError;
pub use store::{Store, StoreState};
pub use sync::{SyncAction, SyncRequest};
