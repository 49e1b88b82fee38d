//! Payload - Typed entity payloads keyed by a stable string id.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A server-shaped entity payload owned by a [`crate::Store`].
///
/// One implementation per entity type. `COLLECTION` is the type key used by
/// the registry and to derive transport documents (e.g. `"organizations"`),
/// and `id()` is the identity accessor over the payload's own fields.
pub trait Payload:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Collection/type key, unique across the application.
    const COLLECTION: &'static str;

    /// Stable string id. Empty only before an id has been assigned.
    fn id(&self) -> &str;
}

static NEXT_TEMP_ID: AtomicU64 = AtomicU64::new(1);

/// Generate a process-unique temporary id for an optimistically created
/// entity that has not yet been saved. Swapped for the server-assigned id
/// via [`crate::Store::rekey`] after the first successful save.
pub fn temp_id() -> String {
    let id = NEXT_TEMP_ID.fetch_add(1, Ordering::Relaxed);
    format!("tmp-{}", id)
}

/// Whether an id was produced by [`temp_id`] and still awaits a server id.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with("tmp-")
}
