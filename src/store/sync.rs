/// How [`crate::Store::sync`] reconciles the given ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncAction {
    /// The ids are now known-relevant (e.g. newly created elsewhere).
    /// Already-present Records are left as-is; missing ones are fetched
    /// best-effort.
    Append,
    /// The ids are stale: refetch exactly those ids and overwrite their
    /// Records with server truth. Ids the server no longer returns are
    /// dropped from the collection.
    Invalidate,
}

/// A reconciliation request against a subset of the collection.
#[derive(Clone, Debug)]
pub struct SyncRequest {
    pub action: SyncAction,
    pub ids: Vec<String>,
}

impl SyncRequest {
    pub fn append(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SyncRequest {
            action: SyncAction::Append,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    pub fn invalidate(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SyncRequest {
            action: SyncAction::Invalidate,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}
