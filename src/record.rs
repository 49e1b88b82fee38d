//! Record - One entity instance with optimistic draft/commit/rollback.

use crate::payload::Payload;

/// Options for [`Record::commit`] and [`crate::Store::commit`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Finalize local state without triggering a save; used when the caller
    /// has already scheduled persistence separately and a second request
    /// would be a duplicate.
    pub sync_only: bool,
}

impl CommitOptions {
    /// Shorthand for `CommitOptions { sync_only: true }`.
    pub fn sync_only() -> Self {
        CommitOptions { sync_only: true }
    }
}

/// Wraps one entity payload with identity, dirty-tracking, and rollback.
///
/// A Record performs no I/O and cannot fail: persistence and failure handling
/// belong to the owning Store and its callers. In particular, a rejected save
/// does NOT roll the value back — restoring the baseline after a failed save
/// is an explicit caller obligation via [`Record::rollback`].
#[derive(Clone, Debug)]
pub struct Record<P: Payload> {
    value: P,
    server_value: P,
    baseline: Option<P>,
    dirty: bool,
}

impl<P: Payload> Record<P> {
    /// Wrap a payload received from the server.
    pub fn from_server(payload: P) -> Self {
        Record {
            value: payload.clone(),
            server_value: payload,
            baseline: None,
            dirty: false,
        }
    }

    /// Entity id, taken from the current value.
    pub fn id(&self) -> &str {
        self.value.id()
    }

    /// Current, possibly locally mutated, copy of the payload.
    pub fn value(&self) -> &P {
        &self.value
    }

    /// Last server-acknowledged copy, used for diffs and rollback targets.
    pub fn server_value(&self) -> &P {
        &self.server_value
    }

    /// True between a `draft()` call and a matching `commit()`.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether the current value has diverged from the server copy.
    pub fn has_local_changes(&self) -> bool {
        self.value != self.server_value
    }

    /// Begin (or continue) a local edit and return the mutable draft surface.
    ///
    /// Idempotent: calling while already drafting keeps the existing rollback
    /// baseline rather than re-snapshotting a half-edited value.
    pub fn draft(&mut self) -> &mut P {
        if !self.dirty {
            self.baseline = Some(self.value.clone());
            self.dirty = true;
        }
        &mut self.value
    }

    /// End the local edit. After this call `is_dirty()` is false regardless
    /// of any network outcome; the baseline is retained so an explicit
    /// [`Record::rollback`] can still undo the edit if a save fails.
    pub fn commit(&mut self, _options: CommitOptions) {
        self.dirty = false;
    }

    /// Restore `value` from the last draft baseline, discarding the edit.
    /// Returns false when there is no baseline to restore.
    pub fn rollback(&mut self) -> bool {
        match self.baseline.take() {
            Some(baseline) => {
                self.value = baseline;
                self.dirty = false;
                true
            }
            None => false,
        }
    }

    /// Overwrite both copies with server truth, dropping any local edit.
    ///
    /// Reconciliation is last-resolution-wins: a response that lands after a
    /// newer local edit still overwrites it.
    pub fn apply_server(&mut self, payload: P) {
        self.value = payload.clone();
        self.server_value = payload;
        self.baseline = None;
        self.dirty = false;
    }

    /// Two Records are the same entity iff their ids match; field-level
    /// equality is never assumed.
    pub fn same_entity(&self, other: &Record<P>) -> bool {
        self.id() == other.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Payload for Note {
        const COLLECTION: &'static str = "notes";
        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(body: &str) -> Note {
        Note {
            id: "n-1".into(),
            body: body.into(),
        }
    }

    #[test]
    fn draft_then_commit_keeps_edit() {
        let mut record = Record::from_server(note("original"));
        record.draft().body = "edited".into();
        assert!(record.is_dirty());
        record.commit(CommitOptions::sync_only());
        assert!(!record.is_dirty());
        assert_eq!(record.value().body, "edited");
        assert_eq!(record.server_value().body, "original");
    }

    #[test]
    fn draft_is_idempotent() {
        let mut record = Record::from_server(note("original"));
        record.draft().body = "first".into();
        // second draft must keep the original baseline, not snapshot "first"
        record.draft().body = "second".into();
        assert!(record.rollback());
        assert_eq!(record.value().body, "original");
    }

    #[test]
    fn rollback_after_commit_restores_baseline() {
        let mut record = Record::from_server(note("original"));
        record.draft().body = "edited".into();
        record.commit(CommitOptions::default());
        assert!(!record.is_dirty());
        assert!(record.rollback());
        assert_eq!(record.value().body, "original");
    }

    #[test]
    fn rollback_without_draft_is_noop() {
        let mut record = Record::from_server(note("original"));
        assert!(!record.rollback());
        assert_eq!(record.value().body, "original");
    }

    #[test]
    fn fresh_draft_after_commit_resnapshots() {
        let mut record = Record::from_server(note("v1"));
        record.draft().body = "v2".into();
        record.commit(CommitOptions::sync_only());
        record.draft().body = "v3".into();
        assert!(record.rollback());
        assert_eq!(record.value().body, "v2");
    }

    #[test]
    fn apply_server_overwrites_local_edit() {
        let mut record = Record::from_server(note("local"));
        record.draft().body = "newer local".into();
        record.apply_server(note("server"));
        assert!(!record.is_dirty());
        assert_eq!(record.value().body, "server");
        assert_eq!(record.server_value().body, "server");
        assert!(!record.rollback());
    }

    #[test]
    fn has_local_changes_tracks_divergence() {
        let mut record = Record::from_server(note("same"));
        assert!(!record.has_local_changes());
        record.draft().body = "diverged".into();
        assert!(record.has_local_changes());
    }

    #[test]
    fn same_entity_compares_ids_only() {
        let a = Record::from_server(note("one"));
        let b = Record::from_server(note("completely different"));
        assert!(a.same_entity(&b));
    }
}
