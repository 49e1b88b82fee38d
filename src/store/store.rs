//! Store - Owns the Records of one entity type and mediates server reconciliation.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::emitter::{topics, ChangeEmitter};
use crate::payload::Payload;
use crate::record::{CommitOptions, Record};
use crate::repository::EntityRepository;
use crate::transport::Transport;

use super::error::StoreError;
use super::sync::{SyncAction, SyncRequest};

/// Collection load state. Partial invalidates never leave `Loaded`; only the
/// full-collection fetch passes through `Loading`, and reads stay available
/// the whole time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreState {
    Empty,
    Loading,
    Loaded,
}

struct Inner<P: Payload> {
    records: IndexMap<String, Record<P>>,
    state: StoreState,
}

/// Identity-keyed, insertion-ordered collection of [`Record`]s for one
/// entity type.
///
/// The Store is the only writer of collection membership; callers mutate
/// individual Records through [`Store::draft`]/[`Store::commit`] and trigger
/// reconciliation through [`Store::sync`]. Clone-friendly via Arc — clones
/// share the collection, which is how unrelated parts of an application
/// reach the same data.
pub struct Store<P: Payload> {
    inner: Arc<RwLock<Inner<P>>>,
    fetching: Arc<AtomicBool>,
    repo: EntityRepository<P>,
    emitter: ChangeEmitter,
}

impl<P: Payload> Clone for Store<P> {
    fn clone(&self) -> Self {
        Store {
            inner: Arc::clone(&self.inner),
            fetching: Arc::clone(&self.fetching),
            repo: self.repo.clone(),
            emitter: self.emitter.clone(),
        }
    }
}

impl<P: Payload> fmt::Debug for Store<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Store");
        debug.field("collection", &P::COLLECTION);
        if let Ok(inner) = self.inner.read() {
            debug
                .field("len", &inner.records.len())
                .field("state", &inner.state);
        }
        debug.finish()
    }
}

/// Resets the single-flight flag when the full fetch finishes, on every exit
/// path.
struct FetchGuard {
    fetching: Arc<AtomicBool>,
}

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.fetching.store(false, Ordering::SeqCst);
    }
}

impl<P: Payload> Store<P> {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Store {
            inner: Arc::new(RwLock::new(Inner {
                records: IndexMap::new(),
                state: StoreState::Empty,
            })),
            fetching: Arc::new(AtomicBool::new(false)),
            repo: EntityRepository::new(transport),
            emitter: ChangeEmitter::new(),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner<P>>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::LockPoisoned("read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner<P>>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::LockPoisoned("write"))
    }

    fn not_found(id: &str) -> StoreError {
        StoreError::NotFound {
            collection: P::COLLECTION,
            id: id.to_string(),
        }
    }

    /// Change-notification surface for this collection.
    pub fn events(&self) -> &ChangeEmitter {
        &self.emitter
    }

    /// Register a listener for one of the [`topics`] constants.
    pub fn on<F>(&self, topic: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.emitter.on(topic, listener);
    }

    pub fn state(&self) -> Result<StoreState, StoreError> {
        Ok(self.read()?.state)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.records.is_empty())
    }

    pub fn has(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.read()?.records.contains_key(id))
    }

    /// O(1) lookup by id. Never touches the network; `Ok(None)` means the
    /// entity is not locally loaded and the caller decides whether to fetch.
    pub fn get_by_id(&self, id: &str) -> Result<Option<Record<P>>, StoreError> {
        Ok(self.read()?.records.get(id).cloned())
    }

    /// Snapshot of all Records in insertion order. Restartable and side
    /// effect free; bounded by what is currently loaded.
    pub fn to_array(&self) -> Result<Vec<Record<P>>, StoreError> {
        Ok(self.read()?.records.values().cloned().collect())
    }

    /// [`Store::to_array`] passed through a caller projection (filter/sort).
    /// The projection must be a pure function of the collection snapshot.
    pub fn to_computed_array<F>(&self, projection: F) -> Result<Vec<Record<P>>, StoreError>
    where
        F: FnOnce(Vec<Record<P>>) -> Vec<Record<P>>,
    {
        Ok(projection(self.to_array()?))
    }

    /// Records whose payload matches a predicate, in insertion order.
    pub fn find<F>(&self, predicate: F) -> Result<Vec<Record<P>>, StoreError>
    where
        F: Fn(&P) -> bool,
    {
        Ok(self
            .read()?
            .records
            .values()
            .filter(|record| predicate(record.value()))
            .cloned()
            .collect())
    }

    /// First Record whose payload matches a predicate.
    pub fn find_one<F>(&self, predicate: F) -> Result<Option<Record<P>>, StoreError>
    where
        F: Fn(&P) -> bool,
    {
        Ok(self
            .read()?
            .records
            .values()
            .find(|record| predicate(record.value()))
            .cloned())
    }

    /// Create-or-overwrite a Record from server-shaped data. This is the
    /// write path for applying a Service result after a create/update.
    pub fn upsert(&self, payload: P) -> Result<(), StoreError> {
        let id = payload.id().to_string();
        let added = {
            let mut inner = self.write()?;
            match inner.records.entry(id.clone()) {
                Entry::Occupied(mut entry) => {
                    entry.get_mut().apply_server(payload);
                    false
                }
                Entry::Vacant(entry) => {
                    entry.insert(Record::from_server(payload));
                    true
                }
            }
        };
        let topic = if added {
            topics::RECORD_ADDED
        } else {
            topics::RECORD_INVALIDATED
        };
        self.emitter.emit(topic, &id);
        Ok(())
    }

    /// Bulk ingest without a network round trip. Marks the collection
    /// `Loaded`; existing Records are overwritten with the given payloads.
    pub fn hydrate(&self, payloads: Vec<P>) -> Result<(), StoreError> {
        {
            let mut inner = self.write()?;
            for payload in payloads {
                let id = payload.id().to_string();
                match inner.records.entry(id) {
                    Entry::Occupied(mut entry) => entry.get_mut().apply_server(payload),
                    Entry::Vacant(entry) => {
                        entry.insert(Record::from_server(payload));
                    }
                }
            }
            inner.state = StoreState::Loaded;
        }
        self.emitter.emit(topics::STORE_LOADED, P::COLLECTION);
        Ok(())
    }

    /// Begin (or continue) a draft on one Record and mutate it in place.
    pub fn draft<F>(&self, id: &str, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut P),
    {
        let mut inner = self.write()?;
        let record = inner.records.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        mutate(record.draft());
        Ok(())
    }

    /// End a Record's draft. The Record is clean as soon as this returns,
    /// regardless of network outcome.
    ///
    /// Unless `sync_only` is set, the committed value is saved through the
    /// repository and the server echo is applied on success. A failed save
    /// returns [`StoreError::Save`] with the optimistic value still in
    /// place; rolling back is the caller's decision.
    pub fn commit(&self, id: &str, options: CommitOptions) -> Result<(), StoreError> {
        let payload = {
            let mut inner = self.write()?;
            let record = inner.records.get_mut(id).ok_or_else(|| Self::not_found(id))?;
            record.commit(options);
            record.value().clone()
        };
        self.emitter.emit(topics::RECORD_COMMITTED, id);

        if options.sync_only {
            return Ok(());
        }

        let echo = self.repo.save(&payload).map_err(StoreError::Save)?;
        let echo_id = echo.id().to_string();
        {
            let mut inner = self.write()?;
            // Best-effort: the record may have been removed while the save
            // was in flight.
            if let Some(record) = inner.records.get_mut(&echo_id) {
                record.apply_server(echo);
            }
        }
        Ok(())
    }

    /// Restore one Record's value from its draft baseline.
    pub fn rollback(&self, id: &str) -> Result<bool, StoreError> {
        let restored = {
            let mut inner = self.write()?;
            let record = inner.records.get_mut(id).ok_or_else(|| Self::not_found(id))?;
            record.rollback()
        };
        if restored {
            self.emitter.emit(topics::RECORD_ROLLED_BACK, id);
        }
        Ok(restored)
    }

    /// Reconcile a subset of the collection. See [`SyncAction`].
    pub fn sync(&self, request: SyncRequest) -> Result<(), StoreError> {
        match request.action {
            SyncAction::Append => self.append(&request.ids),
            SyncAction::Invalidate => self.invalidate_many(&request.ids),
        }
    }

    /// Fetch exactly one id fresh and replace its Record.
    pub fn invalidate(&self, id: &str) -> Result<(), StoreError> {
        self.invalidate_many(&[id.to_string()])
    }

    fn append(&self, ids: &[String]) -> Result<(), StoreError> {
        let missing: Vec<String> = {
            let inner = self.read()?;
            let mut seen = std::collections::HashSet::new();
            ids.iter()
                .filter(|id| !inner.records.contains_key(id.as_str()))
                .filter(|id| seen.insert((*id).clone()))
                .cloned()
                .collect()
        };
        if missing.is_empty() {
            return Ok(());
        }

        let payloads = match self.repo.fetch_many(&missing) {
            Ok(payloads) => payloads,
            Err(err) => {
                // Read path degrades to the current collection, never an error.
                tracing::warn!(
                    collection = P::COLLECTION,
                    error = %err,
                    "append fetch failed; leaving collection as-is"
                );
                return Ok(());
            }
        };

        let mut added = Vec::new();
        {
            let mut inner = self.write()?;
            for payload in payloads {
                let id = payload.id().to_string();
                if !inner.records.contains_key(&id) {
                    inner.records.insert(id.clone(), Record::from_server(payload));
                    added.push(id);
                }
            }
        }
        for id in added {
            self.emitter.emit(topics::RECORD_ADDED, &id);
        }
        Ok(())
    }

    fn invalidate_many(&self, ids: &[String]) -> Result<(), StoreError> {
        if ids.is_empty() {
            return Ok(());
        }
        let payloads = self.repo.fetch_many(ids).map_err(StoreError::Fetch)?;

        let mut refreshed = Vec::new();
        let mut removed = Vec::new();
        {
            let mut inner = self.write()?;
            let mut returned = std::collections::HashSet::new();
            for payload in payloads {
                let id = payload.id().to_string();
                returned.insert(id.clone());
                match inner.records.entry(id.clone()) {
                    // Last-resolution-wins: server truth overwrites even a
                    // newer local edit made while this fetch was in flight.
                    Entry::Occupied(mut entry) => entry.get_mut().apply_server(payload),
                    Entry::Vacant(entry) => {
                        entry.insert(Record::from_server(payload));
                    }
                }
                refreshed.push(id);
            }
            // Ids the server no longer returns were archived elsewhere.
            for id in ids {
                if !returned.contains(id) && inner.records.shift_remove(id).is_some() {
                    removed.push(id.clone());
                }
            }
        }
        for id in refreshed {
            self.emitter.emit(topics::RECORD_INVALIDATED, &id);
        }
        for id in removed {
            self.emitter.emit(topics::RECORD_REMOVED, &id);
        }
        Ok(())
    }

    /// Load the full collection, replacing the current one on success.
    ///
    /// Single-flight: a call made while another full fetch is outstanding is
    /// ignored, not queued. A failed fetch leaves the previous collection
    /// and state untouched and surfaces the error.
    pub fn fetch_all(&self) -> Result<(), StoreError> {
        if self.fetching.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let _guard = FetchGuard {
            fetching: Arc::clone(&self.fetching),
        };

        let previous = {
            let mut inner = self.write()?;
            let previous = inner.state;
            inner.state = StoreState::Loading;
            previous
        };

        match self.repo.fetch_all() {
            Ok(payloads) => {
                {
                    let mut inner = self.write()?;
                    inner.records = payloads
                        .into_iter()
                        .map(|payload| (payload.id().to_string(), Record::from_server(payload)))
                        .collect();
                    inner.state = StoreState::Loaded;
                }
                self.emitter.emit(topics::STORE_LOADED, P::COLLECTION);
                Ok(())
            }
            Err(err) => {
                self.write()?.state = previous;
                Err(StoreError::Fetch(err))
            }
        }
    }

    /// Swap a temporary local id for the server-assigned one after the first
    /// successful save, preserving the Record's position in the collection.
    ///
    /// The server id may already be present when a concurrent append or
    /// invalidate landed it first; in that case the temp entry is folded
    /// into the existing Record (the save echo is the freshest truth) and
    /// no position changes.
    pub fn rekey(&self, temp_id: &str, payload: P) -> Result<(), StoreError> {
        let new_id = payload.id().to_string();
        {
            let mut inner = self.write()?;
            let (index, _, mut record) = inner
                .records
                .shift_remove_full(temp_id)
                .ok_or_else(|| Self::not_found(temp_id))?;
            if inner.records.contains_key(&new_id) {
                if let Some(existing) = inner.records.get_mut(&new_id) {
                    existing.apply_server(payload);
                }
            } else {
                record.apply_server(payload);
                let index = index.min(inner.records.len());
                inner.records.shift_insert(index, new_id.clone(), record);
            }
        }
        self.emitter.emit(topics::RECORD_REKEYED, &new_id);
        Ok(())
    }

    /// Remove an id from the collection (archive/delete confirmation path).
    /// Returns whether it was present.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let removed = self.write()?.records.shift_remove(id).is_some();
        if removed {
            self.emitter.emit(topics::RECORD_REMOVED, id);
        }
        Ok(removed)
    }

    /// Drop everything and return to `Empty`. Used on logout/tenant switch.
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.write()?;
        inner.records.clear();
        inner.state = StoreState::Empty;
        Ok(())
    }
}
