//! Session - Root aggregator composing stores, transport, and UI feedback.

use std::sync::{Arc, Mutex};

use crate::payload::Payload;
use crate::registry::{RegistryError, StoreRegistry};
use crate::service::EntityService;
use crate::store::Store;
use crate::transport::Transport;

/// Severity of a user-visible toast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

/// One transient user-visible notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Buffered toast sink. Usecase-level code pushes outcomes here and the UI
/// shell drains them; losing a toast (poisoned lock) is preferable to
/// failing the operation that produced it.
#[derive(Clone, Default)]
pub struct UiFeedback {
    buffer: Arc<Mutex<Vec<Toast>>>,
}

impl UiFeedback {
    pub fn new() -> Self {
        UiFeedback::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(ToastLevel::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(ToastLevel::Error, message.into());
    }

    fn push(&self, level: ToastLevel, message: String) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push(Toast { level, message });
        }
    }

    /// Take all pending toasts, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        self.buffer
            .lock()
            .map(|mut buffer| buffer.drain(..).collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer
            .lock()
            .map(|buffer| buffer.is_empty())
            .unwrap_or(true)
    }
}

/// Single object the application composes at startup: one transport, one
/// registry of per-type stores, one toast sink.
///
/// `store::<P>()` registers lazily on first access so unrelated callers
/// share the same collection without threading every store through every
/// constructor. Cross-entity lookups (a task reaching its opportunity's
/// store) go through the same call.
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    registry: Arc<StoreRegistry>,
    ui: UiFeedback,
}

impl Session {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Session {
            transport,
            registry: Arc::new(StoreRegistry::new()),
            ui: UiFeedback::new(),
        }
    }

    /// The per-type Store, created and registered on first access.
    pub fn store<P: Payload>(&self) -> Result<Store<P>, RegistryError> {
        if !self.registry.has(P::COLLECTION) {
            match self.registry.register(Store::<P>::new(Arc::clone(&self.transport))) {
                Ok(()) => {}
                // Benign: another caller registered between has() and here.
                Err(RegistryError::Duplicate(_)) => {}
                Err(err) => return Err(err),
            }
        }
        self.registry.get::<P>()
    }

    /// A typed service over this session's transport.
    pub fn service<P: Payload>(&self) -> EntityService<P> {
        EntityService::new(Arc::clone(&self.transport))
    }

    pub fn registry(&self) -> &StoreRegistry {
        &self.registry
    }

    pub fn ui(&self) -> &UiFeedback {
        &self.ui
    }

    /// Empty every store on logout or tenant switch. Registrations (and
    /// therefore listeners) survive; only data is dropped.
    pub fn reset(&self) -> Result<(), RegistryError> {
        self.registry.clear_all()
    }
}
