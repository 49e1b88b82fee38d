//! InMemoryTransport - Scripted transport for testing and development.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use serde_json::Value;

use super::{Transport, TransportError};

struct Inner {
    scripts: HashMap<String, VecDeque<Result<Value, TransportError>>>,
    log: Vec<(String, Value)>,
}

/// In-memory transport that replays scripted responses per document.
///
/// Responses queue up FIFO per document; an unscripted document fails like a
/// network error so read paths exercise their degrade behavior. Every request
/// is logged for assertions. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryTransport {
    inner: Arc<Mutex<Inner>>,
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTransport {
    /// Create a transport with no scripted responses.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                scripts: HashMap::new(),
                log: Vec::new(),
            })),
        }
    }

    /// Queue a successful response for a document.
    pub fn respond(&self, document: &str, value: Value) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .scripts
                .entry(document.to_string())
                .or_default()
                .push_back(Ok(value));
        }
    }

    /// Queue a failed response for a document.
    pub fn fail(&self, document: &str, message: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner
                .scripts
                .entry(document.to_string())
                .or_default()
                .push_back(Err(TransportError::Network(message.to_string())));
        }
    }

    /// All requests issued so far, in order.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.inner
            .lock()
            .map(|inner| inner.log.clone())
            .unwrap_or_default()
    }

    /// Number of requests issued for one document.
    pub fn requests_for(&self, document: &str) -> usize {
        self.inner
            .lock()
            .map(|inner| inner.log.iter().filter(|(doc, _)| doc == document).count())
            .unwrap_or(0)
    }
}

impl Transport for InMemoryTransport {
    fn request(&self, document: &str, variables: Value) -> Result<Value, TransportError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| TransportError::LockPoisoned("request"))?;

        inner.log.push((document.to_string(), variables));

        match inner.scripts.get_mut(document).and_then(VecDeque::pop_front) {
            Some(result) => result,
            None => Err(TransportError::Network(format!(
                "no response scripted for {}",
                document
            ))),
        }
    }
}
