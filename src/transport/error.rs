use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request failed to reach the backend or the backend rejected it.
    Network(String),
    /// The response arrived but could not be decoded into the expected shape.
    Decode(String),
    /// Transport-internal lock poisoned.
    LockPoisoned(&'static str),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(message) => write!(f, "network error: {}", message),
            TransportError::Decode(message) => write!(f, "decode error: {}", message),
            TransportError::LockPoisoned(operation) => {
                write!(f, "transport lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for TransportError {}
