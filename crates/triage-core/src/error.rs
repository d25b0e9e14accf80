//! Error types for triage

/// Result type alias using triage's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for triage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lookup against an unknown ticket, rule or record id
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up
        kind: &'static str,

        /// The id that was not found
        id: String,
    },

    /// Malformed rule definitions and unrecognized enum values
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Failures reported by the record store
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new not-found error
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Create a new invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a new storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error is a `NotFound`
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
