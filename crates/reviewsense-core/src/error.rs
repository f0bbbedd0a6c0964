//! Error types for ReviewSense

/// Result type alias using ReviewSense's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for ReviewSense operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Classifier fitting or inference errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// A feature vector does not fit the fitted vocabulary
    #[error("dimension mismatch: expected {expected} features, got index {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Labeled dataset errors (unreadable file, bad label, too few rows)
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Filesystem errors
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
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
