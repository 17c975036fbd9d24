//! Cache error types.

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to obtain a connection to the backing store.
    #[error("Cache connection error: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// The backing store rejected or failed an operation.
    #[error("Cache backend error: {message}")]
    Backend {
        /// Description of the backend failure.
        message: String,
    },

    /// A value could not be encoded for storage.
    #[error("Cache encode error: {message}")]
    Encode {
        /// Description of the encoding failure.
        message: String,
    },

    /// A stored value could not be decoded.
    #[error("Cache decode error: {message}")]
    Decode {
        /// Description of the decoding failure.
        message: String,
    },
}

impl CacheError {
    /// Creates a new `Connection` error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a new `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Creates a new `Encode` error.
    #[must_use]
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Returns `true` if the error came from the backing store or its
    /// transport rather than from value (de)serialization.
    #[must_use]
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Backend { .. })
    }
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        Self::backend(err.to_string())
    }
}

/// Type alias for cache operation results.
pub type CacheResult<T> = Result<T, CacheError>;
