use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend cannot be reached or opened at all.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What was being attempted when the backend went away.
        message: String,
        /// Underlying driver failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A single statement or transaction failed.
    #[error("{operation} failed")]
    Query {
        /// Short name of the failing operation (e.g. `replace annotations`).
        operation: &'static str,
        /// Underlying driver failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored stroke payload no longer decodes.
    #[error("corrupt stroke payload in annotation record {record_id}")]
    Corrupt {
        /// Primary key of the unreadable record.
        record_id: i64,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a query error tagged with the failing operation.
    pub fn query(operation: &'static str, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Query {
            operation,
            source: Box::new(source),
        }
    }
}
