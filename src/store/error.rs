//! Document store error types.
//!
//! Connection failures are fatal to a whole job, while read and write
//! failures only affect the collection they were raised for.

use miette::Diagnostic;
use thiserror::Error;

/// Errors raised by a [`DocumentStore`](super::DocumentStore) or its
/// [`Connector`](super::Connector).
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Connection error: {message}")]
    #[diagnostic(
        code(docsnap::store::connection),
        help("Check that the connection URI is correct and the server is reachable.")
    )]
    Connection { message: String },

    #[error("Failed to read {database}.{collection}: {message}")]
    #[diagnostic(code(docsnap::store::read))]
    Read {
        database: String,
        collection: String,
        message: String,
    },

    #[error("Failed to write {database}.{collection}: {message}")]
    #[diagnostic(code(docsnap::store::write))]
    Write {
        database: String,
        collection: String,
        message: String,
    },
}

impl StoreError {
    pub fn connection(message: impl ToString) -> Self {
        Self::Connection {
            message: message.to_string(),
        }
    }

    pub fn read(database: &str, collection: &str, message: impl ToString) -> Self {
        Self::Read {
            database: database.to_string(),
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }

    pub fn write(database: &str, collection: &str, message: impl ToString) -> Self {
        Self::Write {
            database: database.to_string(),
            collection: collection.to_string(),
            message: message.to_string(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
