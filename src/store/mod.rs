//! Document store abstraction.
//!
//! The snapshot pipelines only talk to a store through these traits, so the
//! MongoDB backend can be swapped for the in-memory store used in tests.
//!
//! # Architecture
//!
//! - `error`: Store error taxonomy
//! - `mongo`: MongoDB implementation backed by the official driver
//! - `memory`: In-memory store with failure injection (tests only)

mod error;
#[cfg(test)]
mod memory;
mod mongo;

use std::future::Future;

use bson::Document;

pub use error::{StoreError, StoreResult};
#[cfg(test)]
pub use memory::{MemoryConnector, MemoryState, MemoryStore};
pub use mongo::{MongoConnector, MongoStore};

/// An open connection to a document store.
///
/// One value lives for exactly one job and is released through
/// [`DocumentStore::close`]. Implementations must be usable from several
/// units at once when a job runs with a concurrency above one.
pub trait DocumentStore: Send + Sync {
    /// Verify the connection is usable. Failure is fatal to the job.
    fn ping(&self) -> impl Future<Output = StoreResult<()>> + Send;

    /// List every database name on the server, in server order.
    fn list_database_names(&self) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// List every collection name of `database`, in server order.
    fn list_collection_names(
        &self,
        database: &str,
    ) -> impl Future<Output = StoreResult<Vec<String>>> + Send;

    /// Read the whole collection into memory.
    fn find_all(
        &self,
        database: &str,
        collection: &str,
    ) -> impl Future<Output = StoreResult<Vec<Document>>> + Send;

    /// Insert all documents in one call, returning how many were inserted.
    fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Release the connection.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Opens [`DocumentStore`] connections from a connection URI.
pub trait Connector: Send + Sync {
    type Store: DocumentStore;

    /// Build a store handle for `uri`.
    ///
    /// This only fails when no handle could be created at all (for example an
    /// unparseable URI); reachability is checked by [`DocumentStore::ping`]
    /// so the handle can still be closed afterwards.
    fn open(&self, uri: &str) -> impl Future<Output = StoreResult<Self::Store>> + Send;
}
