//! MongoDB store backed by the official driver.

use bson::{Document, doc};
use futures_util::TryStreamExt;
use mongodb::Client;
use tracing::debug;

use super::{Connector, DocumentStore, StoreError, StoreResult};

/// Opens [`MongoStore`] connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for MongoConnector {
    type Store = MongoStore;

    async fn open(&self, uri: &str) -> StoreResult<MongoStore> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(StoreError::connection)?;
        Ok(MongoStore { client })
    }
}

/// A MongoDB client scoped to one job.
///
/// The driver client is an internally pooled handle, so concurrent units can
/// share it through `&self`.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
}

impl DocumentStore for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(StoreError::connection)
    }

    async fn list_database_names(&self) -> StoreResult<Vec<String>> {
        self.client
            .list_database_names()
            .await
            .map_err(StoreError::connection)
    }

    async fn list_collection_names(&self, database: &str) -> StoreResult<Vec<String>> {
        self.client
            .database(database)
            .list_collection_names()
            .await
            .map_err(StoreError::connection)
    }

    async fn find_all(&self, database: &str, collection: &str) -> StoreResult<Vec<Document>> {
        let cursor = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .find(doc! {})
            .await
            .map_err(|e| StoreError::read(database, collection, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| StoreError::read(database, collection, e))
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<u64> {
        let result = self
            .client
            .database(database)
            .collection::<Document>(collection)
            .insert_many(documents)
            .await
            .map_err(|e| StoreError::write(database, collection, e))?;
        Ok(result.inserted_ids.len() as u64)
    }

    async fn close(self) {
        debug!("Shutting down MongoDB client");
        self.client.shutdown().await;
    }
}
