//! In-memory document store for tests.
//!
//! Records how it is used (close and insert calls) and can be told to fail
//! specific operations, which lets the pipelines' failure isolation be
//! exercised without a running server.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bson::Document;

use super::{Connector, DocumentStore, StoreError, StoreResult};

type Key = (String, String);

#[derive(Default)]
struct Inner {
    databases: BTreeMap<String, BTreeMap<String, Vec<Document>>>,
    fail_open: bool,
    fail_ping: bool,
    fail_catalog: bool,
    failing_reads: HashSet<Key>,
    failing_writes: HashSet<Key>,
    read_delays: HashMap<Key, Duration>,
    open_calls: usize,
    close_calls: usize,
    insert_calls: usize,
}

/// Shared state behind every [`MemoryStore`] opened by one [`MemoryConnector`].
#[derive(Default)]
pub struct MemoryState {
    inner: Mutex<Inner>,
}

fn key(database: &str, collection: &str) -> Key {
    (database.to_string(), collection.to_string())
}

impl MemoryState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Create (or replace) a collection holding `documents`.
    pub fn put(&self, database: &str, collection: &str, documents: Vec<Document>) {
        self.lock()
            .databases
            .entry(database.to_string())
            .or_default()
            .insert(collection.to_string(), documents);
    }

    pub fn documents(&self, database: &str, collection: &str) -> Option<Vec<Document>> {
        self.lock()
            .databases
            .get(database)
            .and_then(|collections| collections.get(collection))
            .cloned()
    }

    pub fn fail_open(&self) {
        self.lock().fail_open = true;
    }

    pub fn fail_ping(&self) {
        self.lock().fail_ping = true;
    }

    pub fn fail_catalog(&self) {
        self.lock().fail_catalog = true;
    }

    pub fn fail_reads_of(&self, database: &str, collection: &str) {
        self.lock().failing_reads.insert(key(database, collection));
    }

    pub fn fail_writes_to(&self, database: &str, collection: &str) {
        self.lock().failing_writes.insert(key(database, collection));
    }

    pub fn delay_reads_of(&self, database: &str, collection: &str, delay: Duration) {
        self.lock()
            .read_delays
            .insert(key(database, collection), delay);
    }

    pub fn open_calls(&self) -> usize {
        self.lock().open_calls
    }

    pub fn close_calls(&self) -> usize {
        self.lock().close_calls
    }

    pub fn insert_calls(&self) -> usize {
        self.lock().insert_calls
    }
}

/// Opens [`MemoryStore`] handles onto a shared [`MemoryState`].
#[derive(Clone)]
pub struct MemoryConnector {
    state: Arc<MemoryState>,
}

impl MemoryConnector {
    pub fn new(state: Arc<MemoryState>) -> Self {
        Self { state }
    }
}

impl Connector for MemoryConnector {
    type Store = MemoryStore;

    async fn open(&self, _uri: &str) -> StoreResult<MemoryStore> {
        let mut inner = self.state.lock();
        if inner.fail_open {
            return Err(StoreError::connection("invalid connection string"));
        }
        inner.open_calls += 1;
        Ok(MemoryStore {
            state: Arc::clone(&self.state),
        })
    }
}

pub struct MemoryStore {
    state: Arc<MemoryState>,
}

impl DocumentStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        if self.state.lock().fail_ping {
            return Err(StoreError::connection("server selection timeout"));
        }
        Ok(())
    }

    async fn list_database_names(&self) -> StoreResult<Vec<String>> {
        let inner = self.state.lock();
        if inner.fail_catalog {
            return Err(StoreError::connection("connection reset by peer"));
        }
        Ok(inner.databases.keys().cloned().collect())
    }

    async fn list_collection_names(&self, database: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .state
            .lock()
            .databases
            .get(database)
            .map(|collections| collections.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_all(&self, database: &str, collection: &str) -> StoreResult<Vec<Document>> {
        let delay = self
            .state
            .lock()
            .read_delays
            .get(&key(database, collection))
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.state.lock();
        if inner.failing_reads.contains(&key(database, collection)) {
            return Err(StoreError::read(database, collection, "cursor killed"));
        }
        Ok(inner
            .databases
            .get(database)
            .and_then(|collections| collections.get(collection))
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_many(
        &self,
        database: &str,
        collection: &str,
        documents: Vec<Document>,
    ) -> StoreResult<u64> {
        let mut inner = self.state.lock();
        inner.insert_calls += 1;
        if inner.failing_writes.contains(&key(database, collection)) {
            return Err(StoreError::write(
                database,
                collection,
                "E11000 duplicate key error",
            ));
        }
        let count = documents.len() as u64;
        inner
            .databases
            .entry(database.to_string())
            .or_default()
            .entry(collection.to_string())
            .or_default()
            .extend(documents);
        Ok(count)
    }

    async fn close(self) {
        self.state.lock().close_calls += 1;
    }
}
