//! Process-local document store.

use std::sync::Mutex;

use crate::infrastructure::store::database::Database;
use crate::infrastructure::traits::{Document, DocumentStore, StoreError, StoreResult, WriteBatch};

/// Document store kept in memory; used by tests and scratch sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    db: Mutex<Database>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Database>> {
        self.db
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

impl DocumentStore for MemoryStore {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.lock()?.get(collection, id))
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        Ok(self.lock()?.list(collection))
    }

    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut db = self.lock()?;
        let next = db.applied(&batch)?;
        *db = next;
        Ok(())
    }
}
