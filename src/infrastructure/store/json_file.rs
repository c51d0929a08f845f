//! Document store persisted as a single JSON file.
//!
//! Every commit reads the file, applies the batch in memory and writes the
//! result to a sibling temp file that is renamed over the original, so a
//! batch lands completely or not at all.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, instrument};

use crate::infrastructure::store::database::Database;
use crate::infrastructure::traits::{
    Document, DocumentStore, FileSystem, StoreError, StoreResult, WriteBatch,
};

pub struct JsonFileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    // serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> StoreResult<Database> {
        if !self.fs.exists(&self.path) {
            return Ok(Database::default());
        }
        let content = self.fs.read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Database::default());
        }
        serde_json::from_str(&content)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, db: &Database) -> StoreResult<()> {
        let content = serde_json::to_string_pretty(db)
            .map_err(|e| StoreError::Corrupt(format!("serialize store: {e}")))?;
        self.fs.ensure_parent(&self.path)?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "store.json".to_string());
        let tmp = self
            .path
            .with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4().simple()));

        self.fs.write(&tmp, &content)?;
        if let Err(e) = self.fs.rename(&tmp, &self.path) {
            // best effort; the original file is untouched
            let _ = self.fs.remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

impl DocumentStore for JsonFileStore {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        Ok(self.load()?.get(collection, id))
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        Ok(self.load()?.list(collection))
    }

    #[instrument(level = "debug", skip(self, batch), fields(ops = batch.len()))]
    fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))?;
        let next = self.load()?.applied(&batch)?;
        self.save(&next)?;
        debug!(path = %self.path.display(), "store committed");
        Ok(())
    }
}
