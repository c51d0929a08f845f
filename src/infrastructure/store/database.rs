//! In-memory representation shared by the store implementations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::infrastructure::traits::{Document, Fields, StoreError, StoreResult, WriteBatch, WriteOp};

/// `{ collection: { id: fields } }`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Database {
    collections: BTreeMap<String, BTreeMap<String, Fields>>,
}

impl Database {
    pub fn get(&self, collection: &str, id: &str) -> Option<Document> {
        self.collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|fields| Document::new(id, fields.clone()))
    }

    pub fn list(&self, collection: &str) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|c| {
                c.iter()
                    .map(|(id, fields)| Document::new(id.as_str(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Apply a batch to a copy and return it; `self` is untouched on error.
    pub fn applied(&self, batch: &WriteBatch) -> StoreResult<Database> {
        let mut next = self.clone();
        for op in batch.ops() {
            next.apply(op)?;
        }
        Ok(next)
    }

    fn apply(&mut self, op: &WriteOp) -> StoreResult<()> {
        match op {
            WriteOp::Set {
                collection,
                id,
                fields,
            } => {
                self.collections
                    .entry(collection.clone())
                    .or_default()
                    .insert(id.clone(), fields.clone());
            }
            WriteOp::Update {
                collection,
                id,
                fields,
            } => {
                let existing = self
                    .collections
                    .get_mut(collection)
                    .and_then(|c| c.get_mut(id))
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collection.clone(),
                        id: id.clone(),
                    })?;
                for (key, value) in fields {
                    existing.insert(key.clone(), value.clone());
                }
            }
            WriteOp::Delete { collection, id } => {
                if let Some(c) = self.collections.get_mut(collection) {
                    c.remove(id);
                }
            }
        }
        Ok(())
    }
}
