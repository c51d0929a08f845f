//! Tree metadata: title and root pointer of a tree.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::application::documents::{self, CONTENT, CONTENT_TREE_FIELD, TREES};
use crate::application::{ApplicationError, ApplicationResult, StoreResultExt};
use crate::domain::{DomainError, NodeId, Tree, TreeId};
use crate::infrastructure::traits::{DocumentStore, StoreError};

#[derive(Clone)]
pub struct TreeMetadataService {
    store: Arc<dyn DocumentStore>,
}

impl TreeMetadataService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Tree record, or `None` when metadata was never created.
    pub fn load_tree(&self, tree_id: &TreeId) -> ApplicationResult<Option<Tree>> {
        let doc = self
            .store
            .get(TREES, tree_id.as_str())
            .with_store_context(|| format!("load tree {tree_id}"))?;
        if doc.is_none() {
            debug!("load_tree: no metadata for {}", tree_id);
        }
        doc.as_ref().map(documents::tree_from_document).transpose()
    }

    /// Configured root, treating missing metadata as "no root".
    pub fn root_of(&self, tree_id: &TreeId) -> ApplicationResult<Option<NodeId>> {
        Ok(self.load_tree(tree_id)?.and_then(|t| t.root_node_id))
    }

    /// Overwrite the root reference; the node is not checked against the tree.
    pub fn set_root(&self, tree_id: &TreeId, node_id: &NodeId) -> ApplicationResult<()> {
        debug!("set_root: tree={} node={}", tree_id, node_id);
        self.store
            .update(TREES, tree_id.as_str(), documents::root_update_fields(node_id))
            .map_err(|e| match e {
                StoreError::NotFound { .. } => DomainError::TreeNotFound(tree_id.clone()).into(),
                other => ApplicationError::OperationFailed {
                    context: format!("set root of tree {tree_id}"),
                    source: Box::new(other),
                },
            })
    }

    /// Display title: owning content record first, then the tree record.
    pub fn tree_title(&self, tree_id: &TreeId) -> ApplicationResult<String> {
        let owners = self
            .store
            .query_eq(
                CONTENT,
                CONTENT_TREE_FIELD,
                &Value::String(tree_id.to_string()),
            )
            .with_store_context(|| format!("find content of tree {tree_id}"))?;
        if let Some(owner) = owners.first() {
            return Ok(documents::content_from_document(owner)?.title);
        }
        Ok(self
            .load_tree(tree_id)?
            .map(|t| t.title)
            .unwrap_or_default())
    }
}
