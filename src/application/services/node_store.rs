//! Node store: loads and persists the nodes of one tree.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::application::documents::{self, NODES, NODE_TREE_FIELD};
use crate::application::{ApplicationError, ApplicationResult, StoreResultExt};
use crate::domain::{DomainError, Node, NodeDraft, NodeId, TreeId};
use crate::infrastructure::traits::{DocumentStore, StoreError};

/// Reads and writes `treeNodes` documents.
///
/// The store is the source of truth; callers reload after writing.
#[derive(Clone)]
pub struct NodeStore {
    store: Arc<dyn DocumentStore>,
}

impl NodeStore {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All nodes tagged with `tree_id`, in store order.
    pub fn load_nodes(&self, tree_id: &TreeId) -> ApplicationResult<Vec<Node>> {
        let docs = self
            .store
            .query_eq(NODES, NODE_TREE_FIELD, &Value::String(tree_id.to_string()))
            .with_store_context(|| format!("load nodes of tree {tree_id}"))?;
        debug!("load_nodes: tree={} count={}", tree_id, docs.len());
        docs.iter().map(documents::node_from_document).collect()
    }

    /// Create a node (`existing == None`) or replace an existing node's fields.
    pub fn save_node(
        &self,
        tree_id: &TreeId,
        payload: &NodeDraft,
        existing: Option<&NodeId>,
    ) -> ApplicationResult<Node> {
        let id = match existing {
            Some(id) => {
                let fields = documents::node_update_fields(payload)?;
                self.store
                    .update(NODES, id.as_str(), fields)
                    .map_err(|e| not_found_as_domain(e, id))?;
                debug!("save_node: updated {}", id);
                id.clone()
            }
            None => {
                let fields = documents::new_node_fields(tree_id, payload)?;
                let id = self
                    .store
                    .add(NODES, fields)
                    .with_store_context(|| format!("add node to tree {tree_id}"))?;
                debug!("save_node: created {}", id);
                NodeId::new(id)
            }
        };

        Ok(Node {
            id,
            tree_id: tree_id.clone(),
            kind: payload.kind,
            text: payload.text.clone(),
            options: payload.options.clone(),
        })
    }

    pub fn delete_node(&self, id: &NodeId) -> ApplicationResult<()> {
        self.store
            .delete(NODES, id.as_str())
            .with_store_context(|| format!("delete node {id}"))
    }
}

fn not_found_as_domain(err: StoreError, id: &NodeId) -> ApplicationError {
    match err {
        StoreError::NotFound { .. } => DomainError::NodeNotFound(id.clone()).into(),
        other => ApplicationError::OperationFailed {
            context: format!("update node {id}"),
            source: Box::new(other),
        },
    }
}
