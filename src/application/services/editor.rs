//! Editor service: persists drafts of an [`EditorSession`].

use std::io::Write;
use std::sync::Arc;

use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{NodeStore, TreeMetadataService};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{DomainError, EditorSession, Node, NodeId, TreeId, TreeReport};
use crate::infrastructure::traits::{DocumentStore, Editor};

/// Marker for instruction lines in the compose buffer.
const COMMENT_PREFIX: &str = "#";

pub struct EditorService {
    nodes: NodeStore,
    trees: TreeMetadataService,
}

impl EditorService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            nodes: NodeStore::new(store.clone()),
            trees: TreeMetadataService::new(store),
        }
    }

    /// Load the nodes and root of a tree into a fresh editing session.
    pub fn open(&self, tree_id: &TreeId) -> ApplicationResult<EditorSession> {
        let root = self.trees.root_of(tree_id)?;
        let nodes = self.nodes.load_nodes(tree_id)?;
        debug!("open: tree={} nodes={} root={:?}", tree_id, nodes.len(), root);
        Ok(EditorSession::new(tree_id.clone(), nodes, root))
    }

    /// Validate and persist the draft, then reload the node list.
    ///
    /// Empty text fails before any store access. On success the session
    /// holds the refreshed nodes and an empty draft.
    #[instrument(level = "debug", skip(self, session), fields(tree = %session.tree_id()))]
    pub fn save(&self, session: &mut EditorSession) -> ApplicationResult<Node> {
        let pending = session.prepare_save()?;
        let saved = self.nodes.save_node(
            session.tree_id(),
            &pending.payload,
            pending.existing.as_ref(),
        )?;
        let refreshed = self.nodes.load_nodes(session.tree_id())?;
        session.complete_save(refreshed);
        Ok(saved)
    }

    /// Make `node_id` the entry point of the tree.
    pub fn set_root(&self, session: &mut EditorSession, node_id: &NodeId) -> ApplicationResult<()> {
        self.trees.set_root(session.tree_id(), node_id)?;
        session.set_root(node_id.clone());
        Ok(())
    }

    /// Remove a node; options pointing at it become dangling.
    pub fn delete_node(&self, session: &mut EditorSession, node_id: &NodeId) -> ApplicationResult<()> {
        if session.node(node_id).is_none() {
            return Err(DomainError::NodeNotFound(node_id.clone()).into());
        }
        self.nodes.delete_node(node_id)?;
        self.refresh(session)
    }

    /// Reload nodes from the store.
    pub fn refresh(&self, session: &mut EditorSession) -> ApplicationResult<()> {
        let nodes = self.nodes.load_nodes(session.tree_id())?;
        session.replace_nodes(nodes);
        Ok(())
    }

    pub fn report(&self, session: &EditorSession) -> TreeReport {
        TreeReport::build(session.root(), session.nodes())
    }

    pub fn tree_title(&self, tree_id: &TreeId) -> ApplicationResult<String> {
        self.trees.tree_title(tree_id)
    }
}

/// Let the author write node text in an external editor.
///
/// Lines starting with `#` are dropped; surrounding whitespace is trimmed.
pub fn compose_text(editor: &dyn Editor, initial: &str, hint: &str) -> ApplicationResult<String> {
    let mut buffer = tempfile::Builder::new()
        .prefix("soltree-")
        .suffix(".txt")
        .tempfile()
        .map_err(|e| ApplicationError::OperationFailed {
            context: "create editor buffer".to_string(),
            source: Box::new(e),
        })?;
    let path = buffer.path().to_path_buf();

    writeln!(buffer, "{initial}")
        .and_then(|_| writeln!(buffer, "{COMMENT_PREFIX} {hint}"))
        .and_then(|_| buffer.flush())
        .with_path_context("write editor buffer", &path)?;

    editor.open(&path).with_path_context("edit", &path)?;

    let content = std::fs::read_to_string(&path).with_path_context("read editor buffer", &path)?;
    let text = content
        .lines()
        .filter(|l| !l.trim_start().starts_with(COMMENT_PREFIX))
        .join("\n");
    Ok(text.trim().to_string())
}
