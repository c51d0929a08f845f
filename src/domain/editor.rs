//! Editor working draft for one tree.
//!
//! [`EditorSession`] is the explicit editing context: the node set of one
//! tree, its root, the node being edited and the draft holding author input.
//! It performs no I/O; `application::services::EditorService` persists the
//! prepared payload and feeds the refreshed node list back.

use tracing::debug;

use crate::domain::entities::{parse_target, Node, NodeId, NodeKind, TreeId, TreeOption};
use crate::domain::error::{DomainError, DomainResult};

/// Scalar draft fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Text,
    Kind,
}

/// Per-option fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionField {
    Text,
    Target,
}

/// Author input for a node, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeDraft {
    pub kind: NodeKind,
    pub text: String,
    pub options: Vec<TreeOption>,
}

impl NodeDraft {
    pub fn from_node(node: &Node) -> Self {
        Self {
            kind: node.kind,
            text: node.text.clone(),
            options: node.options.clone(),
        }
    }

    /// Validate and normalize into a persistable payload.
    ///
    /// Empty text is rejected; solution drafts lose their options.
    /// Option targets are not checked against the node set.
    pub fn validated(&self) -> DomainResult<NodeDraft> {
        if self.text.trim().is_empty() {
            return Err(DomainError::EmptyText);
        }
        let options = match self.kind {
            NodeKind::Solution => Vec::new(),
            NodeKind::Question => self.options.clone(),
        };
        Ok(NodeDraft {
            kind: self.kind,
            text: self.text.clone(),
            options,
        })
    }
}

/// Validated payload plus the node it replaces, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSave {
    pub existing: Option<NodeId>,
    pub payload: NodeDraft,
}

/// Explicit editing context for one tree.
#[derive(Debug, Clone)]
pub struct EditorSession {
    tree_id: TreeId,
    nodes: Vec<Node>,
    root: Option<NodeId>,
    selected: Option<NodeId>,
    draft: NodeDraft,
}

impl EditorSession {
    pub fn new(tree_id: TreeId, nodes: Vec<Node>, root: Option<NodeId>) -> Self {
        Self {
            tree_id,
            nodes,
            root,
            selected: None,
            draft: NodeDraft::default(),
        }
    }

    pub fn tree_id(&self) -> &TreeId {
        &self.tree_id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    pub fn root(&self) -> Option<&NodeId> {
        self.root.as_ref()
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn draft(&self) -> &NodeDraft {
        &self.draft
    }

    /// Nodes an option of the draft may link to (all but the edited node).
    pub fn link_candidates(&self) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|n| Some(&n.id) != self.selected.as_ref())
            .collect()
    }

    /// Load an existing node into the draft.
    pub fn select_for_edit(&mut self, id: &NodeId) -> DomainResult<()> {
        let node = self
            .node(id)
            .ok_or_else(|| DomainError::NodeNotFound(id.clone()))?;
        self.draft = NodeDraft::from_node(node);
        self.selected = Some(id.clone());
        debug!(node = %id, "selected for edit");
        Ok(())
    }

    /// Reset to an empty question draft with no selection.
    pub fn new_draft(&mut self) {
        self.selected = None;
        self.draft = NodeDraft::default();
    }

    pub fn set_field(&mut self, field: DraftField, value: &str) -> DomainResult<()> {
        match field {
            DraftField::Text => self.draft.text = value.to_string(),
            DraftField::Kind => self.draft.kind = value.parse()?,
        }
        Ok(())
    }

    pub fn set_option(&mut self, index: usize, field: OptionField, value: &str) -> DomainResult<()> {
        let len = self.draft.options.len();
        let option = self
            .draft
            .options
            .get_mut(index)
            .ok_or(DomainError::OptionIndexOutOfRange { index, len })?;
        match field {
            OptionField::Text => option.text = value.to_string(),
            OptionField::Target => option.next_node_id = parse_target(value),
        }
        Ok(())
    }

    /// Append an empty, unlinked option.
    pub fn add_option(&mut self) -> usize {
        self.draft.options.push(TreeOption::default());
        self.draft.options.len() - 1
    }

    pub fn remove_option(&mut self, index: usize) -> DomainResult<TreeOption> {
        let len = self.draft.options.len();
        if index >= len {
            return Err(DomainError::OptionIndexOutOfRange { index, len });
        }
        Ok(self.draft.options.remove(index))
    }

    pub fn clear_options(&mut self) {
        self.draft.options.clear();
    }

    /// Validate the draft; nothing is written when this fails.
    pub fn prepare_save(&self) -> DomainResult<PendingSave> {
        Ok(PendingSave {
            existing: self.selected.clone(),
            payload: self.draft.validated()?,
        })
    }

    /// Adopt the refreshed node list after a store write and reset the draft.
    pub fn complete_save(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        self.new_draft();
    }

    pub fn replace_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes;
        if let Some(selected) = &self.selected {
            if self.nodes.iter().all(|n| &n.id != selected) {
                self.new_draft();
            }
        }
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }
}
