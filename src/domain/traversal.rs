//! Traversal engine: walks a loaded tree one option at a time.
//!
//! A [`TraversalSession`] owns the node set of one tree and the current
//! position. It starts at the root, or in [`TraversalState::NoRootConfigured`]
//! when the tree has no usable root. Selecting an option moves to its target;
//! a target that does not resolve leaves the session in
//! [`TraversalState::Dangling`] until the next restart.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::entities::{Node, NodeId};

/// Errors raised while walking a tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraversalError {
    #[error("tree has no root node configured")]
    NoRootConfigured,

    #[error("option leads to a node that does not exist: {}", describe_target(.target))]
    DanglingTarget { from: NodeId, target: Option<NodeId> },

    #[error("node not found in tree: {0}")]
    NodeNotFound(NodeId),

    #[error("option {index} does not exist (node has {len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    #[error("node {0} is a solution, only restart is possible")]
    TerminalNode(NodeId),
}

fn describe_target(target: &Option<NodeId>) -> &str {
    target.as_ref().map(NodeId::as_str).unwrap_or("<unlinked>")
}

/// Position of a traversal session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraversalState {
    /// Root missing or not part of the loaded node set
    NoRootConfigured,
    /// Displaying a node
    AtNode(NodeId),
    /// The last selected option pointed nowhere
    Dangling {
        from: NodeId,
        target: Option<NodeId>,
    },
}

/// Explicit traversal context for one viewer of one tree.
#[derive(Debug, Clone)]
pub struct TraversalSession {
    root: Option<NodeId>,
    nodes: HashMap<NodeId, Node>,
    state: TraversalState,
    path: Vec<NodeId>,
}

impl TraversalSession {
    /// Build a session positioned at the root.
    ///
    /// A root that is `None` or not among `nodes` yields `NoRootConfigured`.
    pub fn new(root: Option<NodeId>, nodes: impl IntoIterator<Item = Node>) -> Self {
        let nodes: HashMap<NodeId, Node> = nodes.into_iter().map(|n| (n.id.clone(), n)).collect();
        let root = root.filter(|id| nodes.contains_key(id));
        let mut session = Self {
            root,
            nodes,
            state: TraversalState::NoRootConfigured,
            path: Vec::new(),
        };
        session.reset_to_root();
        debug!(state = ?session.state, nodes = session.nodes.len(), "traversal session created");
        session
    }

    pub fn state(&self) -> &TraversalState {
        &self.state
    }

    /// Root node, if configured and resolvable.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref().and_then(|id| self.nodes.get(id))
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node currently displayed.
    pub fn current(&self) -> Result<&Node, TraversalError> {
        match &self.state {
            TraversalState::NoRootConfigured => Err(TraversalError::NoRootConfigured),
            TraversalState::Dangling { from, target } => Err(TraversalError::DanglingTarget {
                from: from.clone(),
                target: target.clone(),
            }),
            TraversalState::AtNode(id) => self
                .nodes
                .get(id)
                .ok_or_else(|| TraversalError::NodeNotFound(id.clone())),
        }
    }

    /// True when the current node is a solution.
    pub fn is_finished(&self) -> bool {
        self.current().map(Node::is_solution).unwrap_or(false)
    }

    /// Follow option `index` of the current question node.
    #[instrument(level = "debug", skip(self))]
    pub fn select_option(&mut self, index: usize) -> Result<&Node, TraversalError> {
        let current = self.current()?;
        if current.is_solution() {
            return Err(TraversalError::TerminalNode(current.id.clone()));
        }
        let option = current
            .options
            .get(index)
            .ok_or(TraversalError::OptionOutOfRange {
                index,
                len: current.options.len(),
            })?;
        let from = current.id.clone();
        let target = option.next_node_id.clone();

        match target.as_ref().filter(|id| self.nodes.contains_key(*id)) {
            Some(next) => {
                debug!(%from, to = %next, "option selected");
                self.path.push(next.clone());
                self.state = TraversalState::AtNode(next.clone());
                self.current()
            }
            None => {
                debug!(%from, target = describe_target(&target), "dangling option");
                self.state = TraversalState::Dangling {
                    from: from.clone(),
                    target: target.clone(),
                };
                Err(TraversalError::DanglingTarget { from, target })
            }
        }
    }

    /// Return to the root regardless of the current position.
    pub fn restart(&mut self) -> Result<&Node, TraversalError> {
        self.reset_to_root();
        self.current()
    }

    /// Jump directly to a node of this tree.
    pub fn go_to(&mut self, id: &NodeId) -> Result<&Node, TraversalError> {
        if !self.nodes.contains_key(id) {
            return Err(TraversalError::NodeNotFound(id.clone()));
        }
        self.path.push(id.clone());
        self.state = TraversalState::AtNode(id.clone());
        self.current()
    }

    /// Nodes visited since the last restart, root first.
    pub fn path(&self) -> Vec<&Node> {
        self.path.iter().filter_map(|id| self.nodes.get(id)).collect()
    }

    fn reset_to_root(&mut self) {
        self.path.clear();
        self.state = match &self.root {
            Some(root) => {
                self.path.push(root.clone());
                TraversalState::AtNode(root.clone())
            }
            None => TraversalState::NoRootConfigured,
        };
    }
}
