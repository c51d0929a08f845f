//! Viewer service: opens a tree for traversal and drives interactive walks.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::{NodeStore, TreeMetadataService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, Node, NodeId, TraversalError, TraversalSession, TreeId};
use crate::infrastructure::traits::{DocumentStore, SelectionItem, Selector};

const RESTART: &str = "↺ Restart";
const DONE: &str = "✓ Done";

/// A tree loaded for viewing.
#[derive(Debug, Clone)]
pub struct OpenedTree {
    pub title: String,
    pub session: TraversalSession,
}

/// How an interactive walk ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkOutcome {
    NoRootConfigured,
    /// User left at a solution
    Finished { solution: NodeId },
    /// User cancelled the selection
    Cancelled { at: NodeId },
    /// Question node without options
    DeadEnd { at: NodeId },
    /// Selected option points nowhere
    Dangling {
        from: NodeId,
        target: Option<NodeId>,
    },
}

pub struct ViewerService {
    nodes: NodeStore,
    trees: TreeMetadataService,
}

impl ViewerService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            nodes: NodeStore::new(store.clone()),
            trees: TreeMetadataService::new(store),
        }
    }

    /// Load title, root and nodes; missing metadata means no root.
    pub fn open(&self, tree_id: &TreeId) -> ApplicationResult<OpenedTree> {
        let title = self.trees.tree_title(tree_id)?;
        let nodes = self.nodes.load_nodes(tree_id)?;
        let root = self.trees.root_of(tree_id)?;
        debug!("open: tree={} nodes={} root={:?}", tree_id, nodes.len(), root);
        Ok(OpenedTree {
            title,
            session: TraversalSession::new(root, nodes),
        })
    }

    /// Walk the session with `selector` until a solution is left, the user
    /// cancels, or a dangling option is hit. `on_node` sees every node shown
    /// together with the path walked to reach it.
    pub fn walk(
        &self,
        session: &mut TraversalSession,
        selector: &dyn Selector,
        prompt: &str,
        mut on_node: impl FnMut(&Node, &[&Node]),
    ) -> ApplicationResult<WalkOutcome> {
        loop {
            let node = match session.current() {
                Ok(node) => node.clone(),
                Err(TraversalError::NoRootConfigured) => return Ok(WalkOutcome::NoRootConfigured),
                Err(TraversalError::DanglingTarget { from, target }) => {
                    return Ok(WalkOutcome::Dangling { from, target })
                }
                Err(e) => return Err(DomainError::from(e).into()),
            };
            on_node(&node, &session.path());

            if node.is_solution() {
                let items = [item(RESTART, "restart"), item(DONE, "done")];
                match choose(selector, &items, prompt)? {
                    Some(choice) if choice.value == "restart" => {
                        session.restart().map_err(DomainError::from)?;
                    }
                    _ => return Ok(WalkOutcome::Finished { solution: node.id }),
                }
                continue;
            }

            if node.options.is_empty() {
                return Ok(WalkOutcome::DeadEnd { at: node.id });
            }
            let items: Vec<SelectionItem> = node
                .options
                .iter()
                .enumerate()
                .map(|(i, o)| item(&format!("{}. {}", i + 1, o.text), &i.to_string()))
                .collect();
            let Some(choice) = choose(selector, &items, prompt)? else {
                return Ok(WalkOutcome::Cancelled { at: node.id });
            };
            let index: usize = choice.value.parse().map_err(|_| ApplicationError::Selection {
                message: format!("unexpected selection: {}", choice.display),
            })?;
            match session.select_option(index) {
                Ok(_) | Err(TraversalError::DanglingTarget { .. }) => {}
                Err(e) => return Err(DomainError::from(e).into()),
            }
        }
    }
}

fn item(display: &str, value: &str) -> SelectionItem {
    SelectionItem {
        display: display.to_string(),
        value: value.to_string(),
    }
}

fn choose(
    selector: &dyn Selector,
    items: &[SelectionItem],
    prompt: &str,
) -> ApplicationResult<Option<SelectionItem>> {
    selector
        .select_one(items, prompt)
        .map_err(|message| ApplicationError::Selection { message })
}
