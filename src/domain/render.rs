//! Text rendering of a tree from its root using `termtree`.

use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use termtree::Tree;

use crate::domain::entities::{Node, NodeId, NodeKind, TreeOption};

fn node_label(node: &Node) -> String {
    match node.kind {
        NodeKind::Question => format!("? {}", node.text),
        NodeKind::Solution => format!("✓ {}", node.text),
    }
}

/// Render the graph reachable from `root`.
///
/// Every node is expanded once. A node reached again on the current branch is
/// shown with a `↺` marker (cycle); one already printed elsewhere is shown
/// with `↻ ... (see above)`. Solutions are leaves.
pub fn render_tree(title: &str, root: Option<&NodeId>, nodes: &[Node]) -> Tree<String> {
    let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();
    let mut top = Tree::new(title.to_string());

    match root.and_then(|id| by_id.get(id).copied()) {
        Some(root_node) => {
            let mut walk = RenderWalk {
                by_id: &by_id,
                on_branch: HashSet::new(),
                printed: HashSet::new(),
            };
            top.push(walk.build(root_node));
        }
        None => {
            top.push(Tree::new("(no root configured)".to_string()));
        }
    }
    top
}

struct RenderWalk<'a, 'm> {
    by_id: &'m HashMap<&'a NodeId, &'a Node>,
    on_branch: HashSet<&'a NodeId>,
    printed: HashSet<&'a NodeId>,
}

impl<'a, 'm> RenderWalk<'a, 'm> {
    fn build(&mut self, node: &'a Node) -> Tree<String> {
        let mut tree = Tree::new(node_label(node));
        self.on_branch.insert(&node.id);
        self.printed.insert(&node.id);

        if node.is_question() {
            for option in &node.options {
                let edge = self.edge(option);
                tree.push(edge);
            }
        }

        self.on_branch.remove(&node.id);
        tree
    }

    fn edge(&mut self, option: &'a TreeOption) -> Tree<String> {
        let Some(target) = option.next_node_id.as_ref() else {
            return Tree::new(format!("[{}] → (unlinked)", option.text));
        };
        match self.by_id.get(target).copied() {
            None => Tree::new(format!("[{}] → (missing node {})", option.text, target)),
            Some(next) if self.on_branch.contains(&next.id) => {
                Tree::new(format!("[{}] → ↺ {}", option.text, next.text))
            }
            Some(next) if self.printed.contains(&next.id) => {
                Tree::new(format!("[{}] → ↻ {} (see above)", option.text, next.text))
            }
            Some(next) => {
                let child = self.build(next);
                Tree::new(format!("[{}]", option.text)).with_leaves([child])
            }
        }
    }
}

/// Flat listing of every node (root marked with `*`).
pub fn render_node_list(root: Option<&NodeId>, nodes: &[Node]) -> Vec<String> {
    nodes
        .iter()
        .sorted_by(|a, b| a.id.cmp(&b.id))
        .map(|n| {
            let marker = if Some(&n.id) == root { "*" } else { " " };
            format!("{} {} {:<8} {}", marker, n.id, n.kind, n.text)
        })
        .collect()
}
