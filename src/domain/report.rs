//! Integrity report for a tree's node set.
//!
//! Saving never rejects dangling targets, so authors can build a node before
//! its target exists. This report is how they find what is still unlinked.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::domain::entities::{Node, NodeId};

/// State of the tree's entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RootStatus {
    Missing,
    Dangling(NodeId),
    Ok(NodeId),
}

/// Option whose target does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingOption {
    pub node_id: NodeId,
    pub option_index: usize,
    pub label: String,
    /// `None` for an unlinked option
    pub target: Option<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeReport {
    pub root: RootStatus,
    pub dangling: Vec<DanglingOption>,
    /// Nodes that cannot be reached from the root (sorted)
    pub unreachable: Vec<NodeId>,
    /// Question nodes without any option
    pub empty_questions: Vec<NodeId>,
}

impl TreeReport {
    pub fn build(root: Option<&NodeId>, nodes: &[Node]) -> Self {
        let by_id: HashMap<&NodeId, &Node> = nodes.iter().map(|n| (&n.id, n)).collect();

        let root = match root {
            None => RootStatus::Missing,
            Some(id) if by_id.contains_key(id) => RootStatus::Ok(id.clone()),
            Some(id) => RootStatus::Dangling(id.clone()),
        };

        let mut dangling = Vec::new();
        let mut empty_questions = Vec::new();
        for node in nodes.iter().filter(|n| n.is_question()) {
            if node.options.is_empty() {
                empty_questions.push(node.id.clone());
            }
            for (idx, option) in node.options.iter().enumerate() {
                let resolves = option
                    .next_node_id
                    .as_ref()
                    .map(|t| by_id.contains_key(t))
                    .unwrap_or(false);
                if !resolves {
                    dangling.push(DanglingOption {
                        node_id: node.id.clone(),
                        option_index: idx,
                        label: option.text.clone(),
                        target: option.next_node_id.clone(),
                    });
                }
            }
        }

        // BFS from root; everything not visited is unreachable
        let mut visited: HashSet<&NodeId> = HashSet::new();
        if let RootStatus::Ok(root_id) = &root {
            let mut queue = VecDeque::new();
            queue.push_back(root_id);
            while let Some(current) = queue.pop_front() {
                let Some(node) = by_id.get(current) else {
                    continue;
                };
                if !visited.insert(&node.id) || node.is_solution() {
                    continue;
                }
                for target in node.options.iter().filter_map(|o| o.next_node_id.as_ref()) {
                    if !visited.contains(target) {
                        queue.push_back(target);
                    }
                }
            }
        }
        let mut unreachable: Vec<NodeId> = nodes
            .iter()
            .filter(|n| !visited.contains(&n.id))
            .map(|n| n.id.clone())
            .collect();
        unreachable.sort();
        empty_questions.sort();

        Self {
            root,
            dangling,
            unreachable,
            empty_questions,
        }
    }

    /// True when the tree can be walked end to end without surprises.
    pub fn is_clean(&self) -> bool {
        matches!(self.root, RootStatus::Ok(_))
            && self.dangling.is_empty()
            && self.unreachable.is_empty()
            && self.empty_questions.is_empty()
    }
}
