//! Tests for NodeStore and TreeMetadataService

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use soltree::application::documents;
use soltree::application::services::{NodeStore, TreeMetadataService};
use soltree::application::ApplicationError;
use soltree::domain::{DomainError, NodeDraft, NodeId, NodeKind, TreeId, TreeOption, TreeReport};
use soltree::infrastructure::store::MemoryStore;
use soltree::infrastructure::traits::DocumentStore;
use soltree::util::testing;

fn question(text: &str) -> NodeDraft {
    NodeDraft {
        kind: NodeKind::Question,
        text: text.to_string(),
        options: vec![TreeOption::new("Sí", None)],
    }
}

#[test]
fn given_nodes_of_two_trees_when_loading_then_only_matching_tree() {
    // Arrange
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let nodes = NodeStore::new(store);
    let t1 = TreeId::new("t1");
    let t2 = TreeId::new("t2");
    nodes.save_node(&t1, &question("a"), None).unwrap();
    nodes.save_node(&t1, &question("b"), None).unwrap();
    nodes.save_node(&t2, &question("c"), None).unwrap();

    // Act
    let loaded = nodes.load_nodes(&t1).unwrap();

    // Assert
    assert_eq!(loaded.len(), 2);
    assert!(loaded.iter().all(|n| n.tree_id == t1));
}

#[test]
fn given_missing_node_when_updating_then_node_not_found() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let nodes = NodeStore::new(store);

    let result = nodes.save_node(&TreeId::new("t1"), &question("a"), Some(&NodeId::new("gone")));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::NodeNotFound(_)))
    ));
}

#[test]
fn given_saved_node_when_updating_then_tree_id_kept() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let nodes = NodeStore::new(store.clone());
    let t1 = TreeId::new("t1");
    let created = nodes.save_node(&t1, &question("a"), None).unwrap();

    nodes
        .save_node(&t1, &question("a2"), Some(&created.id))
        .unwrap();

    let doc = store.get("treeNodes", created.id.as_str()).unwrap().unwrap();
    assert_eq!(doc.fields["treeId"], json!("t1"));
    assert_eq!(doc.fields["text"], json!("a2"));
}

#[test]
fn given_missing_metadata_when_loading_tree_then_none() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let trees = TreeMetadataService::new(store);

    assert!(trees.load_tree(&TreeId::new("t1")).unwrap().is_none());
    assert!(trees.root_of(&TreeId::new("t1")).unwrap().is_none());
}

#[test]
fn given_tree_when_setting_root_to_foreign_node_then_stored_unchecked() {
    // Arrange
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    store
        .set(
            "solutionTrees",
            "t1",
            documents::new_tree_fields("Filtro", Utc::now()).unwrap(),
        )
        .unwrap();
    let trees = TreeMetadataService::new(store);

    // Act
    trees
        .set_root(&TreeId::new("t1"), &NodeId::new("elsewhere"))
        .unwrap();

    // Assert
    let tree = trees.load_tree(&TreeId::new("t1")).unwrap().unwrap();
    assert_eq!(tree.root_node_id, Some(NodeId::new("elsewhere")));
    assert_eq!(tree.title, "Filtro");
    assert_eq!(trees.tree_title(&TreeId::new("t1")).unwrap(), "Filtro");
}

#[test]
fn given_solution_root_with_stale_options_when_loading_then_leaf_and_target_unreachable() {
    // Arrange
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    store
        .set(
            "treeNodes",
            "A",
            json!({
                "treeId": "t1", "text": "Replace filter", "type": "solution",
                "options": [{"text": "old", "nextNodeId": "B"}]
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();
    store
        .set(
            "treeNodes",
            "B",
            json!({"treeId": "t1", "text": "¿Enciende?", "type": "question", "options": []})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();

    // Act
    let loaded = NodeStore::new(store).load_nodes(&TreeId::new("t1")).unwrap();
    let report = TreeReport::build(Some(&NodeId::new("A")), &loaded);

    // Assert
    let a = loaded.iter().find(|n| n.id == NodeId::new("A")).unwrap();
    assert!(a.options.is_empty());
    assert_eq!(report.unreachable, vec![NodeId::new("B")]);
}
