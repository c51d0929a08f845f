//! Mapping between domain entities and store documents.
//!
//! Field names follow the hosted collections: `solutionTrees`
//! (`title`, `createdAt`, `rootNodeId`), `treeNodes` (`treeId`, `text`,
//! `type`, `options[{text, nextNodeId}]`) and `content`.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{
    parse_target, Content, ContentId, ContentKind, Node, NodeDraft, NodeId, NodeKind, Tree, TreeId,
    TreeOption,
};
use crate::infrastructure::traits::{Document, Fields};

pub const TREES: &str = "solutionTrees";
pub const NODES: &str = "treeNodes";
pub const CONTENT: &str = "content";

/// Field holding a node's owning tree.
pub const NODE_TREE_FIELD: &str = "treeId";
/// Field holding a content record's tree reference.
pub const CONTENT_TREE_FIELD: &str = "treeId";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionRecord {
    #[serde(default)]
    text: String,
    // empty string means unlinked
    #[serde(default)]
    next_node_id: String,
}

/// Fields an editor save replaces.
#[derive(Debug, Serialize, Deserialize)]
struct NodeBody {
    #[serde(default)]
    text: String,
    #[serde(rename = "type", default)]
    kind: NodeKind,
    #[serde(default)]
    options: Vec<OptionRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeRecord {
    tree_id: String,
    #[serde(flatten)]
    body: NodeBody,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TreeRecord {
    #[serde(default)]
    title: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    root_node_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentRecord {
    title: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    #[serde(default)]
    category: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tree_id: Option<String>,
}

fn to_fields<T: Serialize>(value: &T, what: &str) -> ApplicationResult<Fields> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApplicationError::OperationFailed {
            context: format!("encode {what}"),
            source: format!("expected an object, got {other}").into(),
        }),
        Err(e) => Err(ApplicationError::OperationFailed {
            context: format!("encode {what}"),
            source: Box::new(e),
        }),
    }
}

fn decode<T: DeserializeOwned>(doc: &Document, collection: &str) -> ApplicationResult<T> {
    serde_json::from_value(Value::Object(doc.fields.clone())).map_err(|e| {
        ApplicationError::OperationFailed {
            context: format!("decode {}/{}", collection, doc.id),
            source: Box::new(e),
        }
    })
}

fn body_from_draft(draft: &NodeDraft) -> NodeBody {
    NodeBody {
        text: draft.text.clone(),
        kind: draft.kind,
        options: draft
            .options
            .iter()
            .map(|o| OptionRecord {
                text: o.text.clone(),
                next_node_id: o
                    .next_node_id
                    .as_ref()
                    .map(|id| id.as_str().to_string())
                    .unwrap_or_default(),
            })
            .collect(),
    }
}

/// Full document for a new node.
pub fn new_node_fields(tree_id: &TreeId, draft: &NodeDraft) -> ApplicationResult<Fields> {
    let record = NodeRecord {
        tree_id: tree_id.to_string(),
        body: body_from_draft(draft),
    };
    to_fields(&record, "node")
}

/// Partial document replacing `text`, `type` and `options`.
pub fn node_update_fields(draft: &NodeDraft) -> ApplicationResult<Fields> {
    to_fields(&body_from_draft(draft), "node update")
}

pub fn node_from_document(doc: &Document) -> ApplicationResult<Node> {
    let record: NodeRecord = decode(doc, NODES)?;
    let kind = record.body.kind;
    // Solutions are leaves, whatever an older write left in `options`
    let options = match kind {
        NodeKind::Solution => Vec::new(),
        NodeKind::Question => record
            .body
            .options
            .into_iter()
            .map(|o| TreeOption::new(o.text, parse_target(&o.next_node_id)))
            .collect(),
    };
    Ok(Node {
        id: NodeId::new(doc.id.as_str()),
        tree_id: TreeId::new(record.tree_id),
        kind,
        text: record.body.text,
        options,
    })
}

pub fn new_tree_fields(title: &str, created_at: DateTime<Utc>) -> ApplicationResult<Fields> {
    let record = TreeRecord {
        title: title.to_string(),
        created_at: Some(created_at),
        root_node_id: None,
    };
    to_fields(&record, "tree")
}

pub fn root_update_fields(node_id: &NodeId) -> Fields {
    let mut fields = Fields::new();
    fields.insert("rootNodeId".to_string(), Value::String(node_id.to_string()));
    fields
}

pub fn tree_from_document(doc: &Document) -> ApplicationResult<Tree> {
    let record: TreeRecord = decode(doc, TREES)?;
    Ok(Tree {
        id: TreeId::new(doc.id.as_str()),
        title: record.title,
        created_at: record.created_at.unwrap_or_else(Utc::now),
        root_node_id: record.root_node_id.as_deref().and_then(parse_target),
    })
}

pub struct ContentFields<'a> {
    pub title: &'a str,
    pub kind: ContentKind,
    pub category: &'a str,
    pub created_at: DateTime<Utc>,
    pub file_url: Option<&'a str>,
    pub tree_id: Option<&'a TreeId>,
}

pub fn content_fields(content: ContentFields<'_>) -> ApplicationResult<Fields> {
    let record = ContentRecord {
        title: content.title.to_string(),
        kind: content.kind,
        category: content.category.to_string(),
        created_at: Some(content.created_at),
        file_url: content.file_url.map(str::to_string),
        tree_id: content.tree_id.map(|id| id.to_string()),
    };
    to_fields(&record, "content")
}

pub fn content_from_document(doc: &Document) -> ApplicationResult<Content> {
    let record: ContentRecord = decode(doc, CONTENT)?;
    Ok(Content {
        id: ContentId::new(doc.id.as_str()),
        title: record.title,
        kind: record.kind,
        category: record.category,
        created_at: record.created_at.unwrap_or_else(Utc::now),
        file_url: record.file_url.filter(|u| !u.is_empty()),
        tree_id: record.tree_id.filter(|id| !id.is_empty()).map(TreeId::new),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_stored_node_when_decoding_then_empty_target_is_unlinked() {
        let doc = Document::new(
            "n1",
            json!({
                "treeId": "t1",
                "text": "¿Enciende?",
                "type": "question",
                "options": [
                    {"text": "Sí", "nextNodeId": "n2"},
                    {"text": "No", "nextNodeId": ""}
                ]
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        let node = node_from_document(&doc).unwrap();
        assert_eq!(node.id, NodeId::new("n1"));
        assert_eq!(node.tree_id, TreeId::new("t1"));
        assert_eq!(node.options[0].next_node_id, Some(NodeId::new("n2")));
        assert_eq!(node.options[1].next_node_id, None);
    }

    #[test]
    fn given_node_without_options_field_when_decoding_then_empty() {
        let doc = Document::new(
            "n1",
            json!({"treeId": "t1", "text": "Cambiar filtro", "type": "solution"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let node = node_from_document(&doc).unwrap();
        assert!(node.is_solution());
        assert!(node.options.is_empty());
    }

    #[test]
    fn given_solution_with_stale_options_when_decoding_then_options_dropped() {
        let doc = Document::new(
            "A",
            json!({
                "treeId": "t1",
                "text": "Cambiar filtro",
                "type": "solution",
                "options": [{"text": "old", "nextNodeId": "B"}]
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        let node = node_from_document(&doc).unwrap();
        assert!(node.is_solution());
        assert!(node.options.is_empty());
    }

    #[test]
    fn given_draft_when_encoding_then_uses_store_field_names() {
        let draft = NodeDraft {
            kind: NodeKind::Question,
            text: "q".into(),
            options: vec![TreeOption::new("No", None)],
        };
        let fields = new_node_fields(&TreeId::new("t1"), &draft).unwrap();
        assert_eq!(fields.get("treeId"), Some(&json!("t1")));
        assert_eq!(fields.get("type"), Some(&json!("question")));
        assert_eq!(fields["options"][0]["nextNodeId"], json!(""));

        let update = node_update_fields(&draft).unwrap();
        assert!(!update.contains_key("treeId"));
    }

    #[test]
    fn given_new_tree_when_encoding_then_root_is_null() {
        let fields = new_tree_fields("Filtro", Utc::now()).unwrap();
        assert_eq!(fields.get("rootNodeId"), Some(&Value::Null));
        let tree = tree_from_document(&Document::new("t1", fields)).unwrap();
        assert_eq!(tree.root_node_id, None);
        assert_eq!(tree.title, "Filtro");
    }

    #[test]
    fn given_empty_root_string_when_decoding_tree_then_none() {
        let doc = Document::new(
            "t1",
            json!({"title": "x", "rootNodeId": ""}).as_object().cloned().unwrap(),
        );
        assert_eq!(tree_from_document(&doc).unwrap().root_node_id, None);
    }

    #[test]
    fn given_spanish_content_kind_label_when_decoding_then_tree() {
        let doc = Document::new(
            "c1",
            json!({"title": "Diagnóstico", "type": "Árbol de Soluciones", "category": "", "treeId": "t1"})
                .as_object()
                .cloned()
                .unwrap(),
        );
        let content = content_from_document(&doc).unwrap();
        assert_eq!(content.kind, ContentKind::DecisionTree);
        assert_eq!(content.tree_id, Some(TreeId::new("t1")));
    }
}
