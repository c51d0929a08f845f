//! Domain entities: core data structures

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifier of a solution tree (store-assigned).
    TreeId
);
string_id!(
    /// Identifier of a tree node, unique within its tree.
    NodeId
);
string_id!(
    /// Identifier of a content catalog record.
    ContentId
);

/// Whether a node branches or ends the walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Prompt with labeled options leading to other nodes
    #[default]
    Question,
    /// Terminal diagnostic message
    Solution,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Question => "question",
            NodeKind::Solution => "solution",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "question" | "q" => Ok(NodeKind::Question),
            "solution" | "s" => Ok(NodeKind::Solution),
            _ => Err(DomainError::InvalidNodeKind(s.to_string())),
        }
    }
}

/// Labeled edge from a question node to a target node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeOption {
    /// Label shown to the user
    pub text: String,
    /// Target node; `None` means unlinked
    pub next_node_id: Option<NodeId>,
}

impl TreeOption {
    pub fn new(text: impl Into<String>, next_node_id: Option<NodeId>) -> Self {
        Self {
            text: text.into(),
            next_node_id,
        }
    }

    pub fn linked(text: impl Into<String>, target: impl Into<NodeId>) -> Self {
        Self::new(text, Some(target.into()))
    }

    pub fn is_linked(&self) -> bool {
        self.next_node_id.is_some()
    }
}

/// Parses `label` or `label=>node-id`.
impl FromStr for TreeOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (label, target) = match s.split_once("=>") {
            Some((label, target)) => (label.trim(), target.trim()),
            None => (s.trim(), ""),
        };
        if label.is_empty() {
            return Err(DomainError::InvalidOptionSpec(s.to_string()));
        }
        Ok(Self::new(label, parse_target(target)))
    }
}

/// Empty or blank target means "unlinked".
pub fn parse_target(value: &str) -> Option<NodeId> {
    let value = value.trim();
    (!value.is_empty()).then(|| NodeId::new(value))
}

/// A question or solution unit of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub tree_id: TreeId,
    pub kind: NodeKind,
    /// Prompt (question) or diagnostic message (solution)
    pub text: String,
    /// Ordered options; display order is selection order
    pub options: Vec<TreeOption>,
}

impl Node {
    pub fn is_solution(&self) -> bool {
        self.kind == NodeKind::Solution
    }

    pub fn is_question(&self) -> bool {
        self.kind == NodeKind::Question
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.text, self.kind)
    }
}

/// Tree-level metadata: title and designated entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub id: TreeId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    /// Entry point for traversal; `None` until an author picks one
    pub root_node_id: Option<NodeId>,
}

/// Kind of catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    #[serde(rename = "Video")]
    Video,
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "Árbol de Soluciones")]
    DecisionTree,
}

impl ContentKind {
    /// Video and PDF records point to a hosted file.
    pub fn requires_file(&self) -> bool {
        matches!(self, ContentKind::Video | ContentKind::Pdf)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ContentKind::Video => "video",
            ContentKind::Pdf => "pdf",
            ContentKind::DecisionTree => "tree",
        };
        f.write_str(label)
    }
}

impl FromStr for ContentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(ContentKind::Video),
            "pdf" => Ok(ContentKind::Pdf),
            "tree" | "decision-tree" | "decision_tree" | "árbol de soluciones" => {
                Ok(ContentKind::DecisionTree)
            }
            _ => Err(DomainError::InvalidContentKind(s.to_string())),
        }
    }
}

/// Catalog record; decision trees reference their backing tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub id: ContentId,
    pub title: String,
    pub kind: ContentKind,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub file_url: Option<String>,
    pub tree_id: Option<TreeId>,
}

/// Author input for creating or updating a catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentDraft {
    pub title: String,
    pub kind: Option<ContentKind>,
    pub category: String,
    pub file_url: Option<String>,
}

impl ContentDraft {
    /// Check required fields and return the resolved kind.
    pub fn validate(&self) -> Result<ContentKind, DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::MissingField("title"));
        }
        let kind = self.kind.ok_or(DomainError::MissingField("kind"))?;
        let has_url = self
            .file_url
            .as_deref()
            .map(|u| !u.trim().is_empty())
            .unwrap_or(false);
        if kind.requires_file() && !has_url {
            return Err(DomainError::MissingFileUrl(kind));
        }
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_label_with_target_when_parsing_option_then_links() {
        let opt: TreeOption = "Sí => abc".parse().unwrap();
        assert_eq!(opt.text, "Sí");
        assert_eq!(opt.next_node_id, Some(NodeId::new("abc")));
    }

    #[test]
    fn given_label_only_when_parsing_option_then_unlinked() {
        let opt: TreeOption = "No".parse().unwrap();
        assert_eq!(opt.text, "No");
        assert!(!opt.is_linked());

        let opt: TreeOption = "No=>  ".parse().unwrap();
        assert!(!opt.is_linked());
    }

    #[test]
    fn given_empty_label_when_parsing_option_then_error() {
        assert!(matches!(
            "=>abc".parse::<TreeOption>(),
            Err(DomainError::InvalidOptionSpec(_))
        ));
    }

    #[test]
    fn given_kind_strings_when_parsing_then_accepts_aliases() {
        assert_eq!("Solution".parse::<NodeKind>().unwrap(), NodeKind::Solution);
        assert_eq!("q".parse::<NodeKind>().unwrap(), NodeKind::Question);
        assert!("leaf".parse::<NodeKind>().is_err());
        assert_eq!(
            "Árbol de Soluciones".parse::<ContentKind>().unwrap(),
            ContentKind::DecisionTree
        );
    }

    #[test]
    fn given_video_without_url_when_validating_then_rejected() {
        let draft = ContentDraft {
            title: "Cambio de filtro".into(),
            kind: Some(ContentKind::Video),
            category: "mantenimiento".into(),
            file_url: Some("  ".into()),
        };
        assert_eq!(
            draft.validate(),
            Err(DomainError::MissingFileUrl(ContentKind::Video))
        );
    }

    #[test]
    fn given_tree_without_url_when_validating_then_ok() {
        let draft = ContentDraft {
            title: "Diagnóstico".into(),
            kind: Some(ContentKind::DecisionTree),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Ok(ContentKind::DecisionTree));
    }

    #[test]
    fn given_missing_title_or_kind_when_validating_then_rejected() {
        let draft = ContentDraft::default();
        assert_eq!(draft.validate(), Err(DomainError::MissingField("title")));
        let draft = ContentDraft {
            title: "x".into(),
            ..Default::default()
        };
        assert_eq!(draft.validate(), Err(DomainError::MissingField("kind")));
    }
}
