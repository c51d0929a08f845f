//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::{ContentId, ContentKind, NodeId, TreeId};
use crate::domain::traversal::TraversalError;

/// Domain errors represent business logic violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("node text must not be empty")]
    EmptyText,

    #[error("invalid node kind: {0} (expected 'question' or 'solution')")]
    InvalidNodeKind(String),

    #[error("invalid content kind: {0} (expected 'video', 'pdf' or 'tree')")]
    InvalidContentKind(String),

    #[error("option index {index} out of range (node has {len} options)")]
    OptionIndexOutOfRange { index: usize, len: usize },

    #[error("invalid option spec: {0} (expected 'label' or 'label=>node-id')")]
    InvalidOptionSpec(String),

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("tree not found: {0}")]
    TreeNotFound(TreeId),

    #[error("content not found: {0}")]
    ContentNotFound(ContentId),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{0} content requires a file url")]
    MissingFileUrl(ContentKind),

    #[error("content kind cannot change from {from} to {to}")]
    KindChangeNotAllowed { from: ContentKind, to: ContentKind },

    #[error("{0}")]
    Traversal(#[from] TraversalError),
}

impl DomainError {
    /// True for errors caused by bad author input rather than missing records.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            DomainError::NodeNotFound(_)
                | DomainError::TreeNotFound(_)
                | DomainError::ContentNotFound(_)
                | DomainError::Traversal(_)
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
