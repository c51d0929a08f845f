//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod editor;
pub mod entities;
pub mod error;
pub mod render;
pub mod report;
pub mod traversal;

pub use editor::{DraftField, EditorSession, NodeDraft, OptionField, PendingSave};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use report::{DanglingOption, RootStatus, TreeReport};
pub use traversal::{TraversalError, TraversalSession, TraversalState};

/// Expand environment variables and `~` in a path string.
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
