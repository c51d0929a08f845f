//! Application services

pub mod content;
pub mod editor;
pub mod node_store;
pub mod tree_metadata;
pub mod viewer;

pub use content::ContentService;
pub use editor::{compose_text, EditorService};
pub use node_store::NodeStore;
pub use tree_metadata::TreeMetadataService;
pub use viewer::{OpenedTree, ViewerService, WalkOutcome};
