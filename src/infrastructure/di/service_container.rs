//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{ContentService, EditorService, ViewerService};
use crate::config::Settings;
use crate::infrastructure::store::JsonFileStore;
use crate::infrastructure::traits::{
    DocumentStore, Editor, EnvironmentEditor, FileSystem, RealFileSystem, Selector, SkimSelector,
};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Document store backing trees, nodes and content
    pub store: Arc<dyn DocumentStore>,

    /// Interactive selector (walk)
    pub selector: Arc<dyn Selector>,

    /// Editor used to compose node text
    pub editor: Arc<dyn Editor>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let store = Arc::new(JsonFileStore::new(settings.store_path.clone(), fs));
        let editor = Arc::new(EnvironmentEditor::with_command(settings.editor.clone()));
        Self::with_deps(settings, store, Arc::new(SkimSelector), editor)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        store: Arc<dyn DocumentStore>,
        selector: Arc<dyn Selector>,
        editor: Arc<dyn Editor>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            store,
            selector,
            editor,
        }
    }

    pub fn content_service(&self) -> ContentService {
        ContentService::new(self.store.clone())
    }

    pub fn editor_service(&self) -> EditorService {
        EditorService::new(self.store.clone())
    }

    pub fn viewer_service(&self) -> ViewerService {
        ViewerService::new(self.store.clone())
    }
}
