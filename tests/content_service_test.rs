//! Tests for ContentService: catalog records and their backing trees

use std::sync::Arc;

use serde_json::json;

use soltree::application::services::{ContentService, EditorService};
use soltree::application::ApplicationError;
use soltree::domain::{ContentDraft, ContentId, ContentKind, DomainError, DraftField};
use soltree::infrastructure::store::MemoryStore;
use soltree::infrastructure::traits::{
    Document, DocumentStore, StoreError, StoreResult, WriteBatch,
};
use soltree::util::testing;

/// Store whose writes always fail; reads see an empty database
struct OfflineStore {
    inner: MemoryStore,
}

impl DocumentStore for OfflineStore {
    fn new_id(&self) -> String {
        self.inner.new_id()
    }

    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        self.inner.get(collection, id)
    }

    fn list(&self, collection: &str) -> StoreResult<Vec<Document>> {
        self.inner.list(collection)
    }

    fn commit(&self, _batch: WriteBatch) -> StoreResult<()> {
        Err(StoreError::Unavailable("offline".to_string()))
    }
}

fn tree_draft(title: &str) -> ContentDraft {
    ContentDraft {
        title: title.to_string(),
        kind: Some(ContentKind::DecisionTree),
        category: "mantenimiento".to_string(),
        file_url: None,
    }
}

fn video_draft(title: &str) -> ContentDraft {
    ContentDraft {
        title: title.to_string(),
        kind: Some(ContentKind::Video),
        category: "tutoriales".to_string(),
        file_url: Some("https://files.example/filtro.mp4".to_string()),
    }
}

#[test]
fn given_tree_draft_when_creating_then_content_and_tree_records_exist() {
    // Arrange
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store.clone());

    // Act
    let content = service.create(&tree_draft("Diagnóstico de filtro")).unwrap();

    // Assert
    let tree_id = content.tree_id.clone().expect("tree id assigned");
    let tree = store.get("solutionTrees", tree_id.as_str()).unwrap().unwrap();
    assert_eq!(tree.fields["title"], json!("Diagnóstico de filtro"));
    assert_eq!(tree.fields["rootNodeId"], json!(null));
    let stored = store.get("content", content.id.as_str()).unwrap().unwrap();
    assert_eq!(stored.fields["type"], json!("Árbol de Soluciones"));
    assert_eq!(stored.fields["treeId"], json!(tree_id.as_str()));
    assert_eq!(
        service.find_by_tree(&tree_id).unwrap().map(|c| c.id),
        Some(content.id)
    );
}

#[test]
fn given_failing_store_when_creating_tree_then_no_records_left() {
    // Arrange
    testing::init_test_setup();
    let store = Arc::new(OfflineStore {
        inner: MemoryStore::new(),
    });
    let service = ContentService::new(store.clone());

    // Act
    let result = service.create(&tree_draft("Diagnóstico"));

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::OperationFailed { .. })
    ));
    assert!(store.list("solutionTrees").unwrap().is_empty());
    assert!(store.list("content").unwrap().is_empty());
}

#[test]
fn given_video_without_url_when_creating_then_rejected() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store.clone());
    let draft = ContentDraft {
        file_url: None,
        ..video_draft("Cambio de filtro")
    };

    let result = service.create(&draft);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::MissingFileUrl(
            ContentKind::Video
        )))
    ));
    assert!(store.list("content").unwrap().is_empty());
}

#[test]
fn given_video_when_creating_then_no_tree_record() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store.clone());

    let content = service.create(&video_draft("Cambio de filtro")).unwrap();

    assert!(content.tree_id.is_none());
    assert_eq!(
        content.file_url.as_deref(),
        Some("https://files.example/filtro.mp4")
    );
    assert!(store.list("solutionTrees").unwrap().is_empty());
    assert_eq!(service.list().unwrap().len(), 1);
}

#[test]
fn given_tree_content_when_renaming_then_tree_title_follows() {
    // Arrange
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store.clone());
    let created = service.create(&tree_draft("Filtro")).unwrap();

    // Act
    let updated = service
        .update(&created.id, &tree_draft("Filtro de aire"))
        .unwrap();

    // Assert
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.tree_id, created.tree_id);
    let tree_id = created.tree_id.unwrap();
    let tree = store.get("solutionTrees", tree_id.as_str()).unwrap().unwrap();
    assert_eq!(tree.fields["title"], json!("Filtro de aire"));
}

#[test]
fn given_tree_content_when_changing_kind_to_video_then_rejected() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store);
    let created = service.create(&tree_draft("Filtro")).unwrap();

    let result = service.update(&created.id, &video_draft("Filtro"));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::KindChangeNotAllowed {
            from: ContentKind::DecisionTree,
            to: ContentKind::Video
        }))
    ));
}

#[test]
fn given_video_when_switching_to_pdf_then_allowed() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store);
    let created = service.create(&video_draft("Manual")).unwrap();

    let updated = service
        .update(
            &created.id,
            &ContentDraft {
                kind: Some(ContentKind::Pdf),
                ..video_draft("Manual")
            },
        )
        .unwrap();

    assert_eq!(updated.kind, ContentKind::Pdf);
}

#[test]
fn given_tree_with_nodes_when_deleting_content_then_everything_removed() {
    // Arrange
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store.clone());
    let created = service.create(&tree_draft("Filtro")).unwrap();
    let tree_id = created.tree_id.clone().unwrap();
    let editor = EditorService::new(store.clone());
    let mut session = editor.open(&tree_id).unwrap();
    session.set_field(DraftField::Text, "¿Enciende?").unwrap();
    editor.save(&mut session).unwrap();
    assert_eq!(store.list("treeNodes").unwrap().len(), 1);

    // Act
    service.delete(&created.id).unwrap();

    // Assert
    assert!(store.list("content").unwrap().is_empty());
    assert!(store.list("solutionTrees").unwrap().is_empty());
    assert!(store.list("treeNodes").unwrap().is_empty());
}

#[test]
fn given_unknown_id_when_getting_then_content_not_found() {
    testing::init_test_setup();
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let service = ContentService::new(store);

    let result = service.get(&ContentId::new("missing"));

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::ContentNotFound(_)))
    ));
}
