//! Content catalog: videos, PDFs and the decision trees they own.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::documents::{
    self, ContentFields, CONTENT, CONTENT_TREE_FIELD, NODES, NODE_TREE_FIELD, TREES,
};
use crate::application::{ApplicationResult, StoreResultExt};
use crate::domain::{Content, ContentDraft, ContentId, ContentKind, DomainError, TreeId};
use crate::infrastructure::traits::{DocumentStore, Fields, WriteBatch};

pub struct ContentService {
    store: Arc<dyn DocumentStore>,
}

impl ContentService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All records, newest first.
    pub fn list(&self) -> ApplicationResult<Vec<Content>> {
        let docs = self
            .store
            .list(CONTENT)
            .with_store_context(|| "list content".to_string())?;
        let mut items = docs
            .iter()
            .map(documents::content_from_document)
            .collect::<ApplicationResult<Vec<_>>>()?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.title.cmp(&b.title)));
        Ok(items)
    }

    pub fn get(&self, id: &ContentId) -> ApplicationResult<Content> {
        let doc = self
            .store
            .get(CONTENT, id.as_str())
            .with_store_context(|| format!("load content {id}"))?
            .ok_or_else(|| DomainError::ContentNotFound(id.clone()))?;
        documents::content_from_document(&doc)
    }

    /// Record owning `tree_id`, if any.
    pub fn find_by_tree(&self, tree_id: &TreeId) -> ApplicationResult<Option<Content>> {
        let docs = self
            .store
            .query_eq(
                CONTENT,
                CONTENT_TREE_FIELD,
                &Value::String(tree_id.to_string()),
            )
            .with_store_context(|| format!("find content of tree {tree_id}"))?;
        docs.first().map(documents::content_from_document).transpose()
    }

    /// Validate and create a record.
    ///
    /// A decision tree gets its `solutionTrees` record in the same batch, so
    /// either both documents exist afterwards or neither does.
    #[instrument(level = "debug", skip(self, draft), fields(title = %draft.title))]
    pub fn create(&self, draft: &ContentDraft) -> ApplicationResult<Content> {
        let kind = draft.validate()?;
        let created_at = Utc::now();
        let id = ContentId::new(self.store.new_id());
        let title = draft.title.trim();
        let category = draft.category.trim();
        let file_url = file_url_for(kind, draft);

        let mut batch = WriteBatch::new();
        let tree_id = if kind == ContentKind::DecisionTree {
            let tree_id = TreeId::new(self.store.new_id());
            batch = batch.set(
                TREES,
                tree_id.as_str(),
                documents::new_tree_fields(title, created_at)?,
            );
            Some(tree_id)
        } else {
            None
        };

        let fields = documents::content_fields(ContentFields {
            title,
            kind,
            category,
            created_at,
            file_url: file_url.as_deref(),
            tree_id: tree_id.as_ref(),
        })?;
        batch = batch.set(CONTENT, id.as_str(), fields);

        self.store
            .commit(batch)
            .with_store_context(|| format!("create content '{title}'"))?;
        debug!("create: id={} kind={} tree={:?}", id, kind, tree_id);

        Ok(Content {
            id,
            title: title.to_string(),
            kind,
            category: category.to_string(),
            created_at,
            file_url,
            tree_id,
        })
    }

    /// Replace title, category and file url.
    ///
    /// Creation time and tree reference are kept. Switching to or from a
    /// decision tree is refused. A backing tree record follows the new title.
    pub fn update(&self, id: &ContentId, draft: &ContentDraft) -> ApplicationResult<Content> {
        let current = self.get(id)?;
        let kind = draft.validate()?;
        let is_tree = |k: ContentKind| k == ContentKind::DecisionTree;
        if is_tree(kind) != is_tree(current.kind) {
            return Err(DomainError::KindChangeNotAllowed {
                from: current.kind,
                to: kind,
            }
            .into());
        }

        let title = draft.title.trim();
        let category = draft.category.trim();
        let file_url = file_url_for(kind, draft);
        let fields = documents::content_fields(ContentFields {
            title,
            kind,
            category,
            created_at: current.created_at,
            file_url: file_url.as_deref(),
            tree_id: current.tree_id.as_ref(),
        })?;

        let mut batch = WriteBatch::new().set(CONTENT, id.as_str(), fields);
        if let Some(tree_id) = &current.tree_id {
            let exists = self
                .store
                .get(TREES, tree_id.as_str())
                .with_store_context(|| format!("load tree {tree_id}"))?
                .is_some();
            if exists {
                batch = batch.update(TREES, tree_id.as_str(), title_fields(title));
            }
        }
        self.store
            .commit(batch)
            .with_store_context(|| format!("update content {id}"))?;
        debug!("update: id={}", id);

        Ok(Content {
            title: title.to_string(),
            kind,
            category: category.to_string(),
            file_url,
            ..current
        })
    }

    /// Delete a record; a decision tree takes its tree record and nodes along.
    pub fn delete(&self, id: &ContentId) -> ApplicationResult<Content> {
        let current = self.get(id)?;
        let mut batch = WriteBatch::new();
        if let Some(tree_id) = &current.tree_id {
            let nodes = self
                .store
                .query_eq(NODES, NODE_TREE_FIELD, &Value::String(tree_id.to_string()))
                .with_store_context(|| format!("load nodes of tree {tree_id}"))?;
            for node in &nodes {
                batch = batch.delete(NODES, &node.id);
            }
            batch = batch.delete(TREES, tree_id.as_str());
        }
        batch = batch.delete(CONTENT, id.as_str());
        debug!("delete: id={} writes={}", id, batch.len());
        self.store
            .commit(batch)
            .with_store_context(|| format!("delete content {id}"))?;
        Ok(current)
    }
}

fn file_url_for(kind: ContentKind, draft: &ContentDraft) -> Option<String> {
    if !kind.requires_file() {
        return None;
    }
    draft
        .file_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
}

fn title_fields(title: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert("title".to_string(), Value::String(title.to_string()));
    fields
}
