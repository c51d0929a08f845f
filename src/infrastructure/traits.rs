//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;

use serde_json::{Map, Value};
use thiserror::Error;

/// Field map of a stored document (the id is kept separately).
pub type Fields = Map<String, Value>;

/// A document fetched from a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Errors raised by a document store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("store data is corrupt: {0}")]
    Corrupt(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Single write inside a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or overwrite a document
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Replace the given fields of an existing document
    Update {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Remove a document (missing documents are ignored)
    Delete { collection: String, id: String },
}

/// Ordered writes applied all-or-nothing by [`DocumentStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, collection: &str, id: &str, fields: Fields) -> Self {
        self.ops.push(WriteOp::Set {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn update(mut self, collection: &str, id: &str, fields: Fields) -> Self {
        self.ops.push(WriteOp::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            fields,
        });
        self
    }

    pub fn delete(mut self, collection: &str, id: &str) -> Self {
        self.ops.push(WriteOp::Delete {
            collection: collection.to_string(),
            id: id.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }
}

/// Hosted document database abstraction.
///
/// Mirrors the subset of a document store the application needs:
/// field-equality queries, get by id, add with a generated id, partial
/// update, delete and atomic batches. Last write wins.
pub trait DocumentStore: Send + Sync {
    /// Generate a fresh document id without writing anything.
    fn new_id(&self) -> String;

    /// Fetch a document; `Ok(None)` when it does not exist.
    fn get(&self, collection: &str, id: &str) -> StoreResult<Option<Document>>;

    /// All documents of a collection.
    fn list(&self, collection: &str) -> StoreResult<Vec<Document>>;

    /// Documents whose `field` equals `value`.
    fn query_eq(&self, collection: &str, field: &str, value: &Value) -> StoreResult<Vec<Document>> {
        Ok(self
            .list(collection)?
            .into_iter()
            .filter(|d| d.fields.get(field) == Some(value))
            .collect())
    }

    /// Apply all writes, or none of them.
    fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Insert a document under a generated id.
    fn add(&self, collection: &str, fields: Fields) -> StoreResult<String> {
        let id = self.new_id();
        self.commit(WriteBatch::new().set(collection, &id, fields))?;
        Ok(id)
    }

    /// Create or overwrite a document under a known id.
    fn set(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        self.commit(WriteBatch::new().set(collection, id, fields))
    }

    /// Replace the given fields; errors when the document is missing.
    fn update(&self, collection: &str, id: &str, fields: Fields) -> StoreResult<()> {
        self.commit(WriteBatch::new().update(collection, id, fields))
    }

    fn delete(&self, collection: &str, id: &str) -> StoreResult<()> {
        self.commit(WriteBatch::new().delete(collection, id))
    }
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Rename/move a file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Item for FZF-style selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionItem {
    /// Display text shown in selector
    pub display: String,
    /// Actual value (e.g., option index)
    pub value: String,
}

/// Interactive FZF-style selector abstraction.
pub trait Selector: Send + Sync {
    /// Present items to user and return selected one.
    /// Returns None if user cancels (Esc/Ctrl-C).
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String>;
}

/// Editor abstraction for opening files.
pub trait Editor: Send + Sync {
    /// Open a file in the editor.
    /// Blocks until editor exits.
    fn open(&self, path: &Path) -> io::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Real selector implementation using skim (FZF-like).
#[derive(Debug, Default)]
pub struct SkimSelector;

/// Real editor implementation using a configured command, $VISUAL, $EDITOR, or vim.
#[derive(Debug, Default)]
pub struct EnvironmentEditor {
    command: Option<String>,
}

impl EnvironmentEditor {
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
        }
    }
}

impl Selector for SkimSelector {
    fn select_one(
        &self,
        items: &[SelectionItem],
        prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        use skim::prelude::*;
        use std::io::Cursor;

        if items.is_empty() {
            return Ok(None);
        }

        // Build input as newline-separated display strings
        let input = items
            .iter()
            .map(|i| i.display.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let options = SkimOptionsBuilder::default()
            .prompt(Some(prompt))
            .height(Some("50%"))
            .multi(false)
            .nosort(true)
            .build()
            .map_err(|e| format!("failed to build skim options: {e}"))?;

        let item_reader = SkimItemReader::default();
        let items_arc = item_reader.of_bufread(Cursor::new(input));

        let output = Skim::run_with(&options, Some(items_arc));

        match output {
            Some(out) if out.is_abort => Ok(None),
            Some(out) => {
                if let Some(selected) = out.selected_items.first() {
                    let display = selected.output().to_string();
                    let item = items.iter().find(|i| i.display == display).cloned();
                    Ok(item)
                } else {
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }
}

impl Editor for EnvironmentEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        use std::process::Command;

        // Determine editor: configured > $VISUAL > $EDITOR > vim
        let editor = self
            .command
            .clone()
            .filter(|c| !c.trim().is_empty())
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vim".to_string());

        let (program, args) = split_command(&editor).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "editor command is empty")
        })?;
        let status = Command::new(program).args(args).arg(path).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("editor exited with status: {}", status),
            ))
        }
    }
}

/// Split an editor setting such as `code --wait` into program and arguments.
fn split_command(command: &str) -> Option<(&str, Vec<&str>)> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    Some((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_editor_with_flags_when_splitting_then_program_and_args() {
        assert_eq!(
            split_command("code --wait"),
            Some(("code", vec!["--wait"]))
        );
        assert_eq!(split_command("  vim  "), Some(("vim", vec![])));
        assert_eq!(split_command("   "), None);
    }
}
