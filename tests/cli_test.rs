//! Tests for argument parsing and command dispatch against an in-memory store

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::{CommandFactory, Parser};

use soltree::application::services::{ContentService, EditorService};
use soltree::cli::args::{Cli, Commands};
use soltree::cli::commands::execute_with;
use soltree::cli::CliError;
use soltree::config::Settings;
use soltree::domain::{NodeId, NodeKind, TreeId};
use soltree::exitcode;
use soltree::infrastructure::di::ServiceContainer;
use soltree::infrastructure::store::MemoryStore;
use soltree::infrastructure::traits::{DocumentStore, Editor, SelectionItem, Selector};
use soltree::util::testing;

struct CancelSelector;

impl Selector for CancelSelector {
    fn select_one(
        &self,
        _items: &[SelectionItem],
        _prompt: &str,
    ) -> Result<Option<SelectionItem>, String> {
        Ok(None)
    }
}

/// Mock editor that writes fixed text into the buffer
struct TypingEditor(&'static str);

impl Editor for TypingEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        std::fs::write(path, self.0)
    }
}

fn container(editor: TypingEditor) -> (ServiceContainer, Arc<dyn DocumentStore>) {
    let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
    let container = ServiceContainer::with_deps(
        Settings::default(),
        store.clone(),
        Arc::new(CancelSelector),
        Arc::new(editor),
    );
    (container, store)
}

fn run(container: &ServiceContainer, args: &[&str]) -> Result<(), CliError> {
    let mut argv = vec!["soltree"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).expect("valid arguments");
    let command: Commands = cli.command.expect("subcommand given");
    execute_with(&command, container)
}

fn new_tree(container: &ServiceContainer, store: &Arc<dyn DocumentStore>) -> TreeId {
    run(container, &["content", "add", "Filtro", "--kind", "tree"]).unwrap();
    ContentService::new(store.clone()).list().unwrap()[0]
        .tree_id
        .clone()
        .unwrap()
}

#[test]
fn verify_cli() {
    Cli::command().debug_assert();
}

#[test]
fn given_node_add_with_options_when_executed_then_node_persisted_and_root_set() {
    // Arrange
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("unused"));
    let tree_id = new_tree(&container, &store);

    // Act
    run(
        &container,
        &[
            "node", "add", tree_id.as_str(),
            "--text", "¿Enciende?",
            "-o", "Sí=>later",
            "-o", "No",
            "--root",
        ],
    )
    .unwrap();

    // Assert
    let session = EditorService::new(store).open(&tree_id).unwrap();
    assert_eq!(session.nodes().len(), 1);
    let node = &session.nodes()[0];
    assert_eq!(node.kind, NodeKind::Question);
    assert_eq!(node.options.len(), 2);
    assert_eq!(node.options[0].next_node_id, Some(NodeId::new("later")));
    assert_eq!(node.options[1].next_node_id, None);
    assert_eq!(session.root(), Some(&node.id));
}

#[test]
fn given_node_add_without_text_when_executed_then_text_from_editor() {
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("# hint\nReplace filter\n"));
    let tree_id = new_tree(&container, &store);

    run(
        &container,
        &["node", "add", tree_id.as_str(), "--kind", "solution"],
    )
    .unwrap();

    let session = EditorService::new(store).open(&tree_id).unwrap();
    assert_eq!(session.nodes()[0].text, "Replace filter");
    assert!(session.nodes()[0].is_solution());
}

#[test]
fn given_node_edit_with_relink_and_remove_when_executed_then_options_updated() {
    // Arrange
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("unused"));
    let tree_id = new_tree(&container, &store);
    run(
        &container,
        &["node", "add", tree_id.as_str(), "-t", "q", "-o", "a", "-o", "b", "-o", "c"],
    )
    .unwrap();
    let editor = EditorService::new(store.clone());
    let node_id = editor.open(&tree_id).unwrap().nodes()[0].id.clone();

    // Act
    run(
        &container,
        &[
            "node", "edit", tree_id.as_str(), node_id.as_str(),
            "--relink", "1=>target",
            "--remove-option", "2",
        ],
    )
    .unwrap();

    // Assert
    let session = editor.open(&tree_id).unwrap();
    let options = &session.nodes()[0].options;
    let labels: Vec<&str> = options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(labels, vec!["a", "c"]);
    assert_eq!(options[0].next_node_id, Some(NodeId::new("target")));
}

#[test]
fn given_empty_text_when_adding_node_then_dataerr_and_nothing_written() {
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("# only comments\n"));
    let tree_id = new_tree(&container, &store);

    let err = run(&container, &["node", "add", tree_id.as_str()]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::DATAERR);
    assert!(store.list("treeNodes").unwrap().is_empty());
}

#[test]
fn given_unknown_content_when_removing_then_noinput() {
    testing::init_test_setup();
    let (container, _store) = container(TypingEditor("unused"));

    let err = run(&container, &["content", "rm", "missing"]).unwrap_err();

    assert_eq!(err.exit_code(), exitcode::NOINPUT);
}

#[test]
fn given_bad_relink_spec_when_editing_then_usage_error() {
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("unused"));
    let tree_id = new_tree(&container, &store);
    run(&container, &["node", "add", tree_id.as_str(), "-t", "q", "-o", "a"]).unwrap();
    let node_id = EditorService::new(store).open(&tree_id).unwrap().nodes()[0]
        .id
        .clone();

    let err = run(
        &container,
        &["node", "edit", tree_id.as_str(), node_id.as_str(), "--relink", "0=>x"],
    )
    .unwrap_err();

    assert_eq!(err.exit_code(), exitcode::USAGE);
}

#[test]
fn given_tree_without_root_when_walking_then_ok() {
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("unused"));
    let tree_id = new_tree(&container, &store);

    run(&container, &["walk", tree_id.as_str()]).unwrap();
}

#[test]
fn given_tree_commands_when_executed_then_succeed() {
    testing::init_test_setup();
    let (container, store) = container(TypingEditor("unused"));
    let tree_id = new_tree(&container, &store);
    run(&container, &["node", "add", tree_id.as_str(), "-t", "q", "-o", "a=>ghost", "--root"])
        .unwrap();

    for sub in ["show", "nodes", "check"] {
        run(&container, &["tree", sub, tree_id.as_str()]).unwrap();
    }
}
