//! Command dispatch: maps parsed arguments onto application services.

use std::io;
use std::str::FromStr;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::debug;

use crate::application::services::{compose_text, WalkOutcome};
use crate::cli::args::{Cli, Commands, ConfigCommands, ContentCommands, NodeCommands, TreeCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::render::{render_node_list, render_tree};
use crate::domain::{
    ContentDraft, ContentId, ContentKind, DraftField, EditorSession, NodeId, NodeKind,
    OptionField, RootStatus, TreeId, TreeOption, TreeReport,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

const TEXT_HINT: &str = "Enter the node text above. Lines starting with '#' are ignored.";

/// Parse arguments into settings, wire services and run the command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let cwd = std::env::current_dir()
        .map_err(|e| InfraError::io("determine working directory", e))?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(store) = &cli.store {
        settings.override_store_path(store);
    }
    debug!("store: {}", settings.store_path.display());

    let container = ServiceContainer::new(settings);
    execute_with(command, &container)
}

/// Run a command against an already wired container.
pub fn execute_with(command: &Commands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        Commands::Content { command } => content_command(command, container),
        Commands::Tree { command } => tree_command(command, container),
        Commands::Node { command } => node_command(command, container),
        Commands::Walk { tree_id } => walk(&TreeId::new(tree_id.as_str()), container),
        Commands::Config { command } => config_command(command, container),
        Commands::Completion { .. } => Err(CliError::Usage(
            "completion is handled before services are created".into(),
        )),
    }
}

// ============================================================
// content
// ============================================================

fn content_command(command: &ContentCommands, container: &ServiceContainer) -> CliResult<()> {
    let service = container.content_service();
    match command {
        ContentCommands::List { kind } => {
            let kind = kind.as_deref().map(ContentKind::from_str).transpose()?;
            let items: Vec<_> = service
                .list()?
                .into_iter()
                .filter(|c| kind.map_or(true, |k| c.kind == k))
                .collect();
            if items.is_empty() {
                output::info("no content");
            }
            for c in items {
                let reference = match (&c.tree_id, &c.file_url) {
                    (Some(tree), _) => format!("tree={tree}"),
                    (None, Some(url)) => url.clone(),
                    (None, None) => String::new(),
                };
                output::info(&format!(
                    "{}  {:<5} {:<16} {}  {}",
                    c.id,
                    c.kind.to_string(),
                    c.category,
                    c.title,
                    reference
                ));
            }
            Ok(())
        }
        ContentCommands::Add {
            title,
            kind,
            category,
            url,
        } => {
            let draft = ContentDraft {
                title: title.clone(),
                kind: Some(ContentKind::from_str(kind)?),
                category: category.clone(),
                file_url: url.clone(),
            };
            let content = service.create(&draft)?;
            output::action("Created", &format!("{} {}", content.id, content.title));
            if let Some(tree_id) = &content.tree_id {
                output::detail(&format!("tree: {tree_id}"));
            }
            Ok(())
        }
        ContentCommands::Edit {
            id,
            title,
            kind,
            category,
            url,
        } => {
            let id = ContentId::new(id.as_str());
            let current = service.get(&id)?;
            let draft = ContentDraft {
                title: title.clone().unwrap_or(current.title),
                kind: Some(match kind {
                    Some(k) => ContentKind::from_str(k)?,
                    None => current.kind,
                }),
                category: category.clone().unwrap_or(current.category),
                file_url: url.clone().or(current.file_url),
            };
            let content = service.update(&id, &draft)?;
            output::action("Updated", &format!("{} {}", content.id, content.title));
            Ok(())
        }
        ContentCommands::Rm { id } => {
            let content = service.delete(&ContentId::new(id.as_str()))?;
            output::action("Deleted", &format!("{} {}", content.id, content.title));
            if let Some(tree_id) = &content.tree_id {
                output::detail(&format!("tree {tree_id} and its nodes removed"));
            }
            Ok(())
        }
    }
}

// ============================================================
// tree
// ============================================================

fn tree_command(command: &TreeCommands, container: &ServiceContainer) -> CliResult<()> {
    let service = container.editor_service();
    match command {
        TreeCommands::Show { tree_id } => {
            let tree_id = TreeId::new(tree_id.as_str());
            let session = service.open(&tree_id)?;
            let title = display_title(&service.tree_title(&tree_id)?, &tree_id);
            output::info(&render_tree(&title, session.root(), session.nodes()));
            Ok(())
        }
        TreeCommands::Nodes { tree_id } => {
            let session = service.open(&TreeId::new(tree_id.as_str()))?;
            for line in render_node_list(session.root(), session.nodes()) {
                output::info(&line);
            }
            Ok(())
        }
        TreeCommands::Check { tree_id } => {
            let session = service.open(&TreeId::new(tree_id.as_str()))?;
            print_report(&service.report(&session));
            Ok(())
        }
        TreeCommands::Root { tree_id, node_id } => {
            let mut session = service.open(&TreeId::new(tree_id.as_str()))?;
            let node_id = NodeId::new(node_id.as_str());
            if session.node(&node_id).is_none() {
                output::warning(&format!("node {node_id} is not part of tree {tree_id}"));
            }
            service.set_root(&mut session, &node_id)?;
            output::action("Root", &node_id);
            Ok(())
        }
    }
}

fn display_title(title: &str, tree_id: &TreeId) -> String {
    if title.is_empty() {
        tree_id.to_string()
    } else {
        title.to_string()
    }
}

fn print_report(report: &TreeReport) {
    match &report.root {
        RootStatus::Ok(id) => output::success(&format!("root: {id}")),
        RootStatus::Missing => output::failure("no root configured"),
        RootStatus::Dangling(id) => output::failure(&format!("root {id} does not exist")),
    }
    for d in &report.dangling {
        let target = d
            .target
            .as_ref()
            .map(|t| format!("missing node {t}"))
            .unwrap_or_else(|| "unlinked".to_string());
        output::failure(&format!(
            "{} option {} [{}] → {}",
            d.node_id,
            d.option_index + 1,
            d.label,
            target
        ));
    }
    for id in &report.unreachable {
        output::failure(&format!("{id} unreachable from root"));
    }
    for id in &report.empty_questions {
        output::failure(&format!("{id} is a question without options"));
    }
    if report.is_clean() {
        output::success("tree is consistent");
    }
}

// ============================================================
// node
// ============================================================

fn node_command(command: &NodeCommands, container: &ServiceContainer) -> CliResult<()> {
    let service = container.editor_service();
    match command {
        NodeCommands::Add {
            tree_id,
            text,
            kind,
            options,
            root,
        } => {
            let mut session = service.open(&TreeId::new(tree_id.as_str()))?;
            session.new_draft();
            session.set_field(DraftField::Kind, kind)?;
            let text = match text {
                Some(t) => t.clone(),
                None => compose_text(container.editor.as_ref(), "", TEXT_HINT)?,
            };
            session.set_field(DraftField::Text, &text)?;
            for spec in options {
                push_option(&mut session, spec)?;
            }

            let node = service.save(&mut session)?;
            output::action("Created", &format!("{} {}", node.id, node.text));
            if *root {
                service.set_root(&mut session, &node.id)?;
                output::action("Root", &node.id);
            }
            warn_dangling(&service.report(&session), &node.id);
            Ok(())
        }
        NodeCommands::Edit {
            tree_id,
            node_id,
            text,
            editor,
            kind,
            options,
            relink,
            remove_option,
            clear_options,
        } => {
            let mut session = service.open(&TreeId::new(tree_id.as_str()))?;
            let node_id = NodeId::new(node_id.as_str());
            session.select_for_edit(&node_id)?;

            if let Some(kind) = kind {
                session.set_field(DraftField::Kind, kind)?;
            }
            if let Some(text) = text {
                session.set_field(DraftField::Text, text)?;
            } else if *editor {
                let current = session.draft().text.clone();
                let text = compose_text(container.editor.as_ref(), &current, TEXT_HINT)?;
                session.set_field(DraftField::Text, &text)?;
            }

            for spec in relink {
                let (index, target) = parse_relink(spec)?;
                session.set_option(index, OptionField::Target, target)?;
            }
            let mut removals: Vec<usize> = remove_option.clone();
            removals.sort_unstable_by(|a, b| b.cmp(a));
            removals.dedup();
            for position in removals {
                session.remove_option(to_index(position)?)?;
            }
            if *clear_options || !options.is_empty() {
                session.clear_options();
            }
            for spec in options {
                push_option(&mut session, spec)?;
            }

            let node = service.save(&mut session)?;
            output::action("Updated", &format!("{} {}", node.id, node.text));
            warn_dangling(&service.report(&session), &node.id);
            Ok(())
        }
        NodeCommands::Rm { tree_id, node_id } => {
            let mut session = service.open(&TreeId::new(tree_id.as_str()))?;
            let node_id = NodeId::new(node_id.as_str());
            service.delete_node(&mut session, &node_id)?;
            output::action("Deleted", &node_id);

            let report = service.report(&session);
            if matches!(&report.root, RootStatus::Dangling(id) if *id == node_id) {
                output::warning("the deleted node was the tree's root");
            }
            let broken = report
                .dangling
                .iter()
                .filter(|d| d.target.as_ref() == Some(&node_id))
                .count();
            if broken > 0 {
                output::warning(&format!("{broken} option(s) now point to a missing node"));
            }
            Ok(())
        }
    }
}

/// Append an option parsed from "label" or "label=>target".
fn push_option(session: &mut EditorSession, spec: &str) -> CliResult<()> {
    let option = TreeOption::from_str(spec)?;
    let index = session.add_option();
    session.set_option(index, OptionField::Text, &option.text)?;
    let target = option
        .next_node_id
        .as_ref()
        .map(NodeId::as_str)
        .unwrap_or_default();
    session.set_option(index, OptionField::Target, target)?;
    Ok(())
}

/// "N=>node-id" with a 1-based N.
fn parse_relink(spec: &str) -> CliResult<(usize, &str)> {
    let (position, target) = spec
        .split_once("=>")
        .ok_or_else(|| CliError::InvalidArgs(format!("expected N=>node-id, got '{spec}'")))?;
    let position: usize = position
        .trim()
        .parse()
        .map_err(|_| CliError::InvalidArgs(format!("invalid option number in '{spec}'")))?;
    Ok((to_index(position)?, target.trim()))
}

fn to_index(position: usize) -> CliResult<usize> {
    position
        .checked_sub(1)
        .ok_or_else(|| CliError::InvalidArgs("option numbers start at 1".into()))
}

fn warn_dangling(report: &TreeReport, node_id: &NodeId) {
    for d in report.dangling.iter().filter(|d| &d.node_id == node_id) {
        let what = match &d.target {
            Some(t) => format!("points to missing node {t}"),
            None => "is not linked yet".to_string(),
        };
        output::warning(&format!("option {} [{}] {}", d.option_index + 1, d.label, what));
    }
}

// ============================================================
// walk
// ============================================================

fn walk(tree_id: &TreeId, container: &ServiceContainer) -> CliResult<()> {
    let viewer = container.viewer_service();
    let mut opened = viewer.open(tree_id)?;
    output::header(&display_title(&opened.title, tree_id));

    let walk_settings = &container.settings.walk;
    let outcome = viewer.walk(
        &mut opened.session,
        container.selector.as_ref(),
        &walk_settings.prompt,
        |node, path| {
            if walk_settings.show_path && path.len() > 1 {
                let steps: Vec<String> = path[..path.len() - 1]
                    .iter()
                    .map(|n| n.text.clone())
                    .collect();
                output::breadcrumb(&steps);
            }
            match node.kind {
                NodeKind::Question => output::question(&node.text),
                NodeKind::Solution => output::success(&node.text),
            }
        },
    )?;

    debug!("walk finished: {:?}", outcome);
    match outcome {
        WalkOutcome::Finished { .. } | WalkOutcome::Cancelled { .. } => Ok(()),
        WalkOutcome::NoRootConfigured => {
            output::warning("this tree has no root node configured");
            Ok(())
        }
        WalkOutcome::DeadEnd { at } => {
            output::warning(&format!("question {at} has no options"));
            Ok(())
        }
        WalkOutcome::Dangling { from, target } => {
            let target = target
                .map(|t| format!("missing node {t}"))
                .unwrap_or_else(|| "nothing".to_string());
            output::warning(&format!("an option of {from} leads to {target}"));
            Ok(())
        }
    }
}

// ============================================================
// config
// ============================================================

fn config_command(command: &ConfigCommands, container: &ServiceContainer) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Path => {
            let global = global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(unavailable)".to_string());
            output::info(&format!("global: {global}"));
            let cwd = std::env::current_dir()
                .map_err(|e| InfraError::io("determine working directory", e))?;
            output::info(&format!("local:  {}", local_config_path(&cwd).display()));
            output::info(&format!(
                "store:  {}",
                container.settings.store_path.display()
            ));
            Ok(())
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
            Ok(())
        }
    }
}
