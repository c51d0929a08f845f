//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Author and walk solution trees: question/solution decision graphs for troubleshooting
#[derive(Parser, Debug)]
#[command(name = "soltree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Document store file (default from config: ~/.soltree/store.json)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub store: Option<PathBuf>,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the content catalog (videos, PDFs, decision trees)
    Content {
        #[command(subcommand)]
        command: ContentCommands,
    },

    /// Inspect a solution tree
    Tree {
        #[command(subcommand)]
        command: TreeCommands,
    },

    /// Author the nodes of a tree
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Walk a tree interactively (fzf)
    Walk {
        /// Tree id
        tree_id: String,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ContentCommands {
    /// List catalog records, newest first
    List {
        /// Only records of this kind (video, pdf, tree)
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Create a record; a tree record gets an empty solution tree
    Add {
        /// Title
        title: String,
        /// Kind: video, pdf or tree
        #[arg(short, long)]
        kind: String,
        /// Category
        #[arg(short, long, default_value = "")]
        category: String,
        /// File url (required for video and pdf)
        #[arg(short, long, value_hint = ValueHint::Url)]
        url: Option<String>,
    },

    /// Change title, category or file url
    Edit {
        /// Content id
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        /// Kind (cannot switch to or from tree)
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_hint = ValueHint::Url)]
        url: Option<String>,
    },

    /// Delete a record (a tree record takes its nodes along)
    Rm {
        /// Content id
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// Render the tree from its root
    Show {
        /// Tree id
        tree_id: String,
    },

    /// List all nodes (root marked with *)
    Nodes {
        /// Tree id
        tree_id: String,
    },

    /// Report dangling options, unreachable nodes and root problems
    Check {
        /// Tree id
        tree_id: String,
    },

    /// Set the entry node
    Root {
        /// Tree id
        tree_id: String,
        /// Node id
        node_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Create a node (text from --text or $EDITOR)
    Add {
        /// Tree id
        tree_id: String,
        /// Node text
        #[arg(short, long)]
        text: Option<String>,
        /// question or solution
        #[arg(short, long, default_value = "question")]
        kind: String,
        /// Option as "label" or "label=>node-id" (repeatable)
        #[arg(short, long = "option")]
        options: Vec<String>,
        /// Make the new node the tree's root
        #[arg(long)]
        root: bool,
    },

    /// Change an existing node
    Edit {
        /// Tree id
        tree_id: String,
        /// Node id
        node_id: String,
        /// New text
        #[arg(short, long, conflicts_with = "editor")]
        text: Option<String>,
        /// Edit the current text in $EDITOR
        #[arg(short, long)]
        editor: bool,
        /// question or solution
        #[arg(short, long)]
        kind: Option<String>,
        /// Replace all options ("label" or "label=>node-id", repeatable)
        #[arg(short, long = "option")]
        options: Vec<String>,
        /// Point option N (1-based) at a node: "N=>node-id", empty id unlinks
        #[arg(long)]
        relink: Vec<String>,
        /// Remove option N (1-based, repeatable)
        #[arg(long)]
        remove_option: Vec<usize>,
        /// Drop all options
        #[arg(long, conflicts_with = "options")]
        clear_options: bool,
    },

    /// Delete a node; options pointing at it become dangling
    Rm {
        /// Tree id
        tree_id: String,
        /// Node id
        node_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Show config paths
    Path,

    /// Print a config template
    Template,
}
