//! soltree: author and walk solution trees.
//!
//! A solution tree is a decision graph of question nodes, whose labeled
//! options lead to other nodes, and terminal solution nodes. Trees are owned
//! by records of a small content catalog and persisted in a document store.
//!
//! Layers:
//! - [`domain`]: entities, traversal and editing sessions, integrity report
//! - [`application`]: services over the [`infrastructure::traits::DocumentStore`] trait
//! - [`infrastructure`]: stores, selector, editor and the DI container
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
