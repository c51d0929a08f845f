//! Document store implementations

mod database;
mod json_file;
mod memory;

pub use database::Database;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
