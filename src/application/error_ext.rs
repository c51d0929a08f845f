//! Error conversion helpers for I/O and store operations
//!
//! Provides extension traits for cleaner error handling with context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::infrastructure::traits::StoreResult;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// std::fs::read_to_string(&buffer)
    ///     .with_path_context("read editor buffer", &buffer)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}

/// Extension trait for converting `StoreResult` to `ApplicationResult` with context.
pub trait StoreResultExt<T> {
    /// Add a description of the attempted store operation.
    fn with_store_context(self, action: impl FnOnce() -> String) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn with_store_context(self, action: impl FnOnce() -> String) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: action(),
            source: Box::new(e),
        })
    }
}
