//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;
use crate::infrastructure::traits::StoreError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        ApplicationError::Domain(e).into()
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => application_exit_code(app),
            },
        }
    }
}

fn application_exit_code(e: &ApplicationError) -> i32 {
    match e {
        ApplicationError::Domain(d) if d.is_validation() => crate::exitcode::DATAERR,
        ApplicationError::Domain(DomainError::Traversal(_)) => crate::exitcode::DATAERR,
        ApplicationError::Domain(_) => crate::exitcode::NOINPUT,
        ApplicationError::Config { .. } => crate::exitcode::CONFIG,
        ApplicationError::Selection { .. } => crate::exitcode::SOFTWARE,
        ApplicationError::OperationFailed { source, .. } => {
            match source.downcast_ref::<StoreError>() {
                Some(StoreError::Unavailable(_)) => crate::exitcode::UNAVAILABLE,
                Some(StoreError::Corrupt(_)) => crate::exitcode::DATAERR,
                _ => crate::exitcode::IOERR,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeId, TraversalError};

    #[test]
    fn given_validation_error_when_exit_code_then_dataerr() {
        let err: CliError = DomainError::EmptyText.into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_missing_node_when_exit_code_then_noinput() {
        let err: CliError = DomainError::NodeNotFound(NodeId::new("x")).into();
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_traversal_error_when_exit_code_then_dataerr() {
        let err: CliError = DomainError::from(TraversalError::NoRootConfigured).into();
        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_unavailable_store_when_exit_code_then_unavailable() {
        let err: CliError = ApplicationError::OperationFailed {
            context: "load".into(),
            source: Box::new(StoreError::Unavailable("offline".into())),
        }
        .into();
        assert_eq!(err.exit_code(), crate::exitcode::UNAVAILABLE);
    }
}
