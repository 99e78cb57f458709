//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Import { .. } => crate::exitcode::DATAERR,
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
                ApplicationError::Tree(_) | ApplicationError::Export { .. } => {
                    crate::exitcode::SOFTWARE
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeSpec, TreeArena, TreeError};

    #[test]
    fn maps_errors_to_sysexits() {
        let mut tree: TreeArena<(), u8> = TreeArena::new();
        let gone = tree.create(NodeSpec::new((), "gone", [])).unwrap();
        tree.remove(gone).unwrap();

        let tree_err = CliError::from(ApplicationError::from(TreeError::NodeNotFound(gone)));
        assert_eq!(tree_err.exit_code(), crate::exitcode::SOFTWARE);

        let import_err = CliError::from(ApplicationError::Import {
            message: "bad".into(),
        });
        assert_eq!(import_err.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(CliError::Usage("x".into()).exit_code(), crate::exitcode::USAGE);
    }
}
