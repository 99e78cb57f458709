//! Domain-level errors (no external dependencies)

use generational_arena::Index;
use thiserror::Error;

/// Structural violations raised by the tree arena.
///
/// Construction never catches or wraps these; they reach the caller as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node not found: {0:?}")]
    NodeNotFound(Index),

    #[error("cycle detected: {node:?} cannot be attached below {parent:?}")]
    CycleDetected { node: Index, parent: Index },

    #[error("duplicate child reference: {0:?}")]
    DuplicateChild(Index),
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
