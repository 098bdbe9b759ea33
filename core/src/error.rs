//! Errors surfaced at the client contract boundary.

use ember_common::error::CommonError;
use thiserror::Error;

/// Client-visible failure taxonomy.
///
/// Anything that goes wrong while evaluating user-supplied work (a fragment
/// handler, the map step, or the reduce step) is reported in the
/// `Evaluation` class so callers can match on one message family.
#[derive(Error, Debug)]
pub enum GridError {
    /// A fragment handler, mapper, or reducer failed to evaluate.
    #[error("Function evaluation failed: {0}")]
    Evaluation(String),

    /// Establishing or using the client session failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// A cache operation failed outside of fragment evaluation.
    #[error("Cache operation failed: {0}")]
    Cache(String),

    /// The topology does not support the requested operation.
    #[error("Topology error: {0}")]
    Topology(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

/// Result type alias for grid operations.
pub type GridResult<T> = std::result::Result<T, GridError>;

impl GridError {
    pub fn evaluation<S: Into<String>>(message: S) -> Self {
        Self::Evaluation(message.into())
    }

    pub fn connection<S: Into<String>>(message: S) -> Self {
        Self::Connection(message.into())
    }

    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache(message.into())
    }

    pub fn topology<S: Into<String>>(message: S) -> Self {
        Self::Topology(message.into())
    }

    /// True for failures of user-supplied work.
    pub fn is_evaluation(&self) -> bool {
        matches!(self, Self::Evaluation(_))
    }
}
