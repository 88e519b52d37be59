//! Error taxonomy for a single pack request.
//!
//! Every variant aborts the request; exactly one error is reported and no
//! partial result is returned.

use thiserror::Error;

use crate::solver::SolverError;

/// Errors that can occur while processing a pack request.
#[derive(Error, Debug)]
pub enum PackError {
    /// Malformed or out-of-range input, reported for the first offending field.
    #[error("{field}: {reason}")]
    InvalidRequest {
        /// Path of the offending field, e.g. `items[2].quantity`.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The solver failed while registering input or placing items.
    #[error("packing failed: {0}")]
    Solver(#[from] SolverError),

    /// Internal bookkeeping went wrong (e.g. the solver reported an unknown item).
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

impl PackError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        PackError::InvalidRequest {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wire code reported to HTTP callers.
    pub fn code(&self) -> &'static str {
        match self {
            PackError::InvalidRequest { .. } => "INVALID_REQUEST",
            PackError::Solver(_) | PackError::Invariant(_) => "PACKING_FAILED",
        }
    }

    /// Whether the caller is to blame (validation) rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PackError::InvalidRequest { .. })
    }
}
