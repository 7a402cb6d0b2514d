//! Error types for the diff crate.

use confdiff_format::FormatError;
use confdiff_types::Path;

/// Errors that can occur during a comparison.
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    /// Rendering a tree for the annotated diff failed.
    #[error("format error: {0}")]
    Format(#[from] FormatError),

    /// The documents nest deeper than the configured limit.
    #[error("nesting depth limit of {limit} exceeded at `{path}`")]
    DepthLimitExceeded { path: Path, limit: usize },

    /// The walk visited more node pairs than the configured limit.
    #[error("node limit of {limit} exceeded")]
    NodeLimitExceeded { limit: usize },
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
