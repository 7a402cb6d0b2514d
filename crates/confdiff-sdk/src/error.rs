use confdiff_types::Format;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("format mismatch: source is {source_format}, target is {target_format}")]
    FormatMismatch {
        source_format: Format,
        target_format: Format,
    },

    #[error("parse error: {0}")]
    Format(#[from] confdiff_format::FormatError),

    #[error("comparison failed: {0}")]
    Diff(#[from] confdiff_diff::DiffError),

    #[error("report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
