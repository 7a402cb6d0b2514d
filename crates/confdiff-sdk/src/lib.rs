//! High-level SDK for confdiff.
//!
//! Provides one-call comparison of JSON, XML, and YAML documents or files,
//! plus report export. This is the main entry point for applications
//! embedding confdiff.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{
    compare_documents, compare_files, detect_file_format, read_document, ConfDiff, FileComparison,
};
pub use error::{SdkError, SdkResult};
pub use report::{ComparisonReport, ReportSettings};

// Re-export key types
pub use confdiff_diff::{CompareObserver, CompareOptions};
pub use confdiff_format::{detect_format, format_data, parse, validate_format};
pub use confdiff_types::{
    Change, ChangeType, ComparisonResult, ConfigValue, Format, FormattedDiff, Marker, Path,
    Summary,
};
