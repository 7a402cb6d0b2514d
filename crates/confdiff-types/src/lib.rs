//! Foundation types for confdiff.
//!
//! This crate provides the format-neutral data model shared by every other
//! confdiff crate: the parsed document tree, the paths that address into it,
//! and the change records a comparison produces.
//!
//! # Key Types
//!
//! - [`ConfigValue`] -- Tagged union for JSON, XML, and YAML documents
//! - [`Path`] / [`PathSegment`] -- Location inside a tree, rendered as `a.b[2].c`
//! - [`Format`] -- Supported document formats
//! - [`Change`] / [`ChangeType`] -- A single addition, deletion, or modification
//! - [`ComparisonResult`] -- Summary, change list, and annotated rendering

pub mod change;
pub mod error;
pub mod format;
pub mod path;
pub mod value;

pub use change::{Change, ChangeType, ComparisonResult, FormattedDiff, Marker, Summary};
pub use error::TypeError;
pub use format::Format;
pub use path::{Path, PathSegment};
pub use value::{ConfigValue, Mapping, Number};
