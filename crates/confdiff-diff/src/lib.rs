//! Diff engine for configuration trees.
//!
//! Walks two parsed documents in lockstep, producing a pre-ordered change
//! list, per-type counts, and a side-by-side rendering with a marker on
//! every line.
//!
//! # Key Types
//!
//! - [`Comparator`] / [`CompareOptions`] -- Structural walk with ignore keys and strict/lenient equality
//! - [`EqualityPolicy`] -- Scalar and deep equality under the chosen mode
//! - [`CompareObserver`] -- Notification hook for skipped keys
//! - [`generate_formatted_diff`] -- Line markers for the canonical rendering of each side

pub mod compare;
pub mod config;
pub mod equality;
pub mod error;
pub mod observer;
pub mod render;

pub use compare::{generate_summary, Comparator};
pub use config::CompareOptions;
pub use equality::EqualityPolicy;
pub use error::{DiffError, DiffResult};
pub use observer::{CompareObserver, NoopObserver, TracingObserver};
pub use render::generate_formatted_diff;
