//! Hooks for watching a comparison without affecting its result.

use confdiff_types::Path;

/// Receives notifications from a running comparison.
///
/// All methods default to doing nothing.
pub trait CompareObserver: Send + Sync {
    /// A key was skipped because it matched the ignore list.
    fn key_ignored(&self, _path: &Path) {}
}

/// Observer that discards every notification.
pub struct NoopObserver;

impl CompareObserver for NoopObserver {}

/// Observer that forwards notifications to `tracing` at debug level.
pub struct TracingObserver;

impl CompareObserver for TracingObserver {
    fn key_ignored(&self, path: &Path) {
        tracing::debug!(%path, "ignoring key");
    }
}
