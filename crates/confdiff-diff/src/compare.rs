//! Structural comparison of two configuration trees.
//!
//! The walk pairs mapping entries by key and sequence items by position.
//! Sequences are never re-aligned by content, so an insertion in the middle
//! of a list reports every later item as modified plus one addition at the
//! tail.
//!
//! Traversal runs on an explicit work stack. Tasks for a container's
//! children are pushed in reverse so that changes come out in the same
//! pre-order a recursive walk would produce.

use std::collections::HashSet;
use std::sync::Arc;

use confdiff_types::{Change, ComparisonResult, ConfigValue, Format, Mapping, Path, Summary};
use tracing::debug;

use crate::config::CompareOptions;
use crate::equality::EqualityPolicy;
use crate::error::{DiffError, DiffResult};
use crate::observer::{CompareObserver, NoopObserver};
use crate::render::generate_formatted_diff;

/// Pending work on the traversal stack.
enum Task<'a> {
    /// Compare two values that are both present at `path`.
    Visit {
        source: &'a ConfigValue,
        target: &'a ConfigValue,
        path: Path,
        depth: usize,
    },
    /// Record a change already decided by the parent.
    Emit(Change),
}

/// Compares configuration trees under a fixed set of options.
///
/// A comparator holds no per-call state and can be reused for any number of
/// comparisons.
pub struct Comparator {
    options: CompareOptions,
    ignore: HashSet<String>,
    policy: EqualityPolicy,
    observer: Arc<dyn CompareObserver>,
}

impl Comparator {
    pub fn new(options: CompareOptions) -> Self {
        let ignore = options.ignore_keys.iter().cloned().collect();
        let policy = EqualityPolicy::from_strict(options.strict);
        Self {
            options,
            ignore,
            policy,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer for ignored keys.
    pub fn with_observer(mut self, observer: Arc<dyn CompareObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two trees and render both sides with change markers.
    pub fn compare(
        &self,
        source: &ConfigValue,
        target: &ConfigValue,
        format: Format,
    ) -> DiffResult<ComparisonResult> {
        let changes = self.diff(source, target)?;
        let formatted = generate_formatted_diff(source, target, &changes, format)?;
        let result = ComparisonResult::new(changes, formatted);
        let summary = result.summary();
        debug!(
            %format,
            additions = summary.additions,
            deletions = summary.deletions,
            modifications = summary.modifications,
            "comparison finished"
        );
        Ok(result)
    }

    /// Walk two trees and list their differences in pre-order.
    pub fn diff(&self, source: &ConfigValue, target: &ConfigValue) -> DiffResult<Vec<Change>> {
        let mut changes = Vec::new();
        let mut visited = 0usize;
        let mut stack = vec![Task::Visit {
            source,
            target,
            path: Path::root(),
            depth: 0,
        }];

        while let Some(task) = stack.pop() {
            let (source, target, path, depth) = match task {
                Task::Emit(change) => {
                    changes.push(change);
                    continue;
                }
                Task::Visit {
                    source,
                    target,
                    path,
                    depth,
                } => (source, target, path, depth),
            };

            visited += 1;
            if visited > self.options.max_nodes {
                return Err(DiffError::NodeLimitExceeded {
                    limit: self.options.max_nodes,
                });
            }

            let children = match (source, target) {
                (ConfigValue::Mapping(s), ConfigValue::Mapping(t)) => {
                    self.check_depth(&path, depth)?;
                    self.compare_mappings(s, t, &path, depth)
                }
                (ConfigValue::Sequence(s), ConfigValue::Sequence(t)) => {
                    self.check_depth(&path, depth)?;
                    compare_sequences(s, t, &path, depth)
                }
                _ => {
                    if !self.policy.scalars_equal(source, target) {
                        changes.push(Change::modification(path, source.clone(), target.clone()));
                    }
                    continue;
                }
            };
            stack.extend(children.into_iter().rev());
        }

        Ok(changes)
    }

    fn check_depth(&self, path: &Path, depth: usize) -> DiffResult<()> {
        if depth >= self.options.max_depth {
            return Err(DiffError::DepthLimitExceeded {
                path: path.clone(),
                limit: self.options.max_depth,
            });
        }
        Ok(())
    }

    fn compare_mappings<'a>(
        &self,
        source: &'a Mapping,
        target: &'a Mapping,
        path: &Path,
        depth: usize,
    ) -> Vec<Task<'a>> {
        let keys = source
            .keys()
            .chain(target.keys().filter(|k| !source.contains_key(k.as_str())));

        let mut tasks = Vec::new();
        for key in keys {
            if self.should_ignore_key(path, key) {
                self.observer.key_ignored(&path.key(key.as_str()));
                continue;
            }
            let child = path.key(key.as_str());
            match (source.get(key), target.get(key)) {
                (None, Some(new)) => tasks.push(Task::Emit(Change::addition(child, new.clone()))),
                (Some(old), None) => tasks.push(Task::Emit(Change::deletion(child, old.clone()))),
                (Some(old), Some(new)) => tasks.push(Task::Visit {
                    source: old,
                    target: new,
                    path: child,
                    depth: depth + 1,
                }),
                (None, None) => {}
            }
        }
        tasks
    }

    /// A key is skipped when its bare name, any key already on the path,
    /// or the joined `path.key` string appears in the ignore list.
    pub fn should_ignore_key(&self, path: &Path, key: &str) -> bool {
        if self.ignore.is_empty() {
            return false;
        }
        if self.ignore.contains(key) {
            return true;
        }
        if path.keys().any(|segment| self.ignore.contains(segment)) {
            return true;
        }
        self.ignore.contains(&path.key(key).to_string())
    }
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(CompareOptions::default())
    }
}

fn compare_sequences<'a>(
    source: &'a [ConfigValue],
    target: &'a [ConfigValue],
    path: &Path,
    depth: usize,
) -> Vec<Task<'a>> {
    let len = source.len().max(target.len());
    (0..len)
        .filter_map(|i| {
            let child = path.index(i);
            match (source.get(i), target.get(i)) {
                (Some(old), Some(new)) => Some(Task::Visit {
                    source: old,
                    target: new,
                    path: child,
                    depth: depth + 1,
                }),
                (Some(old), None) => Some(Task::Emit(Change::deletion(child, old.clone()))),
                (None, Some(new)) => Some(Task::Emit(Change::addition(child, new.clone()))),
                (None, None) => None,
            }
        })
        .collect()
}

/// Count changes by type.
pub fn generate_summary(changes: &[Change]) -> Summary {
    Summary::from_changes(changes)
}
