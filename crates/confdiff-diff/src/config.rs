use serde::{Deserialize, Serialize};

/// Settings fixed for the lifetime of a [`Comparator`](crate::Comparator).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareOptions {
    /// Key names or dotted paths excluded from comparison.
    ///
    /// A bare name such as `timestamp` matches that key at any depth; a
    /// dotted entry such as `config.timestamp` matches only that location.
    pub ignore_keys: Vec<String>,
    /// When `true`, strings must match exactly. When `false`, strings are
    /// trimmed and lower-cased before comparison.
    pub strict: bool,
    /// Maximum nesting depth walked before the comparison is aborted.
    pub max_depth: usize,
    /// Maximum number of node pairs visited before the comparison is aborted.
    pub max_nodes: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_keys: Vec::new(),
            strict: true,
            max_depth: 512,
            max_nodes: 1_000_000,
        }
    }
}

impl CompareOptions {
    /// Options with case- and whitespace-insensitive string comparison.
    pub fn lenient() -> Self {
        Self {
            strict: false,
            ..Default::default()
        }
    }

    pub fn with_ignore_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }
}
