//! Change records and the comparison result handed to presentation layers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::path::Path;
use crate::value::ConfigValue;

/// Kind of a single change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Addition,
    Deletion,
    Modification,
}

impl ChangeType {
    /// The line marker this change type renders as.
    pub fn marker(&self) -> Marker {
        match self {
            ChangeType::Addition => Marker::Added,
            ChangeType::Deletion => Marker::Deleted,
            ChangeType::Modification => Marker::Modified,
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeType::Addition => "addition",
            ChangeType::Deletion => "deletion",
            ChangeType::Modification => "modification",
        })
    }
}

/// One difference between two documents, addressed by path.
///
/// Additions carry only `new_value`, deletions only `old_value`, and
/// modifications both. Use the constructors to keep that shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub path: Path,
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<ConfigValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<ConfigValue>,
    /// Set when the path ends in a sequence index.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_array_item: bool,
    /// Key of the sequence that holds the item, for array items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
}

impl Change {
    fn new(
        path: Path,
        change_type: ChangeType,
        old_value: Option<ConfigValue>,
        new_value: Option<ConfigValue>,
    ) -> Self {
        let is_array_item = path.terminal_index().is_some();
        let parent_key = if is_array_item {
            path.last_key().map(str::to_string)
        } else {
            None
        };
        Self {
            path,
            change_type,
            old_value,
            new_value,
            is_array_item,
            parent_key,
        }
    }

    /// A value present only in the target document.
    pub fn addition(path: Path, new_value: ConfigValue) -> Self {
        Self::new(path, ChangeType::Addition, None, Some(new_value))
    }

    /// A value present only in the source document.
    pub fn deletion(path: Path, old_value: ConfigValue) -> Self {
        Self::new(path, ChangeType::Deletion, Some(old_value), None)
    }

    /// A value present in both documents with different content.
    pub fn modification(path: Path, old_value: ConfigValue, new_value: ConfigValue) -> Self {
        Self::new(path, ChangeType::Modification, Some(old_value), Some(new_value))
    }

    /// The mapping key this change is reported under: the last key segment,
    /// which for array items is the enclosing sequence's key.
    pub fn key(&self) -> Option<&str> {
        self.path.last_key()
    }

    /// The index of an array item change.
    pub fn index(&self) -> Option<usize> {
        self.path.terminal_index()
    }

    /// The same change seen from the other document's side.
    pub fn inverted(&self) -> Self {
        let change_type = match self.change_type {
            ChangeType::Addition => ChangeType::Deletion,
            ChangeType::Deletion => ChangeType::Addition,
            ChangeType::Modification => ChangeType::Modification,
        };
        Self {
            change_type,
            old_value: self.new_value.clone(),
            new_value: self.old_value.clone(),
            ..self.clone()
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.old_value, &self.new_value) {
            (Some(old), Some(new)) => write!(f, "~ {}: {} -> {}", self.path, old, new),
            (Some(old), None) => write!(f, "- {}: {}", self.path, old),
            (None, Some(new)) => write!(f, "+ {}: {}", self.path, new),
            (None, None) => write!(f, "{} {}", self.change_type.marker(), self.path),
        }
    }
}

/// Aggregate change counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub additions: usize,
    pub deletions: usize,
    pub modifications: usize,
}

impl Summary {
    /// Count `changes` by type.
    pub fn from_changes(changes: &[Change]) -> Self {
        changes.iter().fold(Self::default(), |mut acc, c| {
            match c.change_type {
                ChangeType::Addition => acc.additions += 1,
                ChangeType::Deletion => acc.deletions += 1,
                ChangeType::Modification => acc.modifications += 1,
            }
            acc
        })
    }

    pub fn total(&self) -> usize {
        self.additions + self.deletions + self.modifications
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// One-line human description, e.g. for a completion notice.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "No differences".to_string();
        }
        let plural = |n: usize, word: &str| {
            if n == 1 {
                format!("{n} {word}")
            } else {
                format!("{n} {word}s")
            }
        };
        format!(
            "{}: {}, {}, {}",
            plural(self.total(), "change"),
            plural(self.additions, "addition"),
            plural(self.deletions, "deletion"),
            plural(self.modifications, "modification"),
        )
    }
}

/// Single-character annotation on a rendered line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Added,
    Deleted,
    Modified,
    Unchanged,
}

impl Marker {
    pub fn as_char(&self) -> char {
        match self {
            Marker::Added => '+',
            Marker::Deleted => '-',
            Marker::Modified => '~',
            Marker::Unchanged => ' ',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Marker::Added),
            '-' => Some(Marker::Deleted),
            '~' => Some(Marker::Modified),
            ' ' => Some(Marker::Unchanged),
            _ => None,
        }
    }

    /// Prefix `line` with this marker and a separating space.
    pub fn annotate(&self, line: &str) -> String {
        format!("{} {}", self.as_char(), line)
    }

    /// Split an annotated line back into its marker and text.
    pub fn split(annotated: &str) -> Option<(Marker, &str)> {
        let mut chars = annotated.chars();
        let marker = Marker::from_char(chars.next()?)?;
        let rest = chars.as_str();
        Some((marker, rest.strip_prefix(' ').unwrap_or(rest)))
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Both documents rendered canonically, one annotated line per output line.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedDiff {
    pub source: Vec<String>,
    pub target: Vec<String>,
}

/// Everything a comparison produces.
///
/// The summary is derived from the change list at construction and cannot
/// be edited independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    summary: Summary,
    diff: Vec<Change>,
    formatted_diff: FormattedDiff,
}

impl ComparisonResult {
    pub fn new(diff: Vec<Change>, formatted_diff: FormattedDiff) -> Self {
        Self {
            summary: Summary::from_changes(&diff),
            diff,
            formatted_diff,
        }
    }

    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn diff(&self) -> &[Change] {
        &self.diff
    }

    pub fn formatted_diff(&self) -> &FormattedDiff {
        &self.formatted_diff
    }

    /// Returns `true` if the documents are equivalent.
    pub fn is_empty(&self) -> bool {
        self.diff.is_empty()
    }
}
