use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// One step into a document tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A sequence index.
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(k) => Some(k),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(_) => None,
            PathSegment::Index(i) => Some(*i),
        }
    }
}

/// Location of a node inside a document tree.
///
/// Rendered as dotted keys with bracketed indices: `servers[0].host`. Keys
/// that are empty or contain `.`, `[`, `]`, `"` or `\` are written quoted,
/// as in `["a.b"]`. The root is the empty path and renders as an empty string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// A new path with `key` appended.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// A new path with `index` appended.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// The final segment's index, if the path ends in a sequence index.
    pub fn terminal_index(&self) -> Option<usize> {
        self.last().and_then(PathSegment::as_index)
    }

    /// The nearest key segment, searching from the end.
    pub fn last_key(&self) -> Option<&str> {
        self.0.iter().rev().find_map(PathSegment::as_key)
    }

    /// Iterator over the key segments only.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(PathSegment::as_key)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if !is_plain_key(k) => write_quoted_key(f, k)?,
                PathSegment::Key(k) if i == 0 => write!(f, "{k}")?,
                PathSegment::Key(k) => write!(f, ".{k}")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// Keys that can be written bare between dots.
fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']', '"', '\\'])
}

/// `["key"]`, with `"` and `\` backslash-escaped.
fn write_quoted_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    f.write_str("[\"")?;
    for c in key.chars() {
        if matches!(c, '"' | '\\') {
            f.write_str("\\")?;
        }
        write!(f, "{c}")?;
    }
    f.write_str("\"]")
}

impl FromStr for Path {
    type Err = TypeError;

    /// Accepts the [`Display`](fmt::Display) form, including `["..."]`
    /// quoted keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TypeError::InvalidPath(s.to_string());
        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = s.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                }
                '[' => {
                    if !key.is_empty() {
                        segments.push(PathSegment::Key(std::mem::take(&mut key)));
                    }
                    if chars.next_if_eq(&'"').is_some() {
                        let mut quoted = String::new();
                        loop {
                            match chars.next() {
                                Some('"') => break,
                                Some('\\') => quoted.push(chars.next().ok_or_else(invalid)?),
                                Some(c) => quoted.push(c),
                                None => return Err(invalid()),
                            }
                        }
                        if chars.next() != Some(']') {
                            return Err(invalid());
                        }
                        segments.push(PathSegment::Key(quoted));
                        continue;
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) if d.is_ascii_digit() => digits.push(d),
                            _ => return Err(invalid()),
                        }
                    }
                    let index = digits.parse().map_err(|_| invalid())?;
                    segments.push(PathSegment::Index(index));
                }
                _ => key.push(c),
            }
        }
        if !key.is_empty() {
            segments.push(PathSegment::Key(key));
        }
        Ok(Self(segments))
    }
}

impl From<Vec<PathSegment>> for Path {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mixed_segments() {
        let p = Path::root().key("a").key("b").index(2).key("c");
        assert_eq!(p.to_string(), "a.b[2].c");
    }

    #[test]
    fn root_displays_empty() {
        assert_eq!(Path::root().to_string(), "");
        assert_eq!(Path::root().index(0).to_string(), "[0]");
    }

    #[test]
    fn parse_round_trip() {
        let p: Path = "servers[1].ports[0]".parse().unwrap();
        assert_eq!(
            p.segments(),
            &[
                PathSegment::Key("servers".into()),
                PathSegment::Index(1),
                PathSegment::Key("ports".into()),
                PathSegment::Index(0),
            ]
        );
        assert_eq!(p.to_string(), "servers[1].ports[0]");
    }

    #[test]
    fn awkward_keys_are_quoted_and_read_back() {
        let p = Path::root()
            .key("servers[x]")
            .key("a.b")
            .index(0)
            .key("")
            .key(r#"say "hi" \ bye"#)
            .key("plain");
        assert_eq!(
            p.to_string(),
            r#"["servers[x]"]["a.b"][0][""]["say \"hi\" \\ bye"].plain"#
        );
        assert_eq!(p.to_string().parse::<Path>().unwrap(), p);

        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(serde_json::from_str::<Path>(&json).unwrap(), p);
    }

    #[test]
    fn parse_rejects_unterminated_quoted_key() {
        assert!(r#"["a"#.parse::<Path>().is_err());
        assert!(r#"["a"x"#.parse::<Path>().is_err());
    }

    #[test]
    fn parse_rejects_bad_index() {
        assert!("a[x]".parse::<Path>().is_err());
        assert!("a[1".parse::<Path>().is_err());
    }

    #[test]
    fn last_key_skips_indices() {
        let p = Path::root().key("matrix").index(1).index(0);
        assert_eq!(p.last_key(), Some("matrix"));
        assert_eq!(p.terminal_index(), Some(0));
    }

    #[test]
    fn serializes_as_string() {
        let p = Path::root().key("tags").index(1);
        assert_eq!(serde_json::to_string(&p).unwrap(), r#""tags[1]""#);
    }
}
