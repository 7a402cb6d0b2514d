//! Side-by-side rendering with per-line change markers.
//!
//! Both trees are serialized to canonical text and every line is matched
//! against the change list. Matching recognizes a change from its key and
//! its literal value on the line; no positions are carried over from
//! parsing. Structural facts a line cannot show on its own (YAML item
//! ordinals, XML parent elements and sibling ordinals) are gathered in one
//! pass per side before matching.
//!
//! XML sequence items are found either as `singularize(key)` children of a
//! `<key>` block or, for keys without a plural form, as repeated `<key>`
//! siblings, mirroring how the XML writer lays them out.

use std::collections::HashMap;

use confdiff_format::{format_data, item_tag, json, xml, yaml};
use confdiff_types::{Change, ChangeType, ConfigValue, Format, FormattedDiff, Marker};

use crate::error::DiffResult;

/// Render both trees and mark each line with the first change that claims it.
pub fn generate_formatted_diff(
    source: &ConfigValue,
    target: &ConfigValue,
    changes: &[Change],
    format: Format,
) -> DiffResult<FormattedDiff> {
    let source_text = format_data(source, format)?;
    let target_text = format_data(target, format)?;
    Ok(FormattedDiff {
        source: annotate(&source_text, changes, Side::Source, format),
        target: annotate(&target_text, changes, Side::Target, format),
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

impl Side {
    /// Marker this side shows for `change`, if the change appears here at all.
    fn marker(self, change: &Change) -> Option<Marker> {
        match (self, change.change_type) {
            (_, ChangeType::Modification) => Some(Marker::Modified),
            (Side::Source, ChangeType::Deletion) => Some(Marker::Deleted),
            (Side::Target, ChangeType::Addition) => Some(Marker::Added),
            _ => None,
        }
    }

    fn value(self, change: &Change) -> Option<&ConfigValue> {
        match self {
            Side::Source => change.old_value.as_ref(),
            Side::Target => change.new_value.as_ref(),
        }
    }
}

fn annotate(text: &str, changes: &[Change], side: Side, format: Format) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let probes: Vec<(Marker, Probe)> = changes
        .iter()
        .filter_map(|change| {
            let marker = side.marker(change)?;
            Some((marker, Probe::new(change, side.value(change), format)))
        })
        .collect();
    let facts = LineFacts::scan(&lines, format);

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let marker = probes
                .iter()
                .find(|(_, probe)| probe.matches(line, facts.get(i)))
                .map_or(Marker::Unchanged, |(marker, _)| *marker);
            marker.annotate(line)
        })
        .collect()
}

/// What the matcher knows about one change on one side.
struct Probe<'a> {
    format: Format,
    key: Option<&'a str>,
    index: Option<usize>,
    parent_key: Option<&'a str>,
    /// The value's literal as the renderer writes it; `None` for composites.
    literal: Option<String>,
    is_null: bool,
    is_composite: bool,
    /// A non-empty XML sequence written as repeated `<key>` siblings; the
    /// first sibling stands for the whole value.
    sibling_run: bool,
}

impl<'a> Probe<'a> {
    fn new(change: &'a Change, value: Option<&ConfigValue>, format: Format) -> Self {
        let literal = value.and_then(|v| match format {
            Format::Json => json::scalar_literal(v),
            Format::Xml => xml::scalar_literal(v),
            Format::Yaml => yaml::scalar_literal(v),
        });
        Self {
            format,
            key: change.key(),
            index: if change.is_array_item { change.index() } else { None },
            parent_key: change.parent_key.as_deref(),
            literal,
            is_null: matches!(value, Some(ConfigValue::Null)),
            is_composite: value.is_some_and(ConfigValue::is_composite),
            sibling_run: format == Format::Xml
                && change.key().is_some_and(|key| item_tag(key).is_none())
                && value
                    .and_then(ConfigValue::as_sequence)
                    .is_some_and(|items| !items.is_empty()),
        }
    }

    fn matches(&self, line: &str, fact: Option<&LineFact>) -> bool {
        if let Some(index) = self.index {
            return self.matches_item(line, index, fact);
        }
        match self.key {
            Some(key) => self.matches_key(line, key, fact),
            None => self.matches_root(line),
        }
    }

    /// A whole-document change: scalar roots by containment, composite roots
    /// claim every line.
    fn matches_root(&self, line: &str) -> bool {
        match &self.literal {
            Some(literal) => line.contains(literal.as_str()),
            None => !line.trim().is_empty(),
        }
    }

    fn matches_key(&self, line: &str, key: &str, fact: Option<&LineFact>) -> bool {
        match self.format {
            Format::Json => {
                let head = format!("{}:", json::key_literal(key));
                let Some(rest) = line.trim_start().strip_prefix(head.as_str()) else {
                    return false;
                };
                self.rest_fits(rest.trim().trim_end_matches(','))
            }
            Format::Yaml => {
                let head = format!("{}:", yaml::key_literal(key));
                let Some(rest) = strip_dashes(line.trim_start()).strip_prefix(head.as_str()) else {
                    return false;
                };
                self.rest_fits(rest.trim())
            }
            Format::Xml => match fact {
                Some(LineFact::Element(element)) => {
                    element.tag == key
                        && (self.element_fits(element) || (self.sibling_run && element.ordinal == 0))
                }
                _ => false,
            },
        }
    }

    fn matches_item(&self, line: &str, index: usize, fact: Option<&LineFact>) -> bool {
        match self.format {
            Format::Json => self
                .literal
                .as_deref()
                .is_some_and(|literal| line.contains(literal)),
            Format::Yaml => match fact {
                Some(LineFact::Item { ordinal }) => {
                    *ordinal == index
                        && self
                            .literal
                            .as_deref()
                            .map_or(true, |literal| line.contains(literal))
                }
                _ => false,
            },
            Format::Xml => match fact {
                Some(LineFact::Element(element)) => {
                    let placed = match self.parent_key {
                        Some(key) => match item_tag(key) {
                            Some(tag) => element.tag == tag && element.parent.as_deref() == Some(key),
                            None => element.tag == key,
                        },
                        None => {
                            element.tag == xml::ROOT_TAG
                                && element.parent.as_deref() == Some(xml::ROOT_TAG)
                        }
                    };
                    placed && element.ordinal == index && self.element_fits(element)
                }
                _ => false,
            },
        }
    }

    /// Text after `key:` on a JSON or YAML line.
    fn rest_fits(&self, rest: &str) -> bool {
        match &self.literal {
            Some(literal) => rest == literal,
            None => !self.is_composite || rest.is_empty() || rest.starts_with(['{', '[']),
        }
    }

    fn element_fits(&self, element: &XmlElement) -> bool {
        match (&self.literal, &element.content) {
            (Some(literal), XmlContent::Text(text)) => text == literal,
            (Some(_), _) => false,
            (None, XmlContent::Empty) => self.is_null || self.is_composite,
            (None, XmlContent::Open) => self.is_composite,
            (None, XmlContent::Text(_)) => false,
        }
    }
}

fn strip_dashes(mut text: &str) -> &str {
    while let Some(rest) = text.strip_prefix("- ") {
        text = rest.trim_start();
    }
    text
}

/// Structural facts about one rendered line.
#[derive(Debug, PartialEq)]
enum LineFact {
    /// A YAML `- ` line and its position among all such lines in the document.
    Item { ordinal: usize },
    /// An XML line that starts an element.
    Element(XmlElement),
    Other,
}

#[derive(Debug, PartialEq)]
struct XmlElement {
    tag: String,
    parent: Option<String>,
    /// Count of earlier siblings with the same tag under the same parent.
    ordinal: usize,
    content: XmlContent,
}

#[derive(Debug, PartialEq)]
enum XmlContent {
    /// `<tag>text</tag>`
    Text(String),
    /// `<tag/>`
    Empty,
    /// `<tag>` with children on the following lines.
    Open,
}

struct LineFacts;

impl LineFacts {
    fn scan(lines: &[&str], format: Format) -> Vec<LineFact> {
        match format {
            Format::Json => Vec::new(),
            Format::Yaml => scan_yaml(lines),
            Format::Xml => scan_xml(lines),
        }
    }
}

fn scan_yaml(lines: &[&str]) -> Vec<LineFact> {
    let mut ordinal = 0;
    lines
        .iter()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with("- ") || trimmed == "-" {
                let fact = LineFact::Item { ordinal };
                ordinal += 1;
                fact
            } else {
                LineFact::Other
            }
        })
        .collect()
}

struct OpenTag {
    tag: String,
    seen: HashMap<String, usize>,
}

fn scan_xml(lines: &[&str]) -> Vec<LineFact> {
    let mut stack: Vec<OpenTag> = Vec::new();
    let mut facts = Vec::with_capacity(lines.len());

    for line in lines {
        let trimmed = line.trim();
        let Some(body) = trimmed.strip_prefix('<') else {
            facts.push(LineFact::Other);
            continue;
        };

        if body.starts_with('/') {
            stack.pop();
            facts.push(LineFact::Other);
            continue;
        }

        let (tag, content) = if let Some(name) = body.strip_suffix("/>") {
            (name.trim_end(), XmlContent::Empty)
        } else if let Some((name, rest)) = body.split_once('>') {
            match rest.rsplit_once("</") {
                Some((text, _)) => (name, XmlContent::Text(text.to_string())),
                None => (name, XmlContent::Open),
            }
        } else {
            facts.push(LineFact::Other);
            continue;
        };

        let (parent, ordinal) = match stack.last_mut() {
            Some(open) => {
                let seen = open.seen.entry(tag.to_string()).or_insert(0);
                let ordinal = *seen;
                *seen += 1;
                (Some(open.tag.clone()), ordinal)
            }
            None => (None, 0),
        };

        if content == XmlContent::Open {
            stack.push(OpenTag {
                tag: tag.to_string(),
                seen: HashMap::new(),
            });
        }

        facts.push(LineFact::Element(XmlElement {
            tag: tag.to_string(),
            parent,
            ordinal,
            content,
        }));
    }

    facts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::Comparator;
    use serde_json::json;

    fn v(value: serde_json::Value) -> ConfigValue {
        serde_json::from_value(value).unwrap()
    }

    fn render(
        source: serde_json::Value,
        target: serde_json::Value,
        format: Format,
    ) -> FormattedDiff {
        let (source, target) = (v(source), v(target));
        let changes = Comparator::default().diff(&source, &target).unwrap();
        generate_formatted_diff(&source, &target, &changes, format).unwrap()
    }

    /// Marked lines as `(marker, trimmed text)`.
    fn marked(lines: &[String]) -> Vec<(char, String)> {
        lines
            .iter()
            .filter_map(|line| {
                let (marker, text) = Marker::split(line)?;
                (marker != Marker::Unchanged).then(|| (marker.as_char(), text.trim().to_string()))
            })
            .collect()
    }

    fn pairs(expected: &[(char, &str)]) -> Vec<(char, String)> {
        expected.iter().map(|(c, s)| (*c, s.to_string())).collect()
    }

    #[test]
    fn unchanged_documents_have_blank_markers() {
        let doc = json!({"a": 1, "b": [1, 2]});
        let out = render(doc.clone(), doc, Format::Json);
        assert_eq!(out.source.len(), out.target.len());
        assert!(out.source.iter().all(|l| l.starts_with(' ')));
        assert_eq!(out.source[0], "  {");
    }

    #[test]
    fn json_markers() {
        let out = render(
            json!({"a": 1, "b": {"c": "x"}, "tags": ["x", "y"]}),
            json!({"a": 2, "b": {"c": "x"}, "tags": ["x"], "d": true}),
            Format::Json,
        );
        assert_eq!(marked(&out.source), pairs(&[('~', "\"a\": 1,"), ('-', "\"y\"")]));
        assert_eq!(marked(&out.target), pairs(&[('~', "\"a\": 2,"), ('+', "\"d\": true")]));
        assert_eq!(out.source.len(), 10);
    }

    #[test]
    fn json_composite_addition_marks_only_its_key_line() {
        let out = render(json!({"a": 1}), json!({"a": 1, "d": {"e": 1}}), Format::Json);
        assert_eq!(marked(&out.target), pairs(&[('+', "\"d\": {")]));
        assert!(marked(&out.source).is_empty());
    }

    #[test]
    fn yaml_markers() {
        let out = render(
            json!({"name": "web", "ports": [80, 443], "db": {"host": "a"}}),
            json!({"name": "web", "ports": [80, 8443, 9000], "db": {"host": "b"}}),
            Format::Yaml,
        );
        assert_eq!(marked(&out.source), pairs(&[('~', "- 443"), ('~', "host: a")]));
        assert_eq!(
            marked(&out.target),
            pairs(&[('~', "- 8443"), ('+', "- 9000"), ('~', "host: b")])
        );
    }

    #[test]
    fn yaml_mapping_items() {
        let out = render(
            json!({"servers": [{"name": "a", "port": 1}, {"name": "b", "port": 2}]}),
            json!({"servers": [{"name": "a", "port": 5}]}),
            Format::Yaml,
        );
        assert_eq!(
            marked(&out.source),
            pairs(&[('~', "port: 1"), ('-', "- name: b")])
        );
        assert_eq!(marked(&out.target), pairs(&[('~', "port: 5")]));
    }

    #[test]
    fn yaml_container_line_is_never_marked() {
        let out = render(json!({"tags": ["x", "y"]}), json!({"tags": ["x"]}), Format::Yaml);
        assert_eq!(out.source[0], "  tags:");
        assert_eq!(marked(&out.source), pairs(&[('-', "- y")]));
    }

    #[test]
    fn xml_markers() {
        let out = render(
            json!({"server": {"host": "a", "port": 80}, "tags": ["x", "y"], "empty": null}),
            json!({"server": {"host": "b", "port": 80}, "tags": ["x"]}),
            Format::Xml,
        );
        assert_eq!(
            marked(&out.source),
            pairs(&[('~', "<host>a</host>"), ('-', "<tag>y</tag>"), ('-', "<empty/>")])
        );
        assert_eq!(marked(&out.target), pairs(&[('~', "<host>b</host>")]));
    }

    #[test]
    fn xml_items_are_told_apart_by_position() {
        let out = render(json!({"tags": ["x", "x"]}), json!({"tags": ["x"]}), Format::Xml);
        let source_markers: Vec<char> = out.source.iter().map(|l| l.chars().next().unwrap()).collect();
        assert_eq!(source_markers, vec![' ', ' ', ' ', '-', ' ', ' ']);
    }

    #[test]
    fn xml_sibling_items_from_parsed_documents() {
        let source = confdiff_format::parse(
            "<c><servers><server>a</server><server>b</server></servers></c>",
            Format::Xml,
        )
        .unwrap();
        let target = confdiff_format::parse(
            "<c><servers><server>a</server><server>c</server></servers></c>",
            Format::Xml,
        )
        .unwrap();
        let changes = Comparator::default().diff(&source, &target).unwrap();
        assert_eq!(changes[0].path.to_string(), "servers.server[1]");

        let out = generate_formatted_diff(&source, &target, &changes, Format::Xml).unwrap();
        assert_eq!(marked(&out.source), pairs(&[('~', "<server>b</server>")]));
        assert_eq!(marked(&out.target), pairs(&[('~', "<server>c</server>")]));
    }

    #[test]
    fn xml_multiline_text_stays_on_its_line() {
        let out = render(
            json!({"note": "line one\nline two", "tags": ["x", "y"]}),
            json!({"note": "line one\nline three", "tags": ["x"]}),
            Format::Xml,
        );
        assert_eq!(out.source.len(), 7);
        assert_eq!(
            marked(&out.source),
            pairs(&[('~', "<note>line one&#10;line two</note>"), ('-', "<tag>y</tag>")])
        );
        assert_eq!(
            marked(&out.target),
            pairs(&[('~', "<note>line one&#10;line three</note>")])
        );
    }

    #[test]
    fn xml_sequence_to_scalar_marks_first_sibling() {
        let out = render(
            json!({"tags": {"tag": ["a", "b"]}}),
            json!({"tags": {"tag": "a"}}),
            Format::Xml,
        );
        assert_eq!(marked(&out.source), pairs(&[('~', "<tag>a</tag>")]));
        assert_eq!(marked(&out.target), pairs(&[('~', "<tag>a</tag>")]));
    }

    #[test]
    fn root_sequence_items_in_xml() {
        let out = render(json!([1, 2]), json!([1, 3]), Format::Xml);
        assert_eq!(out.source[2], "~   <root>2</root>");
    }

    #[test]
    fn xml_line_facts() {
        let lines = ["<root>", "  <tags>", "    <tag>x</tag>", "    <tag/>", "  </tags>", "</root>"];
        let facts = scan_xml(&lines);
        assert_eq!(
            facts[3],
            LineFact::Element(XmlElement {
                tag: "tag".into(),
                parent: Some("tags".into()),
                ordinal: 1,
                content: XmlContent::Empty,
            })
        );
        assert_eq!(facts[4], LineFact::Other);
    }

    #[test]
    fn yaml_item_ordinals_count_across_the_document() {
        let facts = scan_yaml(&["a:", "  - 1", "b:", "  - 2", "  -"]);
        assert_eq!(
            facts,
            vec![
                LineFact::Other,
                LineFact::Item { ordinal: 0 },
                LineFact::Other,
                LineFact::Item { ordinal: 1 },
                LineFact::Item { ordinal: 2 },
            ]
        );
    }

    #[test]
    fn root_scalar_change() {
        let out = render(json!("old"), json!("new"), Format::Json);
        assert_eq!(marked(&out.source), pairs(&[('~', "\"old\"")]));
        assert_eq!(marked(&out.target), pairs(&[('~', "\"new\"")]));
    }
}
