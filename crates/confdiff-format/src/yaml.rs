//! Indentation-driven YAML subset.
//!
//! Supports block mappings, block sequences (including sequences of
//! mappings and sequences written at their key's indent), `[]` and `{}`
//! empty collections, comments, and a leading `---`. Flow collections,
//! anchors, aliases, block scalars, and multiple documents are rejected or
//! read as plain strings.

use confdiff_types::{ConfigValue, Mapping};

use crate::error::{FormatError, FormatResult};
use crate::scalar::{infer_scalar, unquote};
use crate::MAX_NESTING;

/// A non-blank, non-comment source line.
struct Line<'a> {
    number: usize,
    indent: usize,
    text: &'a str,
}

enum Container {
    Mapping(Mapping),
    Sequence(Vec<ConfigValue>),
}

impl Container {
    fn into_value(self) -> ConfigValue {
        match self {
            Container::Mapping(m) => ConfigValue::Mapping(m),
            Container::Sequence(s) => ConfigValue::Sequence(s),
        }
    }
}

/// Where a finished frame is attached in its parent.
enum Slot {
    Root,
    Key(String),
    Item,
}

/// An open container and the indentation of its entries.
struct Frame {
    indent: usize,
    container: Container,
    slot: Slot,
}

impl Frame {
    /// Whether a line at `indent` falls outside this frame.
    fn closes_at(&self, indent: usize, is_item: bool) -> bool {
        match self.container {
            Container::Mapping(_) => indent < self.indent,
            Container::Sequence(_) => indent < self.indent || (indent == self.indent && !is_item),
        }
    }
}

/// Parse a YAML document.
///
/// An empty document yields an empty mapping; a document consisting of a
/// single bare scalar yields that scalar.
pub fn parse(content: &str) -> FormatResult<ConfigValue> {
    let lines = content_lines(content)?;
    let Some(first) = lines.first() else {
        return Ok(ConfigValue::mapping());
    };

    if lines.len() == 1 && !is_item(first.text) && split_entry(first.text).is_none() {
        return Ok(infer_scalar(first.text));
    }

    let root = if is_item(first.text) {
        Container::Sequence(Vec::new())
    } else {
        Container::Mapping(Mapping::new())
    };
    let mut stack = vec![Frame {
        indent: first.indent,
        container: root,
        slot: Slot::Root,
    }];

    for (i, line) in lines.iter().enumerate() {
        let item = is_item(line.text);
        while stack.len() > 1 && stack[stack.len() - 1].closes_at(line.indent, item) {
            pop_frame(&mut stack);
        }
        if line.indent < stack[0].indent {
            return Err(FormatError::yaml(line.number, "unexpected indentation"));
        }
        let next = lines.get(i + 1);
        process(&mut stack, line.number, line.indent, line.text, next)?;
    }

    while stack.len() > 1 {
        pop_frame(&mut stack);
    }
    Ok(stack
        .pop()
        .map(|frame| frame.container.into_value())
        .unwrap_or_else(ConfigValue::mapping))
}

/// Handle one line's content against the innermost frame. Inline nested
/// items (`- key: v`, `- - x`) push a frame and loop on the remainder.
fn process(
    stack: &mut Vec<Frame>,
    number: usize,
    mut indent: usize,
    mut text: &str,
    next: Option<&Line<'_>>,
) -> FormatResult<()> {
    loop {
        if stack.len() > MAX_NESTING {
            return Err(FormatError::NestingTooDeep { limit: MAX_NESTING });
        }
        let Some(frame) = stack.last_mut() else {
            return Err(FormatError::yaml(number, "no open container"));
        };

        match &mut frame.container {
            Container::Mapping(map) => {
                if is_item(text) {
                    return Err(FormatError::yaml(number, "sequence item inside a mapping"));
                }
                if indent > frame.indent {
                    return Err(FormatError::yaml(number, "unexpected indentation"));
                }
                let (key, value) = split_entry(text)
                    .ok_or_else(|| FormatError::yaml(number, format!("expected `key: value`, found `{text}`")))?;

                if value.is_empty() {
                    match block_child(indent, next, true) {
                        Some(container) => {
                            let child_indent = next.map_or(indent, |n| n.indent);
                            stack.push(Frame {
                                indent: child_indent,
                                container,
                                slot: Slot::Key(key),
                            });
                        }
                        None => {
                            map.insert(key, ConfigValue::Null);
                        }
                    }
                } else {
                    map.insert(key, inline_value(value));
                }
                return Ok(());
            }
            Container::Sequence(items) => {
                if !is_item(text) {
                    return Err(FormatError::yaml(number, "expected a `- ` sequence item"));
                }
                if indent > frame.indent {
                    return Err(FormatError::yaml(number, "unexpected indentation"));
                }
                let rest = text[1..].trim_start();
                let rest_indent = indent + (text.len() - rest.len());

                if rest.is_empty() {
                    match block_child(indent, next, false) {
                        Some(container) => {
                            let child_indent = next.map_or(indent, |n| n.indent);
                            stack.push(Frame {
                                indent: child_indent,
                                container,
                                slot: Slot::Item,
                            });
                        }
                        None => items.push(ConfigValue::Null),
                    }
                    return Ok(());
                }

                if is_item(rest) {
                    stack.push(Frame {
                        indent: rest_indent,
                        container: Container::Sequence(Vec::new()),
                        slot: Slot::Item,
                    });
                } else if split_entry(rest).is_some() {
                    stack.push(Frame {
                        indent: rest_indent,
                        container: Container::Mapping(Mapping::new()),
                        slot: Slot::Item,
                    });
                } else {
                    items.push(inline_value(rest));
                    return Ok(());
                }
                indent = rest_indent;
                text = rest;
            }
        }
    }
}

/// Decide what container, if any, the lines after an empty `key:` or `-`
/// open. A key may introduce items written at its own indent; a bare `-`
/// may not, since those items are its siblings.
fn block_child(indent: usize, next: Option<&Line<'_>>, same_indent_items: bool) -> Option<Container> {
    let next = next?;
    if is_item(next.text) && (next.indent > indent || (same_indent_items && next.indent == indent)) {
        Some(Container::Sequence(Vec::new()))
    } else if next.indent > indent {
        Some(Container::Mapping(Mapping::new()))
    } else {
        None
    }
}

fn pop_frame(stack: &mut Vec<Frame>) {
    let Some(frame) = stack.pop() else { return };
    let value = frame.container.into_value();
    let Some(parent) = stack.last_mut() else { return };
    match (frame.slot, &mut parent.container) {
        (Slot::Key(key), Container::Mapping(map)) => {
            map.insert(key, value);
        }
        (Slot::Item, Container::Sequence(items)) => items.push(value),
        _ => {}
    }
}

fn content_lines(content: &str) -> FormatResult<Vec<Line<'_>>> {
    let mut lines = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let number = idx + 1;
        let body = strip_comment(raw).trim_end();
        let text = body.trim_start_matches(' ');
        if text.is_empty() {
            continue;
        }
        if text.starts_with('\t') {
            return Err(FormatError::yaml(number, "tabs are not allowed for indentation"));
        }
        if text == "---" || text == "..." {
            if lines.is_empty() && text == "---" {
                continue;
            }
            return Err(FormatError::yaml(number, "multiple documents are not supported"));
        }
        lines.push(Line {
            number,
            indent: body.len() - text.len(),
            text,
        });
    }
    Ok(lines)
}

/// Remove a `#` comment that starts a line or follows whitespace outside
/// of quotes.
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_space = true;
    for (i, c) in line.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                '"' | '\'' if prev_space || line[..i].ends_with(": ") => quote = Some(c),
                '#' if prev_space => return &line[..i],
                _ => {}
            },
        }
        prev_space = c.is_whitespace();
    }
    line
}

fn is_item(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

/// Split `key: value` (or `key:`) into an unquoted key and trimmed value.
fn split_entry(text: &str) -> Option<(String, &str)> {
    let key_end = if text.starts_with('"') || text.starts_with('\'') {
        let quote = text.chars().next()?;
        let close = text[1..].find(quote)? + 1;
        if !text[close + 1..].starts_with(':') {
            return None;
        }
        close + 1
    } else {
        text.char_indices()
            .find(|&(i, c)| c == ':' && text[i + 1..].chars().next().map_or(true, char::is_whitespace))
            .map(|(i, _)| i)?
    };

    let raw_key = text[..key_end].trim();
    if raw_key.is_empty() {
        return None;
    }
    let key = unquote(raw_key).unwrap_or(raw_key).to_string();
    let value = text[key_end + 1..].trim();
    Some((key, value))
}

fn inline_value(value: &str) -> ConfigValue {
    match value {
        "[]" => ConfigValue::Sequence(Vec::new()),
        "{}" => ConfigValue::mapping(),
        _ => infer_scalar(value),
    }
}

/// Render a tree as block YAML with 2-space indentation.
pub fn render(value: &ConfigValue) -> FormatResult<String> {
    let mut lines = Vec::new();
    match value {
        ConfigValue::Mapping(map) if map.is_empty() => lines.push("{}".to_string()),
        ConfigValue::Sequence(items) if items.is_empty() => lines.push("[]".to_string()),
        ConfigValue::Mapping(map) => write_mapping(&mut lines, map, 0),
        ConfigValue::Sequence(items) => write_sequence(&mut lines, items, 0),
        scalar => lines.push(scalar_literal(scalar).unwrap_or_default()),
    }
    Ok(lines.join("\n"))
}

fn write_mapping(lines: &mut Vec<String>, map: &Mapping, indent: usize) {
    let pad = " ".repeat(indent);
    for (key, value) in map {
        let key = key_literal(key);
        match value {
            ConfigValue::Mapping(m) if m.is_empty() => lines.push(format!("{pad}{key}: {{}}")),
            ConfigValue::Sequence(s) if s.is_empty() => lines.push(format!("{pad}{key}: []")),
            ConfigValue::Mapping(m) => {
                lines.push(format!("{pad}{key}:"));
                write_mapping(lines, m, indent + 2);
            }
            ConfigValue::Sequence(s) => {
                lines.push(format!("{pad}{key}:"));
                write_sequence(lines, s, indent + 2);
            }
            scalar => lines.push(format!("{pad}{key}: {}", scalar_literal(scalar).unwrap_or_default())),
        }
    }
}

fn write_sequence(lines: &mut Vec<String>, items: &[ConfigValue], indent: usize) {
    let pad = " ".repeat(indent);
    for item in items {
        match item {
            ConfigValue::Mapping(m) if m.is_empty() => lines.push(format!("{pad}- {{}}")),
            ConfigValue::Sequence(s) if s.is_empty() => lines.push(format!("{pad}- []")),
            ConfigValue::Mapping(m) => {
                let start = lines.len();
                write_mapping(lines, m, indent + 2);
                dash_first(lines, start, indent);
            }
            ConfigValue::Sequence(s) => {
                let start = lines.len();
                write_sequence(lines, s, indent + 2);
                dash_first(lines, start, indent);
            }
            scalar => lines.push(format!("{pad}- {}", scalar_literal(scalar).unwrap_or_default())),
        }
    }
}

/// Replace the leading indentation of `lines[start]` with `- `.
fn dash_first(lines: &mut [String], start: usize, indent: usize) {
    if let Some(line) = lines.get_mut(start) {
        let body = line[indent + 2..].to_string();
        *line = format!("{}- {}", " ".repeat(indent), body);
    }
}

fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || s.trim() != s
        || infer_scalar(s) != ConfigValue::String(s.to_string())
        || is_item(s)
        || s.contains(": ")
        || s.ends_with(':')
        || s.contains(" #")
        || s.starts_with(['#', '[', '{', '&', '*', '!', '|', '>', '%', '@', '`'])
        || s == "[]"
        || s == "{}"
}

/// How a scalar appears in rendered output. `None` for composites.
pub fn scalar_literal(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::String(s) if needs_quotes(s) => Some(format!("\"{s}\"")),
        other => other.scalar_text(),
    }
}

/// How a mapping key appears in front of its `:`.
pub fn key_literal(key: &str) -> String {
    if key.is_empty() || key.contains(": ") || key.ends_with(':') || key.starts_with(['-', '#', '"', '\'']) {
        format!("\"{key}\"")
    } else {
        key.to_string()
    }
}
