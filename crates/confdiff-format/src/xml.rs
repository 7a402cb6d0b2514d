//! XML reading and canonical rendering.
//!
//! Elements map to mappings keyed by child tag. Repeated sibling tags
//! collapse into a sequence, attributes land under [`ATTRIBUTES_KEY`], and
//! leaf text goes through scalar inference. The returned tree is the content
//! of the root element; the root's own tag name is not kept.
//!
//! Rendering wraps the tree in a `<root>` element. A sequence under a
//! plural key `k` is written as a `<k>` block of `singularize(k)` items;
//! under any other key its items repeat as `<k>` siblings. Attributes are
//! not written back.

use confdiff_types::{ConfigValue, Mapping};
use quick_xml::escape::{escape, resolve_xml_entity};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{FormatError, FormatResult};
use crate::scalar::infer_scalar;
use crate::MAX_NESTING;

/// Reserved mapping key holding an element's attributes.
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Reserved mapping key holding the text of a leaf element with attributes.
pub const TEXT_KEY: &str = "#text";

/// Tag name used for the synthesized root element when rendering.
pub const ROOT_TAG: &str = "root";

/// An element whose end tag has not been seen yet.
struct OpenElement {
    name: String,
    attributes: Mapping,
    children: Vec<(String, ConfigValue)>,
    text: String,
}

impl OpenElement {
    fn from_start(start: &BytesStart<'_>) -> FormatResult<Self> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| FormatError::Xml(e.to_string()))?
            .to_string();

        let mut attributes = Mapping::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| FormatError::Xml(e.to_string()))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| FormatError::Xml(e.to_string()))?
                .to_string();
            let value = attr.unescape_value()?.into_owned();
            attributes.insert(key, ConfigValue::String(value));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn into_value(self) -> ConfigValue {
        let text = self.text.trim();

        if self.children.is_empty() {
            if self.attributes.is_empty() {
                return if text.is_empty() {
                    ConfigValue::mapping()
                } else {
                    infer_scalar(text)
                };
            }
            let mut map = Mapping::new();
            map.insert(ATTRIBUTES_KEY.to_string(), ConfigValue::Mapping(self.attributes));
            if !text.is_empty() {
                map.insert(TEXT_KEY.to_string(), infer_scalar(text));
            }
            return ConfigValue::Mapping(map);
        }

        let mut map = Mapping::new();
        if !self.attributes.is_empty() {
            map.insert(ATTRIBUTES_KEY.to_string(), ConfigValue::Mapping(self.attributes));
        }
        for (tag, value) in self.children {
            match map.get_mut(&tag) {
                Some(ConfigValue::Sequence(items)) => items.push(value),
                Some(existing) => {
                    let first = std::mem::take(existing);
                    *existing = ConfigValue::Sequence(vec![first, value]);
                }
                None => {
                    map.insert(tag, value);
                }
            }
        }
        ConfigValue::Mapping(map)
    }
}

/// Parse an XML document into the content of its root element.
pub fn parse(content: &str) -> FormatResult<ConfigValue> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().check_end_names = true;

    let mut stack: Vec<OpenElement> = Vec::new();
    let mut root: Option<ConfigValue> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(FormatError::Xml("multiple root elements".into()));
                }
                if stack.len() >= MAX_NESTING {
                    return Err(FormatError::NestingTooDeep { limit: MAX_NESTING });
                }
                stack.push(OpenElement::from_start(&start)?);
            }
            Event::Empty(start) => {
                let element = OpenElement::from_start(&start)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| FormatError::Xml("unexpected closing tag".into()))?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(text) => {
                let decoded = text.decode().map_err(|e| FormatError::Xml(e.to_string()))?;
                match stack.last_mut() {
                    Some(open) => open.text.push_str(&decoded),
                    None if decoded.trim().is_empty() => {}
                    None => return Err(FormatError::Xml("text outside of root element".into())),
                }
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(data.as_ref())
                    .map_err(|e| FormatError::Xml(e.to_string()))?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(text);
                }
            }
            Event::GeneralRef(reference) => {
                let raw = reference.decode().map_err(|e| FormatError::Xml(e.to_string()))?;
                let resolved = resolve_reference(&raw)?;
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(FormatError::Xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or(FormatError::EmptyXml)
}

fn close_element(
    element: OpenElement,
    stack: &mut [OpenElement],
    root: &mut Option<ConfigValue>,
) -> FormatResult<()> {
    match stack.last_mut() {
        Some(parent) => {
            let name = element.name.clone();
            parent.children.push((name, element.into_value()));
        }
        None if root.is_some() => {
            return Err(FormatError::Xml("multiple root elements".into()));
        }
        None => *root = Some(element.into_value()),
    }
    Ok(())
}

fn resolve_reference(raw: &str) -> FormatResult<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }
    let rest = raw
        .strip_prefix('#')
        .ok_or_else(|| FormatError::Xml(format!("unknown entity &{raw};")))?;
    let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => rest.parse::<u32>(),
    }
    .map_err(|_| FormatError::Xml(format!("invalid character reference &{raw};")))?;
    char::from_u32(code)
        .map(String::from)
        .ok_or_else(|| FormatError::Xml(format!("invalid character reference &{raw};")))
}

/// Tag used for the items of a sequence stored under `key`: the key with a
/// single trailing `s` removed.
pub fn singularize(key: &str) -> &str {
    match key.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem,
        _ => key,
    }
}

/// Tag for the items of a sequence stored under `key`, if the key has a
/// plural form. Sequences under any other key render as repeated `<key>`
/// siblings, which is how such sequences are read in the first place.
pub fn item_tag(key: &str) -> Option<&str> {
    let singular = singularize(key);
    (singular != key).then_some(singular)
}

/// Render a tree as indented XML under a `<root>` element.
pub fn render(value: &ConfigValue) -> FormatResult<String> {
    let mut lines = Vec::new();
    write_element(&mut lines, ROOT_TAG, value, 0);
    Ok(lines.join("\n"))
}

fn write_element(lines: &mut Vec<String>, name: &str, value: &ConfigValue, depth: usize) {
    let pad = "  ".repeat(depth);
    match value {
        ConfigValue::Mapping(map) => {
            let visible: Vec<(&String, &ConfigValue)> =
                map.iter().filter(|(k, _)| k.as_str() != ATTRIBUTES_KEY).collect();

            if let [(key, text)] = visible.as_slice() {
                if key.as_str() == TEXT_KEY && text.is_scalar() {
                    write_element(lines, name, text, depth);
                    return;
                }
            }

            let children: Vec<_> = visible
                .into_iter()
                .filter(|(k, _)| k.as_str() != TEXT_KEY)
                .collect();
            if children.is_empty() {
                lines.push(format!("{pad}<{name}/>"));
                return;
            }
            lines.push(format!("{pad}<{name}>"));
            for (key, child) in children {
                write_element(lines, key, child, depth + 1);
            }
            lines.push(format!("{pad}</{name}>"));
        }
        ConfigValue::Sequence(items) => {
            if items.is_empty() {
                lines.push(format!("{pad}<{name}/>"));
                return;
            }
            let wrapped = item_tag(name).or_else(|| (depth == 0).then_some(name));
            match wrapped {
                Some(tag) => {
                    lines.push(format!("{pad}<{name}>"));
                    for item in items {
                        write_element(lines, tag, item, depth + 1);
                    }
                    lines.push(format!("{pad}</{name}>"));
                }
                None => {
                    for item in items {
                        write_element(lines, name, item, depth);
                    }
                }
            }
        }
        ConfigValue::Null => lines.push(format!("{pad}<{name}/>")),
        scalar => {
            let text = scalar_literal(scalar).unwrap_or_default();
            lines.push(format!("{pad}<{name}>{text}</{name}>"));
        }
    }
}

/// Escaped element text of a scalar as rendered. `None` for composites and
/// null, which render without inline text.
///
/// Line breaks become character references so every element stays on one
/// output line.
pub fn scalar_literal(value: &ConfigValue) -> Option<String> {
    match value {
        ConfigValue::Null | ConfigValue::Mapping(_) | ConfigValue::Sequence(_) => None,
        scalar => scalar.scalar_text().map(|text| {
            escape(text.as_str())
                .replace('\n', "&#10;")
                .replace('\r', "&#13;")
        }),
    }
}
