//! Format detection and lightweight validation.
//!
//! Detection is a heuristic: a known file extension wins, otherwise the
//! content shape decides, and anything unrecognised falls back to YAML. That
//! fallback covers empty input and prose too, so a YAML verdict says nothing
//! about validity.

use std::path::Path;

use confdiff_types::{ConfigValue, Format};

use crate::{json, xml};

/// Guess the format of `content`, preferring the extension of `filename`.
pub fn detect_format(content: &str, filename: Option<&str>) -> Format {
    if let Some(format) = filename.and_then(format_from_filename) {
        return format;
    }

    let trimmed = content.trim();
    let json_shaped = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if json_shaped && serde_json::from_str::<ConfigValue>(trimmed).is_ok() {
        return Format::Json;
    }

    if trimmed.starts_with('<') && trimmed.contains('>') {
        return Format::Xml;
    }

    Format::Yaml
}

/// Format implied by a file name's extension, if any.
pub fn format_from_filename(filename: &str) -> Option<Format> {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(Format::from_extension)
}

/// Check whether `content` is plausibly a document of `format`.
///
/// JSON and XML are fully parsed. YAML only requires some line to contain a
/// colon, so `true` is not a guarantee that [`crate::parse`] will succeed.
pub fn validate_format(content: &str, format: Format) -> bool {
    match format {
        Format::Json => json::parse(content).is_ok(),
        Format::Xml => xml::parse(content).is_ok(),
        Format::Yaml => content.lines().any(|line| line.contains(':')),
    }
}
