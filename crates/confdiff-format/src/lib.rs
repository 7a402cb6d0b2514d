//! Document formats for confdiff.
//!
//! Reads JSON, XML, and YAML text into the shared [`ConfigValue`] tree and
//! renders trees back into canonical text for side-by-side display.
//!
//! # Key Functions
//!
//! - [`detect_format`] / [`validate_format`] -- Format guessing and light validation
//! - [`parse`] -- Text to tree for a declared format
//! - [`format_data`] -- Tree to canonical text (used for rendering, not round-tripping)
//! - [`infer_scalar`] -- Literal inference shared by the XML and YAML readers

pub mod detect;
pub mod error;
pub mod json;
pub mod scalar;
pub mod xml;
pub mod yaml;

use confdiff_types::{ConfigValue, Format};
use tracing::{debug, trace};

pub use detect::{detect_format, format_from_filename, validate_format};
pub use error::{FormatError, FormatResult};
pub use scalar::infer_scalar;
pub use xml::{item_tag, singularize};

/// Deepest container nesting the XML and YAML readers accept. JSON input is
/// bounded by serde_json's own recursion limit.
pub const MAX_NESTING: usize = 512;

/// Parse `content` as a document of the given format.
pub fn parse(content: &str, format: Format) -> FormatResult<ConfigValue> {
    trace!(%format, bytes = content.len(), "parsing document");
    let result = match format {
        Format::Json => json::parse(content),
        Format::Xml => xml::parse(content),
        Format::Yaml => yaml::parse(content),
    };
    if let Err(ref e) = result {
        debug!(%format, error = %e, "document rejected");
    }
    result
}

/// Render a tree as canonical text in the given format.
///
/// The output is stable for a given tree but does not reproduce the
/// original document byte for byte; XML attributes in particular are not
/// written back.
pub fn format_data(value: &ConfigValue, format: Format) -> FormatResult<String> {
    match format {
        Format::Json => json::render(value),
        Format::Xml => xml::render(value),
        Format::Yaml => yaml::render(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_value() -> impl Strategy<Value = ConfigValue> {
        let leaf = prop_oneof![
            Just(ConfigValue::Null),
            any::<bool>().prop_map(ConfigValue::Bool),
            any::<i64>().prop_map(ConfigValue::from),
            (-1.0e6f64..1.0e6).prop_map(ConfigValue::from),
            "[a-zA-Z0-9 _:#-]{0,12}".prop_map(ConfigValue::from),
        ];
        leaf.prop_recursive(4, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..5).prop_map(ConfigValue::Sequence),
                prop::collection::vec(("[a-z]{1,6}", inner), 0..5).prop_map(|entries| {
                    ConfigValue::Mapping(entries.into_iter().collect())
                }),
            ]
        })
    }

    #[test]
    fn dispatches_by_format() {
        let json = parse(r#"{"a": 1}"#, Format::Json).unwrap();
        let xml = parse("<r><a>1</a></r>", Format::Xml).unwrap();
        let yaml = parse("a: 1", Format::Yaml).unwrap();
        assert_eq!(json, xml);
        assert_eq!(json, yaml);
    }

    #[test]
    fn format_data_renders_each_format() {
        let v = parse(r#"{"a": 1}"#, Format::Json).unwrap();
        assert_eq!(format_data(&v, Format::Json).unwrap(), "{\n  \"a\": 1\n}");
        assert_eq!(format_data(&v, Format::Xml).unwrap(), "<root>\n  <a>1</a>\n</root>");
        assert_eq!(format_data(&v, Format::Yaml).unwrap(), "a: 1");
    }

    #[test]
    fn json_text_round_trip_keeps_floats_exact() {
        for text in [
            r#"{"a": 906459.0375735853}"#,
            r#"{"a": 906459.0000015926614566}"#,
            r#"{"a": [0.1, -2.5e-300, 1.7976931348623157e308]}"#,
        ] {
            let first = parse(text, Format::Json).unwrap();
            let rendered = format_data(&first, Format::Json).unwrap();
            assert_eq!(parse(&rendered, Format::Json).unwrap(), first, "{text}");
        }
    }

    proptest! {
        #[test]
        fn json_round_trip(value in arb_value()) {
            let text = format_data(&value, Format::Json).unwrap();
            let reparsed = parse(&text, Format::Json).unwrap();
            prop_assert_eq!(reparsed, value);
        }
    }
}
