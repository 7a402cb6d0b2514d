//! Error types for the format crate.

/// Errors raised while parsing or rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// The JSON grammar rejected the input.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The XML reader rejected the input.
    #[error("invalid XML: {0}")]
    Xml(String),

    /// The document contained no root element.
    #[error("invalid XML: document has no root element")]
    EmptyXml,

    /// The YAML reader could not make sense of a line.
    #[error("invalid YAML at line {line}: {message}")]
    Yaml { line: usize, message: String },

    /// The document nests containers deeper than the readers accept.
    #[error("document nests deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    /// A tree could not be rendered.
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl From<quick_xml::Error> for FormatError {
    fn from(e: quick_xml::Error) -> Self {
        FormatError::Xml(e.to_string())
    }
}

impl FormatError {
    pub(crate) fn yaml(line: usize, message: impl Into<String>) -> Self {
        FormatError::Yaml {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias for format results.
pub type FormatResult<T> = Result<T, FormatError>;
