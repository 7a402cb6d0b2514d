use std::fs;
use std::path::Path;
use std::sync::Arc;

use confdiff_diff::{Comparator, CompareOptions, TracingObserver};
use confdiff_format::{detect_format, parse};
use confdiff_types::{ComparisonResult, ConfigValue, Format};
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};

/// Outcome of comparing two files on disk.
#[derive(Clone, Debug)]
pub struct FileComparison {
    /// The format both files were read as.
    pub format: Format,
    pub result: ComparisonResult,
}

/// High-level comparison API.
///
/// Parses, compares, and renders in one call. Ignored keys are reported
/// through `tracing` at debug level.
pub struct ConfDiff {
    comparator: Comparator,
}

impl ConfDiff {
    pub fn new(options: CompareOptions) -> Self {
        let comparator = Comparator::new(options).with_observer(Arc::new(TracingObserver));
        Self { comparator }
    }

    pub fn options(&self) -> &CompareOptions {
        self.comparator.options()
    }

    /// Compare two documents given as text in a shared format.
    pub fn compare_documents(
        &self,
        source: &str,
        target: &str,
        format: Format,
    ) -> SdkResult<ComparisonResult> {
        let source = parse(source, format)?;
        let target = parse(target, format)?;
        self.compare_trees(&source, &target, format)
    }

    /// Compare two already-parsed trees, rendering them as `format`.
    pub fn compare_trees(
        &self,
        source: &ConfigValue,
        target: &ConfigValue,
        format: Format,
    ) -> SdkResult<ComparisonResult> {
        Ok(self.comparator.compare(source, target, format)?)
    }

    /// Read, detect, and compare two files.
    ///
    /// With `format` unset each file's format is detected on its own (by
    /// extension, then content), and differing verdicts are rejected.
    pub fn compare_files(
        &self,
        source_path: impl AsRef<Path>,
        target_path: impl AsRef<Path>,
        format: Option<Format>,
    ) -> SdkResult<FileComparison> {
        let source_path = source_path.as_ref();
        let target_path = target_path.as_ref();
        let source = read_document(source_path)?;
        let target = read_document(target_path)?;

        let format = match format {
            Some(format) => format,
            None => {
                let source_format = detect_file_format(&source, source_path);
                let target_format = detect_file_format(&target, target_path);
                if source_format != target_format {
                    return Err(SdkError::FormatMismatch {
                        source_format,
                        target_format,
                    });
                }
                source_format
            }
        };

        info!(
            source = %source_path.display(),
            target = %target_path.display(),
            %format,
            "comparing files"
        );
        let result = self.compare_documents(&source, &target, format)?;
        Ok(FileComparison { format, result })
    }
}

impl Default for ConfDiff {
    fn default() -> Self {
        Self::new(CompareOptions::default())
    }
}

/// Compare two documents given as text in a shared format.
pub fn compare_documents(
    source: &str,
    target: &str,
    format: Format,
    options: CompareOptions,
) -> SdkResult<ComparisonResult> {
    ConfDiff::new(options).compare_documents(source, target, format)
}

/// Read, detect, and compare two files.
pub fn compare_files(
    source_path: impl AsRef<Path>,
    target_path: impl AsRef<Path>,
    format: Option<Format>,
    options: CompareOptions,
) -> SdkResult<FileComparison> {
    ConfDiff::new(options).compare_files(source_path, target_path, format)
}

/// Read a document from disk as UTF-8 text.
pub fn read_document(path: &Path) -> SdkResult<String> {
    fs::read_to_string(path).map_err(|source| SdkError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Detect a file's format from its name and content.
pub fn detect_file_format(content: &str, path: &Path) -> Format {
    let name = path.file_name().and_then(|n| n.to_str());
    let format = detect_format(content, name);
    debug!(path = %path.display(), %format, "detected format");
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use confdiff_types::ChangeType;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn file(suffix: &str, content: &str) -> NamedTempFile {
        let mut f = Builder::new().suffix(suffix).tempfile().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn json_scenario() {
        let result = compare_documents(
            r#"{"database": {"host": "localhost", "port": 5432}}"#,
            r#"{"database": {"host": "prod", "port": 5432}}"#,
            Format::Json,
            CompareOptions::default(),
        )
        .unwrap();
        assert_eq!(result.diff().len(), 1);
        assert_eq!(result.diff()[0].path.to_string(), "database.host");
        assert_eq!(result.summary().modifications, 1);
        assert_eq!(result.formatted_diff().source[2], "~     \"host\": \"localhost\",");
    }

    #[test]
    fn yaml_documents() {
        let result = compare_documents(
            "name: web\ntags:\n  - a\n  - b\n",
            "name: web\ntags:\n  - a\n",
            Format::Yaml,
            CompareOptions::default(),
        )
        .unwrap();
        assert_eq!(result.diff().len(), 1);
        let change = &result.diff()[0];
        assert_eq!(change.change_type, ChangeType::Deletion);
        assert_eq!(change.path.to_string(), "tags[1]");
        assert_eq!(result.formatted_diff().source[3], "-   - b");
    }

    #[test]
    fn xml_documents() {
        let result = compare_documents(
            "<config><server port=\"80\">web</server><debug>false</debug></config>",
            "<config><server port=\"80\">web</server><debug>true</debug></config>",
            Format::Xml,
            CompareOptions::default(),
        )
        .unwrap();
        assert_eq!(result.diff().len(), 1);
        assert_eq!(result.diff()[0].path.to_string(), "debug");
    }

    #[test]
    fn identical_documents_in_every_format() {
        let docs = [
            (Format::Json, r#"{"a": [1, {"b": null}], "c": "x"}"#),
            (Format::Xml, "<r><a>1</a><a>2</a><c>x</c></r>"),
            (Format::Yaml, "a:\n  - 1\n  - b: ~\nc: x\n"),
        ];
        for (format, doc) in docs {
            let result = compare_documents(doc, doc, format, CompareOptions::lenient()).unwrap();
            assert!(result.is_empty(), "{format}");
            assert_eq!(result.summary().total(), 0);
        }
    }

    #[test]
    fn parse_errors_abort() {
        let err = compare_documents("{", "{}", Format::Json, CompareOptions::default()).unwrap_err();
        assert!(matches!(err, SdkError::Format(_)));
    }

    #[test]
    fn deeply_nested_documents_are_rejected() {
        let deep = format!("{}{}", "<a>".repeat(200_000), "</a>".repeat(200_000));
        let err = compare_documents(&deep, &deep, Format::Xml, CompareOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SdkError::Format(confdiff_format::FormatError::NestingTooDeep { .. })
        ));

        let deep = format!("{}1{}", "[".repeat(200_000), "]".repeat(200_000));
        let err = compare_documents(&deep, "1", Format::Json, CompareOptions::default()).unwrap_err();
        assert!(matches!(err, SdkError::Format(_)));
    }

    #[test]
    fn files_detect_their_format() {
        let a = file(".yml", "a: 1\n");
        let b = file(".yaml", "a: 2\n");
        let cmp = compare_files(a.path(), b.path(), None, CompareOptions::default()).unwrap();
        assert_eq!(cmp.format, Format::Yaml);
        assert_eq!(cmp.result.summary().modifications, 1);
    }

    #[test]
    fn mismatched_files_are_rejected() {
        let a = file(".json", "{\"a\": 1}");
        let b = file(".yaml", "a: 1\n");
        let err = compare_files(a.path(), b.path(), None, CompareOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            SdkError::FormatMismatch {
                source_format: Format::Json,
                target_format: Format::Yaml,
            }
        ));
    }

    #[test]
    fn explicit_format_overrides_detection() {
        let a = file(".txt", "{\"a\": 1}");
        let b = file(".conf", "{\"a\": 1}");
        let cmp = compare_files(a.path(), b.path(), Some(Format::Json), CompareOptions::default())
            .unwrap();
        assert_eq!(cmp.format, Format::Json);
        assert!(cmp.result.is_empty());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = ConfDiff::default()
            .compare_files(&missing, &missing, None)
            .unwrap_err();
        assert!(matches!(err, SdkError::Read { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn ignore_keys_flow_through() {
        let engine = ConfDiff::new(CompareOptions::default().with_ignore_keys(["updated"]));
        let result = engine
            .compare_documents("updated: 1\nv: 1\n", "updated: 2\nv: 1\n", Format::Yaml)
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(engine.options().ignore_keys, vec!["updated"]);
    }
}
