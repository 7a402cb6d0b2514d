use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use confdiff_diff::CompareOptions;
use confdiff_types::{ComparisonResult, Format};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SdkError, SdkResult};

/// The options a comparison ran with, as recorded in a report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    pub format: Format,
    pub ignore_keys: Vec<String>,
    pub strict: bool,
}

/// A comparison result together with when and how it was produced.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub settings: ReportSettings,
    pub source_name: String,
    pub target_name: String,
    pub result: ComparisonResult,
}

impl ComparisonReport {
    pub fn new(
        source_name: impl Into<String>,
        target_name: impl Into<String>,
        format: Format,
        options: &CompareOptions,
        result: ComparisonResult,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            settings: ReportSettings {
                format,
                ignore_keys: options.ignore_keys.clone(),
                strict: options.strict,
            },
            source_name: source_name.into(),
            target_name: target_name.into(),
            result,
        }
    }

    pub fn to_json(&self) -> SdkResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> SdkResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Write the report to `path` as pretty-printed JSON.
    pub fn write_to(&self, path: impl AsRef<Path>) -> SdkResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?).map_err(|source| SdkError::Write {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::compare_documents;

    fn sample() -> ComparisonReport {
        let options = CompareOptions::lenient().with_ignore_keys(["ts"]);
        let result =
            compare_documents("{\"a\": 1}", "{\"a\": 1, \"b\": [2]}", Format::Json, options.clone())
                .unwrap();
        ComparisonReport::new("old.json", "new.json", Format::Json, &options, result)
    }

    #[test]
    fn report_shape() {
        let value: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(value["settings"]["format"], "json");
        assert_eq!(value["settings"]["strict"], false);
        assert_eq!(value["settings"]["ignore_keys"][0], "ts");
        assert_eq!(value["source_name"], "old.json");
        assert_eq!(value["result"]["summary"]["additions"], 1);
        assert_eq!(value["result"]["diff"][0]["path"], "b");
        assert_eq!(value["result"]["diff"][0]["change_type"], "addition");
        assert!(value["result"]["formatted_diff"]["target"].is_array());
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let report = sample();
        report.write_to(&path).unwrap();

        let loaded = ComparisonReport::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded.settings, report.settings);
        assert_eq!(loaded.generated_at, report.generated_at);
        assert_eq!(loaded.result, report.result);
    }

    #[test]
    fn keys_with_path_punctuation_read_back() {
        let options = CompareOptions::default();
        let result = compare_documents(
            "servers[x]: 1\na.b: x\n",
            "servers[x]: 2\na.b: y\n",
            Format::Yaml,
            options.clone(),
        )
        .unwrap();
        let report = ComparisonReport::new("a.yaml", "b.yaml", Format::Yaml, &options, result);

        let loaded = ComparisonReport::from_json(&report.to_json().unwrap()).unwrap();
        let paths: Vec<String> = loaded.result.diff().iter().map(|c| c.path.to_string()).collect();
        assert_eq!(paths, vec![r#"["servers[x]"]"#, r#"["a.b"]"#]);
        assert_eq!(loaded.result, report.result);
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = sample().write_to(dir.path().join("missing").join("r.json")).unwrap_err();
        assert!(matches!(err, SdkError::Write { .. }));
    }
}
