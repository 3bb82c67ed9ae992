use serde::Deserialize;

/// Standard Azure DevOps list envelope (`{"count": n, "value": [...]}`).
///
/// A payload without `value` decodes as an empty list.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

/// Team project as returned by `_apis/projects`.
#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub name: String,
}

/// YAML pipeline definition as returned by `_apis/pipelines`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Pipeline {
    pub id: u64,
    pub name: String,
}

/// Entry of the branch-filtered `_apis/build/builds` listing.
#[derive(Debug, Clone, Deserialize)]
pub struct BuildRef {
    pub id: u64,
}

/// Build detail from `_apis/build/builds/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    /// Fully qualified ref the build ran on (e.g., "refs/heads/develop")
    #[serde(default)]
    pub source_branch: Option<String>,
}

/// Execution timeline of a build.
///
/// Records are kept raw so one malformed record does not sink the rest.
#[derive(Debug, Deserialize)]
pub struct Timeline {
    #[serde(default = "Vec::new")]
    pub records: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineRecord {
    #[serde(default = "Vec::new")]
    pub issues: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
}

pub const WARNING_ISSUE_TYPE: &str = "warning";

/// Collects the messages of every `"warning"` issue across all timeline records.
///
/// The type comparison is exact and case-sensitive. Records or issues that do
/// not have the expected shape, and warnings without a message, are skipped.
pub fn extract_warnings(timeline: Timeline) -> Vec<String> {
    timeline
        .records
        .into_iter()
        .filter_map(|record| serde_json::from_value::<TimelineRecord>(record).ok())
        .flat_map(|record| record.issues)
        .filter_map(|issue| serde_json::from_value::<Issue>(issue).ok())
        .filter(|issue| issue.kind == WARNING_ISSUE_TYPE)
        .filter_map(|issue| issue.message)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timeline(json: &str) -> Timeline {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_only_warning_type() {
        let timeline = timeline(
            r#"{"records": [
                {"name": "Build", "issues": [
                    {"type": "warning", "message": "A"},
                    {"type": "error", "message": "boom"}
                ]},
                {"name": "Test", "issues": [
                    {"type": "info", "message": "fyi"},
                    {"type": "warning", "message": "B"}
                ]}
            ]}"#,
        );

        assert_eq!(extract_warnings(timeline), vec!["A", "B"]);
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        let timeline = timeline(
            r#"{"records": [{"issues": [
                {"type": "Warning", "message": "upper"},
                {"type": "WARNING", "message": "shout"},
                {"type": "warning", "message": "exact"}
            ]}]}"#,
        );

        assert_eq!(extract_warnings(timeline), vec!["exact"]);
    }

    #[test]
    fn test_extract_skips_malformed_records_and_issues() {
        let timeline = timeline(
            r#"{"records": [
                "not an object",
                {"issues": null},
                {"issues": "nope"},
                {"name": "no issues at all"},
                {"issues": [
                    42,
                    {"message": "typeless"},
                    {"type": "warning"},
                    {"type": "warning", "message": "kept"}
                ]}
            ]}"#,
        );

        assert_eq!(extract_warnings(timeline), vec!["kept"]);
    }

    #[test]
    fn test_extract_without_records() {
        assert!(extract_warnings(timeline("{}")).is_empty());
    }

    #[test]
    fn test_list_response_without_value_is_empty() {
        let response: ListResponse<Project> = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(response.value.is_empty());
    }

    #[test]
    fn test_build_detail_fields() {
        let build: Build = serde_json::from_str(
            r#"{"id": 100, "sourceBranch": "refs/heads/develop", "buildNumber": "20240101.1"}"#,
        )
        .unwrap();
        assert_eq!(build.source_branch.as_deref(), Some("refs/heads/develop"));
    }

    #[test]
    fn test_build_detail_without_id_still_parses() {
        let build: Build = serde_json::from_str(r#"{"sourceBranch": "refs/heads/main"}"#).unwrap();
        assert_eq!(build.source_branch.as_deref(), Some("refs/heads/main"));
    }
}
