use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

/// Header row of the CSV report, in column order.
pub const HEADER: [&str; 4] = [
    "project_name",
    "pipeline_name",
    "build_id",
    "warnings_message",
];

/// One CSV row: a pipeline whose latest branch build carries warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub project_name: String,
    pub pipeline_name: String,
    pub build_id: u64,
    /// Warning messages joined with `\n`, written as a single CSV field
    pub warnings_message: String,
    #[serde(skip)]
    pub warning_count: usize,
    /// Build results page, shown in the terminal summary only
    #[serde(skip)]
    pub link: String,
}

impl ReportRow {
    pub fn new(
        project_name: &str,
        pipeline_name: &str,
        build_id: u64,
        warnings: &[String],
        link: String,
    ) -> Self {
        Self {
            project_name: project_name.to_string(),
            pipeline_name: pipeline_name.to_string(),
            build_id,
            warnings_message: warnings.join("\n"),
            warning_count: warnings.len(),
            link,
        }
    }
}

/// Why a pipeline produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// No build on the target branch
    NoBranchBuild,
    /// Build detail reports a different source branch than requested
    BranchMismatch,
    NoWarnings,
    /// A lookup failed after retries or returned a payload we could not read
    LookupFailed,
}

impl SkipReason {
    pub fn label(self) -> &'static str {
        match self {
            SkipReason::NoBranchBuild => "No build on branch",
            SkipReason::BranchMismatch => "Source branch mismatch",
            SkipReason::NoWarnings => "No warnings",
            SkipReason::LookupFailed => "Lookup failed",
        }
    }
}

/// Everything a run produced, for the terminal summary.
#[derive(Debug)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    /// `None` when the run stopped before opening the report
    pub output_path: Option<PathBuf>,
    pub projects_scanned: usize,
    pub pipelines_scanned: usize,
    pub rows: Vec<ReportRow>,
    pub skipped: IndexMap<SkipReason, usize>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            output_path: None,
            projects_scanned: 0,
            pipelines_scanned: 0,
            rows: Vec::new(),
            skipped: IndexMap::new(),
        }
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_warnings(&self) -> usize {
        self.rows.iter().map(|row| row.warning_count).sum()
    }

    /// Written rows grouped per project, in crawl order.
    pub fn rows_by_project(&self) -> IndexMap<&str, Vec<&ReportRow>> {
        let mut grouped: IndexMap<&str, Vec<&ReportRow>> = IndexMap::new();
        for row in &self.rows {
            grouped.entry(row.project_name.as_str()).or_default().push(row);
        }
        grouped
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(project: &str, pipeline: &str, warnings: &[&str]) -> ReportRow {
        let warnings: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        ReportRow::new(project, pipeline, 1, &warnings, String::new())
    }

    #[test]
    fn test_row_joins_warnings_with_newline() {
        let row = row("P1", "Pipe1", &["A", "B"]);
        assert_eq!(row.warnings_message, "A\nB");
        assert_eq!(row.warning_count, 2);
    }

    #[test]
    fn test_record_skip_counts_per_reason() {
        let mut summary = RunSummary::new();
        summary.record_skip(SkipReason::NoWarnings);
        summary.record_skip(SkipReason::NoWarnings);
        summary.record_skip(SkipReason::LookupFailed);

        assert_eq!(summary.skipped(SkipReason::NoWarnings), 2);
        assert_eq!(summary.skipped(SkipReason::LookupFailed), 1);
        assert_eq!(summary.skipped(SkipReason::BranchMismatch), 0);
    }

    #[test]
    fn test_rows_by_project_keeps_crawl_order() {
        let mut summary = RunSummary::new();
        summary.rows.push(row("Zeta", "a", &["w"]));
        summary.rows.push(row("Alpha", "b", &["w", "w"]));
        summary.rows.push(row("Zeta", "c", &["w"]));

        let grouped = summary.rows_by_project();
        let projects: Vec<_> = grouped.keys().copied().collect();

        assert_eq!(projects, vec!["Zeta", "Alpha"]);
        assert_eq!(grouped["Zeta"].len(), 2);
        assert_eq!(summary.total_warnings(), 4);
    }
}
