use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::Result;
use crate::output::{bright_yellow, resolve_output_path, CrawlProgress, ReportWriter};
use crate::report::{ReportRow, RunSummary, SkipReason};

use super::client::AzureClient;
use super::links::build_results_url;
use super::lookup::Lookup;
use super::types::Pipeline;

pub const DEFAULT_PACE: Duration = Duration::from_millis(200);
pub const DEFAULT_REPORT_FILENAME: &str = "pipeline_warnings.csv";

/// Where the CSV report is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTarget {
    pub filename: PathBuf,
    /// Artifact staging directory; created on demand and used as the parent of `filename`
    pub staging_dir: Option<PathBuf>,
}

impl Default for ReportTarget {
    fn default() -> Self {
        Self {
            filename: PathBuf::from(DEFAULT_REPORT_FILENAME),
            staging_dir: None,
        }
    }
}

/// Azure DevOps build warning report generator.
///
/// Walks every project and pipeline of the organization one request at a
/// time and writes one CSV row per pipeline whose latest build on the target
/// branch carries warnings.
pub struct AzureDevOpsProvider {
    pub client: AzureClient,
    pace: Duration,
}

impl AzureDevOpsProvider {
    /// Creates a provider pausing `pace` after every written row.
    pub fn new(client: AzureClient, pace: Duration) -> Self {
        Self { client, pace }
    }

    /// Crawls the organization and writes the report.
    ///
    /// Steps:
    /// 1. Resolve the output path (creating the staging directory if set)
    /// 2. List projects; with none, stop without creating the file
    /// 3. Write the header, then for every project and pipeline look up the
    ///    latest branch build, re-check its source branch, collect warnings
    ///    and write a row when there are any
    ///
    /// Lookups that come back empty, malformed or failed after retries skip
    /// the pipeline; they are counted in the returned summary by reason.
    ///
    /// # Errors
    ///
    /// Returns an error only for local faults: the staging directory or the
    /// report file cannot be created or written.
    pub async fn generate_report(&self, target: &ReportTarget) -> Result<RunSummary> {
        let mut summary = RunSummary::new();
        let output_path = resolve_output_path(&target.filename, target.staging_dir.as_deref())?;

        let organization = &self.client.settings().organization;
        info!("Listing projects for organization: {organization}");

        let projects = match self.client.list_projects().await {
            Lookup::Found(projects) if !projects.is_empty() => projects,
            outcome => {
                if outcome.is_failure() {
                    warn!("Could not list projects for {organization}: {outcome:?}");
                }
                info!("No projects found.");
                eprintln!("  {}", bright_yellow("No projects found."));
                return Ok(summary);
            }
        };

        info!("Found {} projects", projects.len());

        let mut writer = ReportWriter::create(&output_path)?;
        let progress = CrawlProgress::start(projects.len());

        for project in &projects {
            progress.enter_project(project);
            summary.projects_scanned += 1;

            let pipelines = self.client.list_pipelines(project).await;
            if pipelines.is_failure() {
                warn!("Could not list pipelines for {project}: {pipelines:?}");
            }

            let pipelines = pipelines.unwrap_or_default();
            if pipelines.is_empty() {
                progress.note("No YAML pipelines found.");
                progress.finish_project();
                continue;
            }

            for pipeline in &pipelines {
                summary.pipelines_scanned += 1;

                match self.scan_pipeline(project, pipeline).await {
                    Ok(row) => {
                        writer.write_row(&row)?;
                        progress.note(format!(
                            "{} | Build {} | Warnings: {}",
                            row.pipeline_name, row.build_id, row.warning_count
                        ));
                        summary.rows.push(row);
                        tokio::time::sleep(self.pace).await;
                    }
                    Err(reason) => summary.record_skip(reason),
                }
            }

            progress.finish_project();
        }

        writer.finish()?;
        progress.finish(summary.rows.len());

        info!("CSV generated: {}", output_path.display());
        summary.output_path = Some(output_path);

        Ok(summary)
    }

    /// Produces the row for one pipeline, or the reason it has none.
    async fn scan_pipeline(
        &self,
        project: &str,
        pipeline: &Pipeline,
    ) -> std::result::Result<ReportRow, SkipReason> {
        let context = format!("{project}/{}", pipeline.name);

        let build_id = self
            .client
            .latest_branch_build_id(project, pipeline.id)
            .await
            .into_result()
            .map_err(|miss| skip_reason(&context, "branch build", miss, SkipReason::NoBranchBuild))?;

        let build = self
            .client
            .build_detail(project, build_id)
            .await
            .into_result()
            .map_err(|miss| skip_reason(&context, "build detail", miss, SkipReason::NoBranchBuild))?;

        // The listing is already branch-filtered; the detail is authoritative.
        let branch_ref = self.client.settings().branch_ref();
        if build.source_branch.as_deref() != Some(branch_ref.as_str()) {
            debug!(
                "{context}: build {build_id} ran on {:?}, expected {branch_ref}",
                build.source_branch
            );
            return Err(SkipReason::BranchMismatch);
        }

        let warnings = self
            .client
            .warnings(project, build_id)
            .await
            .into_result()
            .map_err(|miss| skip_reason(&context, "timeline", miss, SkipReason::NoWarnings))?;

        if warnings.is_empty() {
            debug!("{context}: build {build_id} has no warnings");
            return Err(SkipReason::NoWarnings);
        }

        let settings = self.client.settings();
        let link = build_results_url(&settings.base_url, &settings.organization, project, build_id);

        Ok(ReportRow::new(
            project,
            &pipeline.name,
            build_id,
            &warnings,
            link,
        ))
    }
}

/// Maps a missed lookup to a skip reason, logging "nothing there" at debug
/// and "could not determine" at warn.
fn skip_reason(context: &str, step: &str, miss: Lookup<()>, absent: SkipReason) -> SkipReason {
    match miss {
        Lookup::Malformed(reason) => {
            warn!("{context}: unreadable {step} ({reason}), skipping");
            SkipReason::LookupFailed
        }
        Lookup::Failed { attempts, reason } => {
            warn!("{context}: {step} lookup failed after {attempts} attempts ({reason}), skipping");
            SkipReason::LookupFailed
        }
        Lookup::NotFound | Lookup::Found(()) => {
            debug!("{context}: no {step}, skipping");
            absent
        }
    }
}
