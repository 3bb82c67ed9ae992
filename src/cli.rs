use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::Token;
use crate::config::Config;
use crate::output::{self, bright_green, cyan};
use crate::providers::azure::{
    AzureClient, AzureDevOpsProvider, AzureSettings, ReportTarget, RetryPolicy,
};

#[derive(Parser)]
#[command(name = "buildwarn")]
#[command(author, version, about = "Azure DevOps build warning report", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./buildwarn.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Report warnings from the latest branch build of every pipeline
    Azure(AzureArgs),
}

#[derive(Args, Debug, Default)]
struct AzureArgs {
    /// Azure DevOps organization
    #[arg(short, long, env = "AZURE_DEVOPS_ORG")]
    org: Option<String>,

    /// Bearer token (the pipeline's System.AccessToken or a PAT)
    #[arg(short, long, env = "SYSTEM_ACCESSTOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Branch to inspect, short name or full ref [default: develop]
    #[arg(short, long)]
    branch: Option<String>,

    /// REST API version [default: 7.2-preview]
    #[arg(long)]
    api_version: Option<String>,

    /// Service root [default: https://dev.azure.com]
    #[arg(short, long)]
    url: Option<String>,

    /// Report file name [default: pipeline_warnings.csv]
    #[arg(short = 'f', long)]
    output: Option<PathBuf>,

    /// Directory to place the report in, created if missing
    #[arg(long, env = "BUILD_ARTIFACTSTAGINGDIRECTORY")]
    staging_dir: Option<PathBuf>,

    /// Pause after each written row, in milliseconds [default: 200]
    #[arg(long)]
    pace_ms: Option<u64>,

    /// Attempts per request before giving up [default: 5]
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Per-request timeout in seconds [default: 30]
    #[arg(long)]
    timeout_secs: Option<u64>,
}

/// Everything a run needs, after flags, environment and config file are merged.
#[derive(Debug)]
struct RunPlan {
    settings: AzureSettings,
    token: Option<Token>,
    retry: RetryPolicy,
    target: ReportTarget,
    pace: Duration,
}

impl AzureArgs {
    fn plan(&self, config: &Config) -> Result<RunPlan> {
        let organization = self
            .org
            .clone()
            .or_else(|| config.azure.organization.clone())
            .filter(|org| !org.trim().is_empty())
            .context(
                "No organization given: pass --org, set AZURE_DEVOPS_ORG, or set `organization` under [azure] in buildwarn.toml",
            )?;

        let token = self
            .token
            .clone()
            .or_else(|| config.azure.token.clone())
            .filter(|token| !token.is_empty())
            .map(Token::from);

        let timeout_secs = self.timeout_secs.unwrap_or(config.retry.timeout_secs);

        let settings = AzureSettings {
            base_url: self.url.clone().unwrap_or_else(|| config.azure.base_url.clone()),
            organization,
            branch: self.branch.clone().unwrap_or_else(|| config.azure.branch.clone()),
            api_version: self
                .api_version
                .clone()
                .unwrap_or_else(|| config.azure.api_version.clone()),
            timeout: Duration::from_secs(timeout_secs),
        };

        let retry = RetryPolicy::new(
            self.max_attempts.unwrap_or(config.retry.max_attempts),
            Duration::from_secs(config.retry.backoff_secs),
        );

        let target = ReportTarget {
            filename: self.output.clone().unwrap_or_else(|| config.report.filename.clone()),
            staging_dir: self
                .staging_dir
                .clone()
                .or_else(|| config.report.staging_dir.clone()),
        };

        let pace = Duration::from_millis(self.pace_ms.unwrap_or(config.report.pace_ms));

        Ok(RunPlan {
            settings,
            token,
            retry,
            target,
            pace,
        })
    }
}

impl Cli {
    async fn execute_azure(&self, args: &AzureArgs, config: &Config) -> Result<()> {
        let plan = args.plan(config)?;

        info!(
            "Collecting {} build warnings for organization: {}",
            plan.settings.branch_ref(),
            plan.settings.organization
        );

        if plan.token.is_none() {
            warn!("No access token given; requests are sent unauthenticated");
        }

        let client = AzureClient::new(plan.settings, plan.token, plan.retry)?;
        let provider = AzureDevOpsProvider::new(client, plan.pace);

        let summary = provider.generate_report(&plan.target).await?;

        if let Some(path) = &summary.output_path {
            output::print_summary(&summary);
            eprintln!("{} {}", bright_green("CSV GENERATED:"), cyan(path.display()));
        }

        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Azure(args) => self.execute_azure(args, &config).await,
        }
    }
}
