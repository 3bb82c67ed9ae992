mod client;
mod links;
mod lookup;
mod provider;
mod retry;
mod settings;
mod types;

pub use client::AzureClient;
pub use provider::{AzureDevOpsProvider, ReportTarget, DEFAULT_PACE, DEFAULT_REPORT_FILENAME};
pub use retry::{RetryPolicy, DEFAULT_BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS};
pub use settings::{
    AzureSettings, DEFAULT_API_VERSION, DEFAULT_BASE_URL, DEFAULT_BRANCH, DEFAULT_TIMEOUT,
};
