use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://dev.azure.com";
pub const DEFAULT_BRANCH: &str = "develop";
pub const DEFAULT_API_VERSION: &str = "7.2-preview";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where and what to crawl. Fixed for the lifetime of a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureSettings {
    /// Service root (e.g., <https://dev.azure.com>)
    pub base_url: String,
    pub organization: String,
    /// Short branch name ("develop") or a full ref ("refs/heads/develop")
    pub branch: String,
    pub api_version: String,
    /// Per-attempt request timeout
    pub timeout: Duration,
}

impl AzureSettings {
    #[cfg(test)]
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            organization: organization.into(),
            branch: DEFAULT_BRANCH.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Fully qualified ref builds are filtered and checked against.
    pub fn branch_ref(&self) -> String {
        if self.branch.starts_with("refs/") {
            self.branch.clone()
        } else {
            format!("refs/heads/{}", self.branch)
        }
    }
}
