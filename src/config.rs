use anyhow::{bail, Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::providers::azure::{
    DEFAULT_API_VERSION, DEFAULT_BACKOFF_STEP, DEFAULT_BASE_URL, DEFAULT_BRANCH,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_PACE, DEFAULT_REPORT_FILENAME, DEFAULT_TIMEOUT,
};

const CANDIDATES: [&str; 4] = [
    "buildwarn.toml",
    "buildwarn.json",
    "buildwarn.yaml",
    "buildwarn.yml",
];

/// Configuration file structure for buildwarn.
///
/// Lets a pipeline keep organization, branch and pacing settings in the
/// repository instead of on the command line. Command-line flags and
/// environment variables override every value here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub azure: AzureConfig,

    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AzureConfig {
    /// Personal access token; prefer `SYSTEM_ACCESSTOKEN` in pipelines
    pub token: Option<String>,

    pub organization: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Branch whose latest builds are inspected
    #[serde(default = "default_branch")]
    pub branch: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    #[serde(default = "default_filename")]
    pub filename: PathBuf,

    /// Directory the report is placed in (created if missing)
    pub staging_dir: Option<PathBuf>,

    /// Pause after each written row, in milliseconds
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff step; the wait after attempt `n` is `n * backoff-secs`
    #[serde(default = "default_backoff_secs")]
    pub backoff_secs: u64,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            token: None,
            organization: None,
            base_url: default_base_url(),
            branch: default_branch(),
            api_version: default_api_version(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            filename: default_filename(),
            staging_dir: None,
            pace_ms: default_pace_ms(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_secs: default_backoff_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_filename() -> PathBuf {
    PathBuf::from(DEFAULT_REPORT_FILENAME)
}

#[allow(clippy::cast_possible_truncation)]
fn default_pace_ms() -> u64 {
    DEFAULT_PACE.as_millis() as u64
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_backoff_secs() -> u64 {
    DEFAULT_BACKOFF_STEP.as_secs()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path (must exist)
    /// 2. `./buildwarn.{toml,json,yaml,yml}`
    /// 3. `<user config dir>/buildwarn/buildwarn.{toml,json,yaml,yml}`
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.exists() {
                bail!("Config file not found: {}", path.display());
            }
            return Self::load_from_path(path);
        }

        let search_dirs = [
            Some(PathBuf::from(".")),
            dirs::config_dir().map(|dir| dir.join("buildwarn")),
        ];

        for dir in search_dirs.iter().flatten() {
            if let Some(path) = Self::find_in(dir) {
                debug!("Using config file {}", path.display());
                return Self::load_from_path(&path);
            }
        }

        Ok(Self::default())
    }

    fn find_in(dir: &Path) -> Option<PathBuf> {
        CANDIDATES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load configuration from a specific file path.
    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.azure.base_url, "https://dev.azure.com");
        assert_eq!(config.azure.branch, "develop");
        assert_eq!(config.azure.api_version, "7.2-preview");
        assert!(config.azure.organization.is_none());
        assert_eq!(config.report.filename, PathBuf::from("pipeline_warnings.csv"));
        assert_eq!(config.report.pace_ms, 200);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.backoff_secs, 2);
        assert_eq!(config.retry.timeout_secs, 30);
    }

    #[test]
    fn test_load_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[azure]
organization = "contoso"
branch = "main"

[report]
filename = "warnings.csv"
staging-dir = "/tmp/staging"
pace-ms = 0

[retry]
max-attempts = 3
"#;
        write!(temp_file, "{}", toml_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.organization, Some("contoso".to_string()));
        assert_eq!(config.azure.branch, "main");
        assert_eq!(config.azure.base_url, "https://dev.azure.com");
        assert_eq!(config.report.filename, PathBuf::from("warnings.csv"));
        assert_eq!(config.report.staging_dir, Some(PathBuf::from("/tmp/staging")));
        assert_eq!(config.report.pace_ms, 0);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.backoff_secs, 2);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "azure": {
    "organization": "fabrikam",
    "api-version": "7.1"
  },
  "retry": {
    "timeout-secs": 10
  }
}"#;
        write!(temp_file, "{}", json_content).unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.organization, Some("fabrikam".to_string()));
        assert_eq!(config.azure.api_version, "7.1");
        assert_eq!(config.retry.timeout_secs, 10);
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        write!(
            temp_file,
            "azure:\n  organization: yaml-org\n  base-url: https://tfs.example.com/tfs\n"
        )
        .unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.azure.organization, Some("yaml-org".to_string()));
        assert_eq!(config.azure.base_url, "https://tfs.example.com/tfs");
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let result = Config::load(Some(Path::new("definitely-missing-buildwarn.toml")));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }

    #[test]
    fn test_invalid_config_reports_path() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        write!(temp_file, "[azure\norganization = ").unwrap();

        let err = Config::load_from_path(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML config"));
    }

    #[test]
    fn test_find_in_prefers_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("buildwarn.yaml"), "azure: {}\n").unwrap();
        std::fs::write(temp_dir.path().join("buildwarn.toml"), "[azure]\n").unwrap();

        let found = Config::find_in(temp_dir.path()).unwrap();
        assert_eq!(found, temp_dir.path().join("buildwarn.toml"));
    }

    #[test]
    fn test_find_in_empty_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(Config::find_in(temp_dir.path()).is_none());
    }
}
