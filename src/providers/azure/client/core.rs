use log::{debug, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::auth::Token;
use crate::error::{BuildWarnError, Result};
use crate::providers::azure::lookup::Lookup;
use crate::providers::azure::retry::RetryPolicy;
use crate::providers::azure::settings::AzureSettings;

/// A successful response, read to the end.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Fetched {
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|value| value.contains("application/json"))
    }

    pub fn is_blank(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }
}

pub struct AzureClient {
    client: Client,
    base_url: Url,
    settings: AzureSettings,
    token: Option<Token>,
    retry: RetryPolicy,
}

impl AzureClient {
    pub fn new(settings: AzureSettings, token: Option<Token>, retry: RetryPolicy) -> Result<Self> {
        if settings.organization.trim().is_empty() {
            return Err(BuildWarnError::Config(
                "Organization must not be empty".to_string(),
            ));
        }

        let client = Client::builder()
            .user_agent(concat!("buildwarn/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BuildWarnError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| BuildWarnError::Config(format!("Invalid base URL: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(BuildWarnError::Config(format!(
                "Base URL cannot carry a path: {}",
                settings.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            settings,
            token,
            retry,
        })
    }

    pub fn settings(&self) -> &AzureSettings {
        &self.settings
    }

    /// Helper to build authenticated requests
    pub fn auth_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(token) = &self.token {
            request.bearer_auth(token.as_str())
        } else {
            request
        }
    }

    /// Builds `{base}/{org}[/{project}]/{path..}?{query}&api-version={v}`.
    ///
    /// Segments are percent-encoded, so project names with spaces are safe.
    pub(super) fn endpoint(&self, project: Option<&str>, path: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();

        // Checked in `new`: the base URL can always carry path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&self.settings.organization)
                .extend(project)
                .extend(path);
        }

        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("api-version", &self.settings.api_version);

        url
    }

    /// GET with bounded retry.
    ///
    /// 404 returns `NotFound` at once. Any other failure (network error,
    /// timeout, non-2xx status, a body cut off mid-read) waits
    /// `policy.delay_for(attempt)` and tries again until `max_attempts` is
    /// reached.
    pub async fn get(&self, url: &Url) -> Lookup<Fetched> {
        let max_attempts = self.retry.max_attempts;
        let mut reason = String::new();

        for attempt in 1..=max_attempts {
            match self.auth_request(self.client.get(url.clone())).send().await {
                Ok(response) if response.status() == StatusCode::NOT_FOUND => {
                    debug!("GET {url} returned 404");
                    return Lookup::NotFound;
                }
                Ok(response) if response.status().is_success() => {
                    let content_type = response
                        .headers()
                        .get(CONTENT_TYPE)
                        .and_then(|value| value.to_str().ok())
                        .map(ToString::to_string);

                    match response.bytes().await {
                        Ok(body) => {
                            return Lookup::Found(Fetched {
                                content_type,
                                body: body.to_vec(),
                            })
                        }
                        Err(e) => reason = format!("body read failed: {e}"),
                    }
                }
                Ok(response) => {
                    let status = response.status();
                    reason = format!("HTTP {status}");
                    if !self.retry.should_retry(status) {
                        warn!("GET {url} returned {status}, not retrying");
                        return Lookup::Failed {
                            attempts: attempt,
                            reason,
                        };
                    }
                }
                Err(e) => reason = e.to_string(),
            }

            if attempt < max_attempts {
                let delay = self.retry.delay_for(attempt);
                warn!(
                    "GET {url} failed ({reason}). Waiting {}s before retry {}/{}...",
                    delay.as_secs_f64(),
                    attempt + 1,
                    max_attempts
                );
                tokio::time::sleep(delay).await;
            }
        }

        warn!("GET {url} failed after {max_attempts} attempts: {reason}");
        Lookup::Failed {
            attempts: max_attempts,
            reason,
        }
    }

    pub(super) async fn get_json<T>(&self, url: &Url) -> Lookup<T>
    where
        T: DeserializeOwned,
    {
        let fetched = match self.get(url).await.into_result() {
            Ok(fetched) => fetched,
            Err(miss) => return miss,
        };

        match serde_json::from_slice::<T>(&fetched.body) {
            Ok(value) => Lookup::Found(value),
            Err(e) => {
                warn!("Unexpected payload from {url}: {e}");
                Lookup::Malformed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
impl AzureClient {
    /// Client for `base_url` (org "org", branch "develop") that retries 5 times without waiting.
    pub fn for_tests(base_url: &str) -> Self {
        let settings = AzureSettings {
            base_url: base_url.to_string(),
            ..AzureSettings::new("org")
        };
        Self::new(
            settings,
            Some(Token::from("test-token")),
            RetryPolicy::new(5, std::time::Duration::ZERO),
        )
        .unwrap()
    }
}
